// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::{AttributeValue, Attributes};
use crate::ProfileLimits;

/// An attribute set bounded in size and in value length.
///
/// Once full, new keys are dropped while existing keys can still be updated.
/// Every `put` counts towards [`AttributesMap::total_added_values`], whether
/// or not it was kept.
#[derive(Clone, Debug)]
pub struct AttributesMap {
    attributes: Attributes,
    capacity: usize,
    length_limit: usize,
    total_added: usize,
}

impl AttributesMap {
    pub fn new(capacity: usize, length_limit: usize) -> Self {
        Self {
            attributes: Attributes::new(),
            capacity,
            length_limit,
            total_added: 0,
        }
    }

    pub fn with_limits(limits: &ProfileLimits) -> Self {
        Self::new(
            limits.max_number_of_attributes(),
            limits.max_attribute_value_length(),
        )
    }

    /// Empty keys are ignored.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        self.total_added += 1;
        if self.attributes.len() >= self.capacity && !self.attributes.contains_key(&key) {
            return;
        }
        self.attributes
            .insert(key, value.into().truncated(self.length_limit));
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn total_added_values(&self) -> usize {
        self.total_added
    }

    pub fn to_attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn drops_new_keys_when_full() {
        let mut map = AttributesMap::new(2, usize::MAX);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);
        map.put("a", 4);
        assert_eq!(map.len(), 2);
        assert_eq!(map.total_added_values(), 4);
        assert_eq!(map.get("a"), Some(&AttributeValue::Int(4)));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn ignores_empty_keys() {
        let mut map = AttributesMap::new(2, usize::MAX);
        map.put("", "value");
        assert!(map.is_empty());
        assert_eq!(map.total_added_values(), 0);
    }

    #[test]
    fn truncates_values() {
        let mut map = AttributesMap::new(8, 3);
        map.put("string", "abcdef");
        map.put("array", vec!["abcdef", "ab"]);
        map.put("int", 123456);
        assert_eq!(map.get("string"), Some(&AttributeValue::from("abc")));
        assert_eq!(map.get("array"), Some(&AttributeValue::from(vec!["abc", "ab"])));
        assert_eq!(map.get("int"), Some(&AttributeValue::Int(123456)));
    }

    proptest! {
        #[test]
        fn respects_limits(
            capacity in 1usize..16,
            length_limit in 0usize..8,
            entries in proptest::collection::vec(("[a-z]{1,3}", "[a-z]{0,12}"), 0..64),
        ) {
            let mut map = AttributesMap::new(capacity, length_limit);
            for (key, value) in &entries {
                map.put(key.as_str(), value.as_str());
            }
            prop_assert!(map.len() <= capacity);
            prop_assert_eq!(map.total_added_values(), entries.len());
            for (_, value) in map.to_attributes().iter() {
                let AttributeValue::String(value) = value else {
                    panic!("expected a string");
                };
                prop_assert!(value.chars().count() <= length_limit);
            }
        }
    }
}
