// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::{AttributeValue, InstrumentationScope, Resource, SpanContext};
use crate::data::{ProfileData, ProfileRecord};
use crate::{AttributesMap, ProfileLimits};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;

/// A record while it is being processed. Processors may add attributes,
/// within the limits the record was created with, and take snapshots with
/// [`ReadWriteProfile::to_data`] at any point.
#[derive(Debug)]
pub struct ReadWriteProfile {
    pub(crate) limits: ProfileLimits,
    pub(crate) resource: Arc<Resource>,
    pub(crate) scope: Arc<InstrumentationScope>,
    pub(crate) profile_id: Vec<u8>,
    pub(crate) timestamp_epoch_nanos: u64,
    pub(crate) observed_timestamp_epoch_nanos: u64,
    pub(crate) span_context: SpanContext,
    pub(crate) original_payload_format: String,
    pub(crate) original_payload: Bytes,
    pub(crate) profile: Arc<ProfileData>,
    /// Created on the first attribute.
    pub(crate) attributes: Mutex<Option<AttributesMap>>,
}

impl ReadWriteProfile {
    /// Wraps a snapshot again, re-applying `limits` to its attributes.
    pub fn from_record(record: &ProfileRecord, limits: ProfileLimits) -> Self {
        let profile = Self {
            limits,
            resource: record.resource.clone(),
            scope: record.scope.clone(),
            profile_id: record.profile_id.clone(),
            timestamp_epoch_nanos: record.timestamp_epoch_nanos,
            observed_timestamp_epoch_nanos: record.observed_timestamp_epoch_nanos,
            span_context: record.span_context,
            original_payload_format: record.original_payload_format.clone(),
            original_payload: record.original_payload.clone(),
            profile: record.profile.clone(),
            attributes: Mutex::new(None),
        };
        for (key, value) in record.attributes.iter() {
            profile.set_attribute(key, value.clone());
        }
        profile
    }

    /// Empty keys are ignored.
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<AttributeValue>) -> &Self {
        let key = key.into();
        if key.is_empty() {
            return self;
        }
        self.attributes
            .lock()
            .get_or_insert_with(|| AttributesMap::with_limits(&self.limits))
            .put(key, value);
        self
    }

    pub fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes
            .lock()
            .as_ref()
            .and_then(|attributes| attributes.get(key).cloned())
    }

    /// Takes an immutable snapshot reflecting the state at the time of the
    /// call.
    pub fn to_data(&self) -> ProfileRecord {
        let (attributes, total_attribute_count) = match self.attributes.lock().as_ref() {
            Some(map) => (map.to_attributes(), map.total_added_values()),
            None => Default::default(),
        };
        ProfileRecord {
            resource: self.resource.clone(),
            scope: self.scope.clone(),
            profile_id: self.profile_id.clone(),
            timestamp_epoch_nanos: self.timestamp_epoch_nanos,
            observed_timestamp_epoch_nanos: self.observed_timestamp_epoch_nanos,
            span_context: self.span_context,
            attributes,
            total_attribute_count,
            original_payload_format: self.original_payload_format.clone(),
            original_payload: self.original_payload.clone(),
            profile: self.profile.clone(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn scope(&self) -> &InstrumentationScope {
        &self.scope
    }

    pub fn span_context(&self) -> SpanContext {
        self.span_context
    }

    pub fn timestamp_epoch_nanos(&self) -> u64 {
        self.timestamp_epoch_nanos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SpanId, TraceId};
    use std::thread;

    fn profile(limits: ProfileLimits) -> ReadWriteProfile {
        ReadWriteProfile::from_record(&ProfileRecord::default(), limits)
    }

    #[test]
    fn snapshots_are_independent() {
        let profile = profile(ProfileLimits::default());
        profile.set_attribute("a", 1);
        let first = profile.to_data();
        profile.set_attribute("b", 2);
        let second = profile.to_data();
        assert_eq!(first.attributes.len(), 1);
        assert_eq!(second.attributes.len(), 2);
        assert_eq!(profile.to_data().attributes, second.attributes);
    }

    #[test]
    fn repeated_snapshots_are_equal() {
        let record = ProfileRecord {
            profile_id: vec![3; 16],
            timestamp_epoch_nanos: 10,
            observed_timestamp_epoch_nanos: 20,
            span_context: SpanContext::new(TraceId::from(7u128), SpanId::from(9u64)),
            original_payload_format: "pprof".to_string(),
            original_payload: Bytes::from_static(b"payload"),
            profile: Arc::new(ProfileData {
                string_table: vec![String::new(), "cpu".to_string()],
                ..ProfileData::default()
            }),
            ..ProfileRecord::default()
        };
        let profile = ReadWriteProfile::from_record(&record, ProfileLimits::default());
        profile.set_attribute("thread", "main");
        profile.set_attribute("depth", 4);

        let first = profile.to_data();
        assert_eq!(first, profile.to_data());
        assert!(first.span_context.is_valid());
        assert_eq!(first.attributes.len(), 2);
    }

    #[test]
    fn applies_limits() {
        let limits = ProfileLimits::builder()
            .set_max_number_of_attributes(1)
            .set_max_attribute_value_length(2)
            .build()
            .unwrap();
        let profile = profile(limits);
        profile.set_attribute("", "ignored");
        profile.set_attribute("a", "abc");
        profile.set_attribute("b", "abc");
        let record = profile.to_data();
        assert_eq!(record.attributes.get("a"), Some(&AttributeValue::from("ab")));
        assert_eq!(record.total_attribute_count, 2);
        assert_eq!(record.dropped_attributes_count(), 1);
        assert_eq!(profile.get_attribute("b"), None);
    }

    #[test]
    fn concurrent_writers() {
        let profile = Arc::new(profile(ProfileLimits::default()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let profile = profile.clone();
                thread::spawn(move || {
                    for i in 0..16 {
                        profile.set_attribute(format!("{t}-{i}"), i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let record = profile.to_data();
        assert_eq!(record.attributes.len(), 64);
        assert_eq!(record.total_attribute_count, 64);
    }
}
