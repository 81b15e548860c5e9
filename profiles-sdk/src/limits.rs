// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::ConfigError;

pub const DEFAULT_MAX_NUMBER_OF_ATTRIBUTES: usize = 128;

/// Bounds applied to the attributes of each record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProfileLimits {
    max_number_of_attributes: usize,
    max_attribute_value_length: usize,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            max_number_of_attributes: DEFAULT_MAX_NUMBER_OF_ATTRIBUTES,
            max_attribute_value_length: usize::MAX,
        }
    }
}

impl ProfileLimits {
    pub fn builder() -> ProfileLimitsBuilder {
        ProfileLimitsBuilder::default()
    }

    pub fn max_number_of_attributes(&self) -> usize {
        self.max_number_of_attributes
    }

    /// In characters. `usize::MAX` means unlimited.
    pub fn max_attribute_value_length(&self) -> usize {
        self.max_attribute_value_length
    }
}

#[derive(Debug, Default)]
pub struct ProfileLimitsBuilder {
    max_number_of_attributes: Option<usize>,
    max_attribute_value_length: Option<usize>,
}

impl ProfileLimitsBuilder {
    pub fn set_max_number_of_attributes(&mut self, max: usize) -> &mut Self {
        self.max_number_of_attributes = Some(max);
        self
    }

    pub fn set_max_attribute_value_length(&mut self, max: usize) -> &mut Self {
        self.max_attribute_value_length = Some(max);
        self
    }

    pub fn build(&self) -> Result<ProfileLimits, ConfigError> {
        let max_number_of_attributes = self
            .max_number_of_attributes
            .unwrap_or(DEFAULT_MAX_NUMBER_OF_ATTRIBUTES);
        if max_number_of_attributes == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_number_of_attributes",
            });
        }
        Ok(ProfileLimits {
            max_number_of_attributes,
            max_attribute_value_length: self.max_attribute_value_length.unwrap_or(usize::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = ProfileLimits::builder().build().unwrap();
        assert_eq!(limits, ProfileLimits::default());
        assert_eq!(limits.max_number_of_attributes(), 128);
        assert_eq!(limits.max_attribute_value_length(), usize::MAX);
    }

    #[test]
    fn rejects_zero_attributes() {
        let result = ProfileLimits::builder()
            .set_max_number_of_attributes(0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::NotPositive {
                name: "max_number_of_attributes"
            })
        ));
    }

    #[test]
    fn zero_length_is_allowed() {
        let limits = ProfileLimits::builder()
            .set_max_attribute_value_length(0)
            .build()
            .unwrap();
        assert_eq!(limits.max_attribute_value_length(), 0);
    }
}
