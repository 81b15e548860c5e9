// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Sink, OPT_ZERO};

/// Maps an attribute key to the unit of its values, both as string table
/// indices.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct AttributeUnit {
    pub attribute_key: Field<i64, 1, OPT_ZERO>,
    pub unit: Field<i64, 2, OPT_ZERO>,
}

impl Message for AttributeUnit {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.attribute_key)?;
        sink.field(&self.unit)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&AttributeUnit> for crate::prost_impls::AttributeUnit {
    fn from(unit: &AttributeUnit) -> Self {
        Self {
            attribute_key: unit.attribute_key.value,
            unit: unit.unit.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use crate::test_utils::roundtrip;

    #[test]
    fn roundtrip_attribute_unit() {
        bolero::check!()
            .with_type::<AttributeUnit>()
            .for_each(|unit| {
                let decoded: prost_impls::AttributeUnit = roundtrip(*unit);
                assert_eq!(prost_impls::AttributeUnit::from(unit), decoded);
            });
    }
}
