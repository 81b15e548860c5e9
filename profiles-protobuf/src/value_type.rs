// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Sink, Value, Varint, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Specifies how a metric is aggregated over time. Encoded as an int32 enum.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub enum AggregationTemporality {
    #[default]
    Unspecified = 0,
    Delta = 1,
    Cumulative = 2,
}

impl Value for AggregationTemporality {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        (*self as i32).proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        (*self as i32).encode(writer)
    }

    fn is_zero(&self) -> bool {
        *self == AggregationTemporality::Unspecified
    }
}

unsafe impl Varint for AggregationTemporality {}

/// ValueType describes the semantics and measurement units of a value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct ValueType {
    /// Index into the string table.
    pub r#type: Field<i64, 1, OPT_ZERO>,
    /// Index into the string table.
    pub unit: Field<i64, 2, OPT_ZERO>,
    pub aggregation_temporality: Field<AggregationTemporality, 3, OPT_ZERO>,
}

impl Message for ValueType {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.r#type)?;
        sink.field(&self.unit)?;
        sink.field(&self.aggregation_temporality)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&ValueType> for crate::prost_impls::ValueType {
    fn from(value: &ValueType) -> Self {
        // If the prost file is regenerated, this may pick up new members.
        #[allow(clippy::needless_update)]
        Self {
            r#type: value.r#type.value,
            unit: value.unit.value,
            aggregation_temporality: value.aggregation_temporality.value as i32,
            ..Self::default()
        }
    }
}
