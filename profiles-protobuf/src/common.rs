// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Encoded, Field, Message, Repeated, Sink, NO_OPT_ZERO, OPT_ZERO};

/// `opentelemetry.proto.common.v1.AnyValue`. Exactly one member of the oneof
/// is present, and it is written even when it holds the default value.
#[derive(Clone, Debug)]
pub enum AnyValue<'a> {
    String(Field<&'a str, 1, NO_OPT_ZERO>),
    Bool(Field<bool, 2, NO_OPT_ZERO>),
    Int(Field<i64, 3, NO_OPT_ZERO>),
    Double(Field<f64, 4, NO_OPT_ZERO>),
    Array(Field<Encoded<ArrayValue<'a>>, 5, NO_OPT_ZERO>),
    Bytes(Field<&'a [u8], 7, NO_OPT_ZERO>),
}

impl Message for AnyValue<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        match self {
            AnyValue::String(field) => sink.field(field),
            AnyValue::Bool(field) => sink.field(field),
            AnyValue::Int(field) => sink.field(field),
            AnyValue::Double(field) => sink.field(field),
            AnyValue::Array(field) => sink.field(field),
            AnyValue::Bytes(field) => sink.field(field),
        }
    }
}

/// `opentelemetry.proto.common.v1.ArrayValue`.
#[derive(Clone, Debug, Default)]
pub struct ArrayValue<'a> {
    pub values: Repeated<AnyValue<'a>, 1>,
}

impl Message for ArrayValue<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.repeated(&self.values)
    }
}

/// `opentelemetry.proto.common.v1.KeyValue`.
#[derive(Clone, Debug)]
pub struct KeyValue<'a> {
    pub key: Field<&'a str, 1, OPT_ZERO>,
    pub value: Field<Encoded<AnyValue<'a>>, 2, NO_OPT_ZERO>,
}

impl Message for KeyValue<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.key)?;
        sink.field(&self.value)
    }
}

/// `opentelemetry.proto.resource.v1.Resource`.
#[derive(Clone, Debug, Default)]
pub struct Resource<'a> {
    pub attributes: Repeated<KeyValue<'a>, 1>,
    pub dropped_attributes_count: Field<u32, 2, OPT_ZERO>,
}

impl Message for Resource<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.repeated(&self.attributes)?;
        sink.field(&self.dropped_attributes_count)
    }
}

/// `opentelemetry.proto.common.v1.InstrumentationScope`.
#[derive(Clone, Debug, Default)]
pub struct InstrumentationScope<'a> {
    pub name: Field<&'a str, 1, OPT_ZERO>,
    pub version: Field<&'a str, 2, OPT_ZERO>,
    pub attributes: Repeated<KeyValue<'a>, 3>,
    pub dropped_attributes_count: Field<u32, 4, OPT_ZERO>,
}

impl Message for InstrumentationScope<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.name)?;
        sink.field(&self.version)?;
        sink.repeated(&self.attributes)?;
        sink.field(&self.dropped_attributes_count)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&AnyValue<'_>> for crate::prost_impls::AnyValue {
    fn from(value: &AnyValue<'_>) -> Self {
        use crate::prost_impls::any_value::Value;
        let value = match value {
            AnyValue::String(field) => Value::StringValue(field.value.to_string()),
            AnyValue::Bool(field) => Value::BoolValue(field.value),
            AnyValue::Int(field) => Value::IntValue(field.value),
            AnyValue::Double(field) => Value::DoubleValue(field.value),
            AnyValue::Array(field) => Value::ArrayValue(crate::prost_impls::ArrayValue {
                values: field
                    .value
                    .message()
                    .values
                    .iter()
                    .map(|value| Self::from(value.value.message()))
                    .collect(),
            }),
            AnyValue::Bytes(field) => Value::BytesValue(field.value.to_vec()),
        };
        Self { value: Some(value) }
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&KeyValue<'_>> for crate::prost_impls::KeyValue {
    fn from(key_value: &KeyValue<'_>) -> Self {
        Self {
            key: key_value.key.value.to_string(),
            value: Some(crate::prost_impls::AnyValue::from(
                key_value.value.value.message(),
            )),
        }
    }
}
