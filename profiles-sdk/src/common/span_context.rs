// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// A 16-byte trace identifier. All zeros is the invalid id.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TraceId([u8; 16]);

impl TraceId {
    pub const INVALID: TraceId = TraceId([0; 16]);

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value.to_be_bytes())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// An 8-byte span identifier. All zeros is the invalid id.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SpanId([u8; 8]);

impl SpanId {
    pub const INVALID: SpanId = SpanId([0; 8]);

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 8] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value.to_be_bytes())
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// The trace correlation of a record.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
}

impl SpanContext {
    pub const INVALID: SpanContext = SpanContext {
        trace_id: TraceId::INVALID,
        span_id: SpanId::INVALID,
    };

    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self { trace_id, span_id }
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    pub fn is_valid(&self) -> bool {
        self.trace_id.is_valid() && self.span_id.is_valid()
    }
}

/// The context a record is emitted in. Only the active span is carried.
#[derive(Clone, Debug, Default)]
pub struct Context {
    span_context: Option<SpanContext>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_span_context(span_context: SpanContext) -> Self {
        Self {
            span_context: Some(span_context),
        }
    }

    /// The active span, or [`SpanContext::INVALID`].
    pub fn span_context(&self) -> SpanContext {
        self.span_context.unwrap_or(SpanContext::INVALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex() {
        let trace_id = TraceId::from(0x0102_u128);
        assert_eq!(trace_id.to_string(), "00000000000000000000000000000102");
        assert_eq!(SpanId::from(0xff_u64).to_string(), "00000000000000ff");
    }

    #[test]
    fn validity() {
        assert!(!SpanContext::INVALID.is_valid());
        assert!(!SpanContext::new(TraceId::from(1), SpanId::INVALID).is_valid());
        assert!(SpanContext::new(TraceId::from(1), SpanId::from(1)).is_valid());
        assert_eq!(Context::new().span_context(), SpanContext::INVALID);
    }
}
