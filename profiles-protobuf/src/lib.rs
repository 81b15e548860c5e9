// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! This crate implements Protobuf serializers for the OTLP [`profiles`]
//! schema (the `pprofextended` flavor), including serializers for:
//!
//! - [ExportProfilesServiceRequest], [ResourceProfiles], [ScopeProfiles]
//! - [ProfileContainer] and [Profile]
//! - [Sample] and [Label]
//! - [Location] and [Line]
//! - [Mapping], [Function], [ValueType], [AttributeUnit], [Link]
//! - [KeyValue], [AnyValue], [Resource], [InstrumentationScope]
//!
//! Messages borrow their data. Encoding is done in two passes which share a
//! single description of the message, [`Message::visit`]:
//!
//! 1. [`Encoded::new`] runs the visitor with a [`Measure`] sink. Every child
//!    message was already wrapped in an [`Encoded`] when its parent was
//!    built, so sizes are computed once, bottom-up.
//! 2. [`Encoded::write_to`] runs the visitor again with a [`Writer`] sink,
//!    which writes each field's tag, the cached length of nested messages,
//!    and then the content. Nothing is buffered.
//!
//! This means the length of a whole request is known before the first byte
//! is written, which is what framing protocols need.
//!
//! Serialization often happens one byte at a time, so a buffered writer
//! should probably be used.
//!
//! [`profiles`]: https://github.com/open-telemetry/opentelemetry-proto/tree/main/opentelemetry/proto/profiles

mod attribute_unit;
mod common;
mod fixed;
mod function;
mod link;
mod location;
mod mapping;
mod profile;
mod request;
mod sample;
mod string;
mod value_type;
mod varint;

#[cfg(any(test, feature = "prost_impls"))]
pub mod prost_impls;

pub use attribute_unit::*;
pub use common::*;
pub use fixed::*;
pub use function::*;
pub use link::*;
pub use location::*;
pub use mapping::*;
pub use profile::*;
pub use request::*;
pub use sample::*;
pub use value_type::*;

use std::convert::Infallible;
use std::fmt::{Debug, Formatter};
use std::io::{self, Write};

/// Create a field of a given type, field number, and whether to perform the
/// zero-size optimization or not.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
#[repr(transparent)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Field<T: Value, const N: u32, const O: bool> {
    pub value: T,
}

/// Represents the wire type for the in-wire protobuf encoding. There are more
/// types than are represented here; these are just the supported ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
}

/// A value is stored differently depending on the wire_type.
pub trait Value {
    /// The wire type this value uses.
    const WIRE_TYPE: WireType;

    /// The number of bytes it takes to encode this value. For length
    /// delimited values, this excludes the length prefix.
    fn proto_len(&self) -> u64;

    /// Encode the value to the in-wire protobuf format.
    ///
    /// Serialization often happens one byte at a time, so a buffered writer
    /// should probably be used.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Whether this is the protobuf default for the type. Fields using
    /// [`OPT_ZERO`] skip zero values entirely.
    fn is_zero(&self) -> bool;
}

/// You can use varint to store any of the listed data types:
/// int32 | int64 | uint32 | uint64 | bool | enum | sint32 | sint64
///
/// # Safety
///
/// The [`Value::WIRE_TYPE`] must be [`WireType::Varint`]!
pub unsafe trait Varint: Value + Sized {}

/// Intended to be provided to a Field to mean that it _should_ optimize for a
/// value of zero. See also [`NO_OPT_ZERO`].
pub const OPT_ZERO: bool = true;

/// Intended to be provided to a Field to mean that it shouldn't optimize for a
/// value of zero. Used for repeated elements and oneof members, which are
/// always present on the wire.
pub const NO_OPT_ZERO: bool = false;

impl<T: Value, const N: u32, const O: bool> From<T> for Field<T, N, O> {
    fn from(value: T) -> Self {
        Field { value }
    }
}

impl<T: Value, const N: u32, const O: bool> Field<T, N, O> {
    pub fn proto_len(&self) -> u64 {
        if O && self.value.is_zero() {
            return 0;
        }
        let proto_len = self.value.proto_len();
        let len = if T::WIRE_TYPE == WireType::LengthDelimited {
            proto_len.proto_len()
        } else {
            0
        };
        let tag = Tag::new(N, T::WIRE_TYPE).proto_len();
        tag + len + proto_len
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if O && self.value.is_zero() {
            return Ok(());
        }
        Tag::new(N, T::WIRE_TYPE).encode(writer)?;
        if T::WIRE_TYPE == WireType::LengthDelimited {
            self.value.proto_len().encode(writer)?;
        }
        self.value.encode(writer)
    }
}

impl<T: Debug + Value, const N: u32, const O: bool> Debug for Field<T, N, O> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("value", &self.value)
            .field("number", &N)
            .field("optimize_for_zero", &O)
            .finish()
    }
}

/// The smallest possible protobuf field number.
const MIN_FIELD: u32 = 1;

/// The largest possible protobuf field number.
const MAX_FIELD: u32 = (1 << 29) - 1;

/// A tag is a combination of a wire_type, stored in the least significant
/// three bits, and the field number that is defined in the .proto file.
#[derive(Copy, Clone)]
pub struct Tag(u32);

impl Tag {
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const fn new(field: u32, wire_type: WireType) -> Self {
        debug_assert!(field >= MIN_FIELD && field <= MAX_FIELD);
        Self((field << 3) | wire_type as u32)
    }

    #[inline]
    pub fn proto_len(self) -> u64 {
        (self.0 as u64).proto_len()
    }

    #[inline]
    pub fn encode<W: Write>(self, writer: &mut W) -> io::Result<()> {
        (self.0 as u64).encode(writer)
    }
}

/// Receives the fields of a message in field-number order. Sizing and writing
/// are both sinks, so a message describes its layout exactly once.
pub trait Sink {
    type Error;

    fn field<T: Value, const N: u32, const O: bool>(
        &mut self,
        field: &Field<T, N, O>,
    ) -> Result<(), Self::Error>;

    fn repeated<T: Value, const N: u32, const O: bool>(
        &mut self,
        fields: &[Field<T, N, O>],
    ) -> Result<(), Self::Error> {
        for field in fields {
            self.field(field)?;
        }
        Ok(())
    }

    fn optional<T: Value, const N: u32, const O: bool>(
        &mut self,
        field: &Option<Field<T, N, O>>,
    ) -> Result<(), Self::Error> {
        match field {
            Some(field) => self.field(field),
            None => Ok(()),
        }
    }
}

/// A protobuf message: an ordered list of fields.
pub trait Message {
    /// Hands every field to the sink, in field-number order.
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error>;
}

/// Sink which adds up the encoded length of each field. It never fails.
#[derive(Debug, Default)]
pub struct Measure {
    len: u64,
}

impl Measure {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Sink for Measure {
    type Error = Infallible;

    #[inline]
    fn field<T: Value, const N: u32, const O: bool>(
        &mut self,
        field: &Field<T, N, O>,
    ) -> Result<(), Infallible> {
        self.len += field.proto_len();
        Ok(())
    }
}

/// Sink which writes each field to the underlying writer.
pub struct Writer<'w, W: Write> {
    writer: &'w mut W,
}

impl<'w, W: Write> Writer<'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Sink for Writer<'_, W> {
    type Error = io::Error;

    #[inline]
    fn field<T: Value, const N: u32, const O: bool>(
        &mut self,
        field: &Field<T, N, O>,
    ) -> io::Result<()> {
        field.encode(&mut *self.writer)
    }
}

/// A message paired with its encoded length, which was measured once when
/// the message was wrapped. As a [`Value`], it is a length-delimited field
/// whose length is never recomputed.
#[derive(Clone, Debug)]
pub struct Encoded<M> {
    message: M,
    len: u64,
}

impl<M: Message> Encoded<M> {
    pub fn new(message: M) -> Self {
        let mut measure = Measure::default();
        match message.visit(&mut measure) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        Self {
            message,
            len: measure.len,
        }
    }

    /// The number of bytes of the message body, excluding any tag or length
    /// prefix a parent adds.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn message(&self) -> &M {
        &self.message
    }

    /// Writes the message body as a top-level message.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.message.visit(&mut Writer::new(writer))
    }
}

impl<M: Message + Default> Default for Encoded<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M: Message> Value for Encoded<M> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    #[inline]
    fn proto_len(&self) -> u64 {
        self.len
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_to(writer)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.len == 0
    }
}

/// A repeated message field. An empty boxed slice does not allocate.
pub type Repeated<M, const N: u32> = Box<[Field<Encoded<M>, N, NO_OPT_ZERO>]>;

/// Measures each message and collects them into a repeated field.
pub fn repeated<M, I, const N: u32>(messages: I) -> Repeated<M, N>
where
    M: Message,
    I: IntoIterator<Item = M>,
{
    messages
        .into_iter()
        .map(|message| Field::from(Encoded::new(message)))
        .collect()
}

/// Measures a message and wraps it as a singular message field.
#[inline]
pub fn message<M: Message, const N: u32>(message: M) -> Field<Encoded<M>, N, NO_OPT_ZERO> {
    Field::from(Encoded::new(message))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// Encodes the message, checks that the precomputed length, the number of
    /// bytes written, and prost's idea of the length all agree, then returns
    /// what prost decoded.
    pub fn roundtrip<M: Message, P: prost::Message + Default>(message: M) -> P {
        let encoded = Encoded::new(message);
        let mut buffer = Vec::with_capacity(encoded.len() as usize);
        encoded.write_to(&mut buffer).unwrap();
        assert_eq!(encoded.len() as usize, buffer.len());

        let decoded = P::decode(buffer.as_slice()).unwrap();
        assert_eq!(decoded.encoded_len(), buffer.len());
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_skipped_only_when_optimized() {
        let skipped = Field::<u64, 1, OPT_ZERO>::from(0);
        assert_eq!(skipped.proto_len(), 0);
        let mut buffer = Vec::new();
        skipped.encode(&mut buffer).unwrap();
        assert!(buffer.is_empty());

        let kept = Field::<u64, 1, NO_OPT_ZERO>::from(0);
        assert_eq!(kept.proto_len(), 2);
        kept.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x08, 0x00]);
    }

    #[test]
    fn length_delimited_prefix() {
        let field = Field::<&str, 2, OPT_ZERO>::from("hi");
        let mut buffer = Vec::new();
        field.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x12, 0x02, b'h', b'i']);
        assert_eq!(field.proto_len(), buffer.len() as u64);
    }

    #[test]
    fn empty_repeated_does_not_allocate() {
        let lines: Repeated<Line, 4> = repeated(std::iter::empty());
        assert!(lines.is_empty());
        let empty: Box<[Field<Encoded<Line>, 4, NO_OPT_ZERO>]> = Box::default();
        assert_eq!(lines.as_ptr(), empty.as_ptr());
    }

    #[test]
    fn nested_length_is_cached() {
        let line = Line {
            function_index: 3.into(),
            line: 42.into(),
            column: 0.into(),
        };
        let encoded = Encoded::new(line);
        // 2 fields of 2 bytes each, column is skipped.
        assert_eq!(encoded.len(), 4);

        let field: Field<_, 4, NO_OPT_ZERO> = Field::from(encoded);
        // tag + length prefix + body
        assert_eq!(field.proto_len(), 1 + 1 + 4);
    }
}
