// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Value, WireType};
use std::io::{self, Write};

/// A `fixed64` value, always 8 little-endian bytes on the wire. Used for
/// timestamps, which are large enough that a varint would not be smaller.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Fixed64(pub u64);

impl From<u64> for Fixed64 {
    fn from(value: u64) -> Self {
        Fixed64(value)
    }
}

impl Value for Fixed64 {
    const WIRE_TYPE: WireType = WireType::Fixed64;

    fn proto_len(&self) -> u64 {
        8
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0.to_le_bytes())
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// A `double`, stored as fixed 64-bit. Only `+0.0` counts as zero, so a
/// negative zero is still written.
impl Value for f64 {
    const WIRE_TYPE: WireType = WireType::Fixed64;

    fn proto_len(&self) -> u64 {
        8
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }

    fn is_zero(&self) -> bool {
        self.to_bits() == 0
    }
}
