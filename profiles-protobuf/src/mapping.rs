// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Sink, Value, Varint, WireType, OPT_ZERO};
use std::io::{self, Write};

/// Indicates the semantics of the build_id field.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub enum BuildIdKind {
    /// Linker-generated build ID, stored in the ELF binary notes.
    #[default]
    Linker = 0,
    /// Build ID based on the content hash of the binary.
    BinaryHash = 1,
}

impl Value for BuildIdKind {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_len(&self) -> u64 {
        (*self as i32).proto_len()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        (*self as i32).encode(writer)
    }

    fn is_zero(&self) -> bool {
        *self == BuildIdKind::Linker
    }
}

unsafe impl Varint for BuildIdKind {}

/// Describes the mapping of a binary in memory, including its address range,
/// file offset, and metadata like build ID.
#[derive(Clone, Debug, Default)]
pub struct Mapping<'a> {
    /// Unique nonzero id for the mapping.
    pub id: Field<u64, 1, OPT_ZERO>,
    /// Address at which the binary (or DLL) is loaded into memory.
    pub memory_start: Field<u64, 2, OPT_ZERO>,
    /// The limit of the address range occupied by this mapping.
    pub memory_limit: Field<u64, 3, OPT_ZERO>,
    /// Offset in the binary that corresponds to the first mapped address.
    pub file_offset: Field<u64, 4, OPT_ZERO>,
    /// Index into the string table.
    pub filename: Field<i64, 5, OPT_ZERO>,
    /// Index into the string table.
    pub build_id: Field<i64, 6, OPT_ZERO>,
    pub has_functions: Field<bool, 7, OPT_ZERO>,
    pub has_filenames: Field<bool, 8, OPT_ZERO>,
    pub has_line_numbers: Field<bool, 9, OPT_ZERO>,
    pub has_inline_frames: Field<bool, 10, OPT_ZERO>,
    pub build_id_kind: Field<BuildIdKind, 11, OPT_ZERO>,
    /// Indices into `Profile.attribute_table`.
    pub attributes: Field<&'a [u64], 12, OPT_ZERO>,
}

impl Message for Mapping<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.id)?;
        sink.field(&self.memory_start)?;
        sink.field(&self.memory_limit)?;
        sink.field(&self.file_offset)?;
        sink.field(&self.filename)?;
        sink.field(&self.build_id)?;
        sink.field(&self.has_functions)?;
        sink.field(&self.has_filenames)?;
        sink.field(&self.has_line_numbers)?;
        sink.field(&self.has_inline_frames)?;
        sink.field(&self.build_id_kind)?;
        sink.field(&self.attributes)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Mapping<'_>> for crate::prost_impls::Mapping {
    fn from(mapping: &Mapping<'_>) -> Self {
        Self {
            id: mapping.id.value,
            memory_start: mapping.memory_start.value,
            memory_limit: mapping.memory_limit.value,
            file_offset: mapping.file_offset.value,
            filename: mapping.filename.value,
            build_id: mapping.build_id.value,
            has_functions: mapping.has_functions.value,
            has_filenames: mapping.has_filenames.value,
            has_line_numbers: mapping.has_line_numbers.value,
            has_inline_frames: mapping.has_inline_frames.value,
            build_id_kind: mapping.build_id_kind.value as i32,
            attributes: mapping.attributes.value.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prost_impls;
    use crate::test_utils::roundtrip;

    #[test]
    fn roundtrip_mapping() {
        bolero::check!()
            .with_type::<(
                (u64, u64, u64, u64),
                (i64, i64, BuildIdKind),
                (bool, bool, bool, bool),
                Vec<u64>,
            )>()
            .for_each(|(addresses, strings, flags, attributes)| {
                let mapping = Mapping {
                    id: addresses.0.into(),
                    memory_start: addresses.1.into(),
                    memory_limit: addresses.2.into(),
                    file_offset: addresses.3.into(),
                    filename: strings.0.into(),
                    build_id: strings.1.into(),
                    build_id_kind: strings.2.into(),
                    has_functions: flags.0.into(),
                    has_filenames: flags.1.into(),
                    has_line_numbers: flags.2.into(),
                    has_inline_frames: flags.3.into(),
                    attributes: attributes.as_slice().into(),
                };
                let expected = prost_impls::Mapping::from(&mapping);
                let decoded: prost_impls::Mapping = roundtrip(mapping);
                assert_eq!(expected, decoded);
            });
    }
}
