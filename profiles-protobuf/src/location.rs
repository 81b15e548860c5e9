// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Repeated, Sink, OPT_ZERO};

/// Details a specific line in a source code, linked to a function.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Line {
    /// Index into `Profile.function`.
    pub function_index: Field<u64, 1, OPT_ZERO>,
    /// Line number in source code.
    pub line: Field<i64, 2, OPT_ZERO>,
    /// Column number in source code.
    pub column: Field<i64, 3, OPT_ZERO>,
}

impl Message for Line {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.function_index)?;
        sink.field(&self.line)?;
        sink.field(&self.column)
    }
}

/// Describes function and line table debug information.
#[derive(Clone, Debug, Default)]
pub struct Location<'a> {
    /// Unique nonzero id for the location.
    pub id: Field<u64, 1, OPT_ZERO>,
    /// Index into `Profile.mapping`.
    pub mapping_index: Field<u64, 2, OPT_ZERO>,
    /// The instruction address for this location, if available.
    pub address: Field<u64, 3, OPT_ZERO>,
    /// Multiple line indicates this location has inlined functions, where
    /// the last entry represents the caller into which the preceding entries
    /// were inlined.
    pub line: Repeated<Line, 4>,
    /// Provides an indication that multiple symbols map to this location's
    /// address.
    pub is_folded: Field<bool, 5, OPT_ZERO>,
    /// Index into the string table for the type of frame.
    pub type_index: Field<u32, 6, OPT_ZERO>,
    /// Indices into `Profile.attribute_table`.
    pub attributes: Field<&'a [u64], 7, OPT_ZERO>,
}

impl Message for Location<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.id)?;
        sink.field(&self.mapping_index)?;
        sink.field(&self.address)?;
        sink.repeated(&self.line)?;
        sink.field(&self.is_folded)?;
        sink.field(&self.type_index)?;
        sink.field(&self.attributes)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Line> for crate::prost_impls::Line {
    fn from(line: &Line) -> Self {
        Self {
            function_index: line.function_index.value,
            line: line.line.value,
            column: line.column.value,
        }
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Location<'_>> for crate::prost_impls::Location {
    fn from(location: &Location<'_>) -> Self {
        Self {
            id: location.id.value,
            mapping_index: location.mapping_index.value,
            address: location.address.value,
            line: location
                .line
                .iter()
                .map(|field| crate::prost_impls::Line::from(field.value.message()))
                .collect(),
            is_folded: location.is_folded.value,
            type_index: location.type_index.value,
            attributes: location.attributes.value.to_vec(),
        }
    }
}
