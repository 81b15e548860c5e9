// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Repeated, Sink, OPT_ZERO};

/// A label includes additional context for this sample. It can include
/// things like a thread id, allocation size, etc.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(test, derive(bolero::generator::TypeGenerator))]
pub struct Label {
    /// Index into the string table.
    pub key: Field<i64, 1, OPT_ZERO>,
    /// Index into the string table. At most one of `str` and `num` is set.
    pub str: Field<i64, 2, OPT_ZERO>,
    pub num: Field<i64, 3, OPT_ZERO>,
    /// Index into the string table.
    pub num_unit: Field<i64, 4, OPT_ZERO>,
}

impl Message for Label {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.key)?;
        sink.field(&self.str)?;
        sink.field(&self.num)?;
        sink.field(&self.num_unit)
    }
}

/// Each Sample records values encountered in some program context. The
/// program context is typically a stack trace, perhaps augmented with
/// auxiliary information like the thread-id, some indicator of a higher level
/// request being handled, etc.
///
/// The stack is either given directly through `location_index`, or as a
/// window into `Profile.location_indices` through `locations_start_index`
/// and `locations_length`.
#[derive(Clone, Debug, Default)]
pub struct Sample<'a> {
    /// Indices into `Profile.location`. The leaf is at index 0.
    pub location_index: Field<&'a [u64], 1, OPT_ZERO>,
    /// One value per `Profile.sample_type`.
    pub value: Field<&'a [i64], 2, OPT_ZERO>,
    pub label: Repeated<Label, 3>,
    pub locations_start_index: Field<u64, 7, OPT_ZERO>,
    pub locations_length: Field<u64, 8, OPT_ZERO>,
    pub stacktrace_id_index: Field<u32, 9, OPT_ZERO>,
    /// Indices into `Profile.attribute_table`.
    pub attributes: Field<&'a [u64], 10, OPT_ZERO>,
    /// Index into `Profile.link_table`.
    pub link: Field<u64, 12, OPT_ZERO>,
    pub timestamps_unix_nano: Field<&'a [u64], 13, OPT_ZERO>,
}

impl Message for Sample<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.location_index)?;
        sink.field(&self.value)?;
        sink.repeated(&self.label)?;
        sink.field(&self.locations_start_index)?;
        sink.field(&self.locations_length)?;
        sink.field(&self.stacktrace_id_index)?;
        sink.field(&self.attributes)?;
        sink.field(&self.link)?;
        sink.field(&self.timestamps_unix_nano)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Label> for crate::prost_impls::Label {
    fn from(label: &Label) -> Self {
        Self {
            key: label.key.value,
            str: label.str.value,
            num: label.num.value,
            num_unit: label.num_unit.value,
        }
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Sample<'_>> for crate::prost_impls::Sample {
    fn from(sample: &Sample<'_>) -> Self {
        // If the prost file is regenerated, this may pick up new members.
        #[allow(clippy::needless_update)]
        Self {
            location_index: sample.location_index.value.to_vec(),
            value: sample.value.value.to_vec(),
            label: sample
                .label
                .iter()
                .map(|field| crate::prost_impls::Label::from(field.value.message()))
                .collect(),
            locations_start_index: sample.locations_start_index.value,
            locations_length: sample.locations_length.value,
            stacktrace_id_index: sample.stacktrace_id_index.value,
            attributes: sample.attributes.value.to_vec(),
            link: sample.link.value,
            timestamps_unix_nano: sample.timestamps_unix_nano.value.to_vec(),
            ..Self::default()
        }
    }
}
