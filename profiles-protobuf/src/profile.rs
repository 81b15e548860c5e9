// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{
    AttributeUnit, Encoded, Field, Function, KeyValue, Link, Location, Mapping, Message,
    Repeated, Sample, Sink, ValueType, NO_OPT_ZERO, OPT_ZERO,
};

/// The `pprofextended` Profile. Every other entity refers to strings by their
/// index in `string_table`, so its order is significant and preserved.
#[derive(Clone, Debug, Default)]
pub struct Profile<'a> {
    pub sample_type: Repeated<ValueType, 1>,
    pub sample: Repeated<Sample<'a>, 2>,
    pub mapping: Repeated<Mapping<'a>, 3>,
    pub location: Repeated<Location<'a>, 4>,
    pub function: Repeated<Function, 5>,
    /// Index 0 should be the empty string.
    pub string_table: Box<[Field<&'a str, 6, NO_OPT_ZERO>]>,
    /// Index into the string table.
    pub drop_frames: Field<i64, 7, OPT_ZERO>,
    /// Index into the string table.
    pub keep_frames: Field<i64, 8, OPT_ZERO>,
    pub time_nanos: Field<i64, 9, OPT_ZERO>,
    pub duration_nanos: Field<i64, 10, OPT_ZERO>,
    pub period_type: Option<Field<Encoded<ValueType>, 11, NO_OPT_ZERO>>,
    pub period: Field<i64, 12, OPT_ZERO>,
    /// Indices into the string table.
    pub comment: Field<&'a [i64], 13, OPT_ZERO>,
    /// Index into the string table.
    pub default_sample_type: Field<i64, 14, OPT_ZERO>,
    /// Indices into `location`, windowed by each sample.
    pub location_indices: Field<&'a [i64], 15, OPT_ZERO>,
    pub attribute_table: Repeated<KeyValue<'a>, 16>,
    pub attribute_units: Repeated<AttributeUnit, 17>,
    pub link_table: Repeated<Link<'a>, 18>,
}

impl Message for Profile<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.repeated(&self.sample_type)?;
        sink.repeated(&self.sample)?;
        sink.repeated(&self.mapping)?;
        sink.repeated(&self.location)?;
        sink.repeated(&self.function)?;
        sink.repeated(&self.string_table)?;
        sink.field(&self.drop_frames)?;
        sink.field(&self.keep_frames)?;
        sink.field(&self.time_nanos)?;
        sink.field(&self.duration_nanos)?;
        sink.optional(&self.period_type)?;
        sink.field(&self.period)?;
        sink.field(&self.comment)?;
        sink.field(&self.default_sample_type)?;
        sink.field(&self.location_indices)?;
        sink.repeated(&self.attribute_table)?;
        sink.repeated(&self.attribute_units)?;
        sink.repeated(&self.link_table)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Profile<'_>> for crate::prost_impls::Profile {
    fn from(profile: &Profile<'_>) -> Self {
        use crate::prost_impls as p;
        fn all<'m, M: Message + 'm, P: From<&'m M>, const N: u32>(
            repeated: &'m [Field<Encoded<M>, N, NO_OPT_ZERO>],
        ) -> Vec<P> {
            repeated
                .iter()
                .map(|field| P::from(field.value.message()))
                .collect()
        }

        Self {
            sample_type: all::<_, p::ValueType, 1>(&profile.sample_type),
            sample: all::<_, p::Sample, 2>(&profile.sample),
            mapping: all::<_, p::Mapping, 3>(&profile.mapping),
            location: all::<_, p::Location, 4>(&profile.location),
            function: all::<_, p::Function, 5>(&profile.function),
            string_table: profile
                .string_table
                .iter()
                .map(|field| field.value.to_string())
                .collect(),
            drop_frames: profile.drop_frames.value,
            keep_frames: profile.keep_frames.value,
            time_nanos: profile.time_nanos.value,
            duration_nanos: profile.duration_nanos.value,
            period_type: profile
                .period_type
                .as_ref()
                .map(|field| p::ValueType::from(field.value.message())),
            period: profile.period.value,
            comment: profile.comment.value.to_vec(),
            default_sample_type: profile.default_sample_type.value,
            location_indices: profile.location_indices.value.to_vec(),
            attribute_table: all::<_, p::KeyValue, 16>(&profile.attribute_table),
            attribute_units: all::<_, p::AttributeUnit, 17>(&profile.attribute_units),
            link_table: all::<_, p::Link, 18>(&profile.link_table),
        }
    }
}
