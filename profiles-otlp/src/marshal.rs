// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use profiles_protobuf::{self as pb, message, repeated, Encoded, Field, Fixed64, Repeated};
use profiles_sdk::common::{AttributeValue, Attributes, InstrumentationScope, Resource};
use profiles_sdk::data::{
    self, AttributeUnitData, FunctionData, LabelData, LineData, LinkData, LocationData,
    MappingData, ProfileData, ProfileRecord, SampleData, ValueTypeData,
};
use std::io::{self, Write};

/// An `ExportProfilesServiceRequest` built over a batch of records.
///
/// The request borrows everything it writes from the records. Its size is
/// measured once, on creation, so callers can frame or preallocate before
/// writing a single byte.
#[derive(Debug)]
pub struct ProfilesRequestMarshaler<'a> {
    request: Encoded<pb::ExportProfilesServiceRequest<'a>>,
}

impl<'a> ProfilesRequestMarshaler<'a> {
    /// Groups `records` by resource, then by instrumentation scope, both in
    /// the order they are first seen. Groups are formed by value, so records
    /// holding different allocations of equal resources share a group.
    pub fn create(records: &'a [ProfileRecord]) -> Self {
        let groups = group_by_resource_and_scope(records);
        let request = pb::ExportProfilesServiceRequest {
            resource_profiles: repeated(groups.iter().map(resource_profiles)),
        };
        Self {
            request: Encoded::new(request),
        }
    }

    /// Exact number of bytes [`Self::write_to`] produces.
    #[inline]
    pub fn len(&self) -> u64 {
        self.request.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.request.is_empty()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.request.write_to(writer)
    }

    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let len = usize::try_from(self.len())
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "request too large"))?;
        let mut buffer = Vec::with_capacity(len);
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }
}

pub(crate) struct ScopeGroup<'a> {
    pub(crate) scope: &'a InstrumentationScope,
    pub(crate) records: Vec<&'a ProfileRecord>,
}

pub(crate) struct ResourceGroup<'a> {
    pub(crate) resource: &'a Resource,
    pub(crate) scopes: Vec<ScopeGroup<'a>>,
}

/// Groups keep the order in which their first record appears.
pub(crate) fn group_by_resource_and_scope(records: &[ProfileRecord]) -> Vec<ResourceGroup<'_>> {
    let mut groups: Vec<ResourceGroup<'_>> = Vec::new();
    for record in records {
        let position = match groups
            .iter()
            .position(|group| *group.resource == *record.resource)
        {
            Some(position) => position,
            None => {
                groups.push(ResourceGroup {
                    resource: &record.resource,
                    scopes: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let scopes = &mut groups[position].scopes;
        match scopes
            .iter_mut()
            .find(|group| *group.scope == *record.scope)
        {
            Some(group) => group.records.push(record),
            None => scopes.push(ScopeGroup {
                scope: &record.scope,
                records: vec![record],
            }),
        }
    }
    groups
}

fn resource_profiles<'a>(group: &ResourceGroup<'a>) -> pb::ResourceProfiles<'a> {
    let resource = group.resource;
    pb::ResourceProfiles {
        resource: message(pb::Resource {
            attributes: key_values(resource.attributes()),
            ..pb::Resource::default()
        }),
        scope_profiles: repeated(group.scopes.iter().map(scope_profiles)),
        schema_url: resource.schema_url().unwrap_or_default().into(),
    }
}

fn scope_profiles<'a>(group: &ScopeGroup<'a>) -> pb::ScopeProfiles<'a> {
    let scope = group.scope;
    pb::ScopeProfiles {
        scope: message(pb::InstrumentationScope {
            name: scope.name().into(),
            version: scope.version().unwrap_or_default().into(),
            attributes: key_values(scope.attributes()),
            ..pb::InstrumentationScope::default()
        }),
        profiles: repeated(group.records.iter().copied().map(container)),
        schema_url: scope.schema_url().unwrap_or_default().into(),
    }
}

fn container(record: &ProfileRecord) -> pb::ProfileContainer<'_> {
    let dropped = u32::try_from(record.dropped_attributes_count()).unwrap_or(u32::MAX);
    pb::ProfileContainer {
        profile_id: record.profile_id.as_slice().into(),
        start_time_unix_nano: Fixed64(record.timestamp_epoch_nanos).into(),
        end_time_unix_nano: Fixed64(record.observed_timestamp_epoch_nanos).into(),
        attributes: key_values(&record.attributes),
        dropped_attributes_count: dropped.into(),
        original_payload_format: record.original_payload_format.as_str().into(),
        original_payload: (&record.original_payload[..]).into(),
        profile: message(profile(&record.profile)),
    }
}

fn profile(data: &ProfileData) -> pb::Profile<'_> {
    pb::Profile {
        sample_type: repeated(data.sample_types.iter().map(value_type)),
        sample: repeated(data.samples.iter().map(sample)),
        mapping: repeated(data.mappings.iter().map(mapping)),
        location: repeated(data.locations.iter().map(location)),
        function: repeated(data.functions.iter().map(function)),
        string_table: data
            .string_table
            .iter()
            .map(|s| Field::from(s.as_str()))
            .collect(),
        drop_frames: data.drop_frames.into(),
        keep_frames: data.keep_frames.into(),
        time_nanos: data.time_nanos.into(),
        duration_nanos: data.duration_nanos.into(),
        period_type: data.period_type.as_ref().map(|vt| message(value_type(vt))),
        period: data.period.into(),
        comment: data.comments.as_slice().into(),
        default_sample_type: data.default_sample_type.into(),
        location_indices: data.location_indices.as_slice().into(),
        attribute_table: key_values(&data.attribute_table),
        attribute_units: repeated(data.attribute_units.iter().map(attribute_unit)),
        link_table: repeated(data.links.iter().map(link)),
    }
}

fn value_type(value_type: &ValueTypeData) -> pb::ValueType {
    let aggregation_temporality = match value_type.aggregation_temporality {
        data::AggregationTemporality::Unspecified => pb::AggregationTemporality::Unspecified,
        data::AggregationTemporality::Delta => pb::AggregationTemporality::Delta,
        data::AggregationTemporality::Cumulative => pb::AggregationTemporality::Cumulative,
    };
    pb::ValueType {
        r#type: value_type.r#type.into(),
        unit: value_type.unit.into(),
        aggregation_temporality: aggregation_temporality.into(),
    }
}

fn sample(sample: &SampleData) -> pb::Sample<'_> {
    pb::Sample {
        location_index: sample.location_index.as_slice().into(),
        value: sample.values.as_slice().into(),
        label: repeated(sample.labels.iter().map(label)),
        locations_start_index: sample.locations_start_index.into(),
        locations_length: sample.locations_length.into(),
        stacktrace_id_index: sample.stacktrace_id_index.into(),
        attributes: sample.attributes.as_slice().into(),
        link: sample.link.into(),
        timestamps_unix_nano: sample.timestamps_unix_nano.as_slice().into(),
    }
}

fn label(label: &LabelData) -> pb::Label {
    pb::Label {
        key: label.key.into(),
        str: label.str.into(),
        num: label.num.into(),
        num_unit: label.num_unit.into(),
    }
}

fn mapping(mapping: &MappingData) -> pb::Mapping<'_> {
    let build_id_kind = match mapping.build_id_kind {
        data::BuildIdKind::Linker => pb::BuildIdKind::Linker,
        data::BuildIdKind::BinaryHash => pb::BuildIdKind::BinaryHash,
    };
    pb::Mapping {
        id: mapping.id.into(),
        memory_start: mapping.memory_start.into(),
        memory_limit: mapping.memory_limit.into(),
        file_offset: mapping.file_offset.into(),
        filename: mapping.filename.into(),
        build_id: mapping.build_id.into(),
        has_functions: mapping.has_functions.into(),
        has_filenames: mapping.has_filenames.into(),
        has_line_numbers: mapping.has_line_numbers.into(),
        has_inline_frames: mapping.has_inline_frames.into(),
        build_id_kind: build_id_kind.into(),
        attributes: mapping.attributes.as_slice().into(),
    }
}

fn location(location: &LocationData) -> pb::Location<'_> {
    pb::Location {
        id: location.id.into(),
        mapping_index: location.mapping_index.into(),
        address: location.address.into(),
        line: repeated(location.lines.iter().map(line)),
        is_folded: location.is_folded.into(),
        type_index: location.type_index.into(),
        attributes: location.attributes.as_slice().into(),
    }
}

fn line(line: &LineData) -> pb::Line {
    pb::Line {
        function_index: line.function_index.into(),
        line: line.line.into(),
        column: line.column.into(),
    }
}

fn function(function: &FunctionData) -> pb::Function {
    pb::Function {
        id: function.id.into(),
        name: function.name.into(),
        system_name: function.system_name.into(),
        filename: function.filename.into(),
        start_line: function.start_line.into(),
    }
}

fn attribute_unit(unit: &AttributeUnitData) -> pb::AttributeUnit {
    pb::AttributeUnit {
        attribute_key: unit.attribute_key.into(),
        unit: unit.unit.into(),
    }
}

fn link(link: &LinkData) -> pb::Link<'_> {
    pb::Link::new(&link.trace_id, &link.span_id)
}

fn key_values<const N: u32>(attributes: &Attributes) -> Repeated<pb::KeyValue<'_>, N> {
    repeated(attributes.iter().map(|(key, value)| pb::KeyValue {
        key: key.into(),
        value: message(any_value(value)),
    }))
}

fn any_value(value: &AttributeValue) -> pb::AnyValue<'_> {
    match value {
        AttributeValue::String(value) => pb::AnyValue::String(value.as_str().into()),
        AttributeValue::Bool(value) => pb::AnyValue::Bool((*value).into()),
        AttributeValue::Int(value) => pb::AnyValue::Int((*value).into()),
        AttributeValue::Double(value) => pb::AnyValue::Double((*value).into()),
        AttributeValue::StringArray(values) => array(
            values
                .iter()
                .map(|value| pb::AnyValue::String(value.as_str().into())),
        ),
        AttributeValue::BoolArray(values) => {
            array(values.iter().map(|value| pb::AnyValue::Bool((*value).into())))
        }
        AttributeValue::IntArray(values) => {
            array(values.iter().map(|value| pb::AnyValue::Int((*value).into())))
        }
        AttributeValue::DoubleArray(values) => {
            array(values.iter().map(|value| pb::AnyValue::Double((*value).into())))
        }
    }
}

fn array<'a>(values: impl Iterator<Item = pb::AnyValue<'a>>) -> pb::AnyValue<'a> {
    pb::AnyValue::Array(message(pb::ArrayValue {
        values: repeated(values),
    }))
}
