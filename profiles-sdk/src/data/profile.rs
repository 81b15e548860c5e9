// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::Attributes;
use crate::IndexError;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AggregationTemporality {
    #[default]
    Unspecified,
    Delta,
    Cumulative,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum BuildIdKind {
    #[default]
    Linker,
    BinaryHash,
}

/// The type and unit of a sample value, as string table indices.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ValueTypeData {
    pub r#type: i64,
    pub unit: i64,
    pub aggregation_temporality: AggregationTemporality,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LabelData {
    pub key: i64,
    pub str: i64,
    pub num: i64,
    pub num_unit: i64,
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SampleData {
    pub location_index: Vec<u64>,
    pub locations_start_index: u64,
    pub locations_length: u64,
    pub stacktrace_id_index: u32,
    pub values: Vec<i64>,
    pub labels: Vec<LabelData>,
    pub attributes: Vec<u64>,
    pub link: u64,
    pub timestamps_unix_nano: Vec<u64>,
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct MappingData {
    pub id: u64,
    pub memory_start: u64,
    pub memory_limit: u64,
    pub file_offset: u64,
    pub filename: i64,
    pub build_id: i64,
    pub build_id_kind: BuildIdKind,
    pub attributes: Vec<u64>,
    pub has_functions: bool,
    pub has_filenames: bool,
    pub has_line_numbers: bool,
    pub has_inline_frames: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LineData {
    pub function_index: u64,
    pub line: i64,
    pub column: i64,
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct LocationData {
    pub id: u64,
    pub mapping_index: u64,
    pub address: u64,
    /// Inlined functions come first, the caller last.
    pub lines: Vec<LineData>,
    pub is_folded: bool,
    pub type_index: u32,
    pub attributes: Vec<u64>,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FunctionData {
    pub id: u64,
    pub name: i64,
    pub system_name: i64,
    pub filename: i64,
    pub start_line: i64,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct AttributeUnitData {
    pub attribute_key: i64,
    pub unit: i64,
}

/// A trace/span id pair samples can refer to. All-zero ids mean "absent".
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LinkData {
    pub trace_id: [u8; 16],
    pub span_id: [u8; 8],
}

/// The `pprofextended` payload of a record.
///
/// Entities refer to each other and to the string table by index. Index 0
/// of every table is reserved for the default (empty) entry, so 0 is valid
/// even when a table is empty. Indices are passed to the wire as they are;
/// use [`ProfileData::check_indices`] to validate them beforehand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileData {
    pub sample_types: Vec<ValueTypeData>,
    pub samples: Vec<SampleData>,
    pub mappings: Vec<MappingData>,
    pub locations: Vec<LocationData>,
    pub location_indices: Vec<i64>,
    pub functions: Vec<FunctionData>,
    pub attribute_table: Attributes,
    pub attribute_units: Vec<AttributeUnitData>,
    pub links: Vec<LinkData>,
    pub string_table: Vec<String>,
    pub drop_frames: i64,
    pub keep_frames: i64,
    pub time_nanos: i64,
    pub duration_nanos: i64,
    pub period_type: Option<ValueTypeData>,
    pub period: i64,
    pub comments: Vec<i64>,
    pub default_sample_type: i64,
}

struct Table {
    name: &'static str,
    len: usize,
}

impl Table {
    fn check(
        &self,
        entity: &'static str,
        position: usize,
        field: &'static str,
        index: i64,
    ) -> Result<(), IndexError> {
        let in_range = index == 0 || usize::try_from(index).is_ok_and(|index| index < self.len);
        if in_range {
            Ok(())
        } else {
            Err(IndexError::OutOfRange {
                entity,
                position,
                field,
                index,
                table: self.name,
                len: self.len,
            })
        }
    }

    fn check_unsigned(
        &self,
        entity: &'static str,
        position: usize,
        field: &'static str,
        index: u64,
    ) -> Result<(), IndexError> {
        self.check(entity, position, field, i64::try_from(index).unwrap_or(i64::MAX))
    }

    fn check_all(
        &self,
        entity: &'static str,
        position: usize,
        field: &'static str,
        indices: &[u64],
    ) -> Result<(), IndexError> {
        indices
            .iter()
            .try_for_each(|index| self.check_unsigned(entity, position, field, *index))
    }
}

impl ProfileData {
    /// Verifies that every index in the payload resolves within its table.
    pub fn check_indices(&self) -> Result<(), IndexError> {
        let strings = Table {
            name: "string_table",
            len: self.string_table.len(),
        };
        let locations = Table {
            name: "locations",
            len: self.locations.len(),
        };
        let mappings = Table {
            name: "mappings",
            len: self.mappings.len(),
        };
        let functions = Table {
            name: "functions",
            len: self.functions.len(),
        };
        let attributes = Table {
            name: "attribute_table",
            len: self.attribute_table.len(),
        };
        let links = Table {
            name: "links",
            len: self.links.len(),
        };

        for (i, value_type) in self.sample_types.iter().chain(&self.period_type).enumerate() {
            strings.check("sample_types", i, "type", value_type.r#type)?;
            strings.check("sample_types", i, "unit", value_type.unit)?;
        }
        for (i, sample) in self.samples.iter().enumerate() {
            locations.check_all("samples", i, "location_index", &sample.location_index)?;
            attributes.check_all("samples", i, "attributes", &sample.attributes)?;
            links.check_unsigned("samples", i, "link", sample.link)?;
            for label in &sample.labels {
                strings.check("samples", i, "label.key", label.key)?;
                strings.check("samples", i, "label.str", label.str)?;
                strings.check("samples", i, "label.num_unit", label.num_unit)?;
            }
        }
        for (i, mapping) in self.mappings.iter().enumerate() {
            strings.check("mappings", i, "filename", mapping.filename)?;
            strings.check("mappings", i, "build_id", mapping.build_id)?;
            attributes.check_all("mappings", i, "attributes", &mapping.attributes)?;
        }
        for (i, location) in self.locations.iter().enumerate() {
            mappings.check_unsigned("locations", i, "mapping_index", location.mapping_index)?;
            attributes.check_all("locations", i, "attributes", &location.attributes)?;
            for line in &location.lines {
                functions.check_unsigned(
                    "locations",
                    i,
                    "line.function_index",
                    line.function_index,
                )?;
            }
        }
        for (i, index) in self.location_indices.iter().enumerate() {
            locations.check("location_indices", i, "value", *index)?;
        }
        for (i, function) in self.functions.iter().enumerate() {
            strings.check("functions", i, "name", function.name)?;
            strings.check("functions", i, "system_name", function.system_name)?;
            strings.check("functions", i, "filename", function.filename)?;
        }
        for (i, unit) in self.attribute_units.iter().enumerate() {
            strings.check("attribute_units", i, "attribute_key", unit.attribute_key)?;
            strings.check("attribute_units", i, "unit", unit.unit)?;
        }
        for (i, comment) in self.comments.iter().enumerate() {
            strings.check("comments", i, "value", *comment)?;
        }
        strings.check("profile", 0, "drop_frames", self.drop_frames)?;
        strings.check("profile", 0, "keep_frames", self.keep_frames)?;
        strings.check("profile", 0, "default_sample_type", self.default_sample_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn valid() -> ProfileData {
        ProfileData {
            sample_types: vec![ValueTypeData {
                r#type: 1,
                unit: 2,
                aggregation_temporality: AggregationTemporality::Delta,
            }],
            samples: vec![SampleData {
                location_index: vec![0, 1],
                values: vec![10],
                link: 1,
                ..Default::default()
            }],
            locations: vec![
                LocationData::default(),
                LocationData {
                    lines: vec![LineData {
                        function_index: 1,
                        line: 42,
                        column: 0,
                    }],
                    ..Default::default()
                },
            ],
            functions: vec![
                FunctionData::default(),
                FunctionData {
                    name: 3,
                    ..Default::default()
                },
            ],
            links: vec![
                LinkData::default(),
                LinkData {
                    trace_id: [1; 16],
                    span_id: [2; 8],
                },
            ],
            string_table: strings(&["", "cpu", "nanoseconds", "main"]),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert_eq!(valid().check_indices(), Ok(()));
        assert_eq!(ProfileData::default().check_indices(), Ok(()));
    }

    #[test]
    fn rejects_string_index() {
        let mut profile = valid();
        profile.functions[1].name = 4;
        assert_eq!(
            profile.check_indices(),
            Err(IndexError::OutOfRange {
                entity: "functions",
                position: 1,
                field: "name",
                index: 4,
                table: "string_table",
                len: 4,
            })
        );
    }

    #[test]
    fn rejects_location_and_negative_indices() {
        let mut profile = valid();
        profile.samples[0].location_index.push(2);
        assert!(matches!(
            profile.check_indices(),
            Err(IndexError::OutOfRange { field: "location_index", .. })
        ));

        let mut profile = valid();
        profile.drop_frames = -1;
        assert!(matches!(
            profile.check_indices(),
            Err(IndexError::OutOfRange { field: "drop_frames", index: -1, .. })
        ));
    }
}
