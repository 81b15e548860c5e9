// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{
    Encoded, Field, Fixed64, InstrumentationScope, KeyValue, Message, Profile, Repeated,
    Resource, Sink, NO_OPT_ZERO, OPT_ZERO,
};

/// A profile with its identity, timing, and attributes. The profile itself
/// is in the `pprofextended` format; `original_payload` optionally carries
/// the profile in the format it was collected in.
#[derive(Clone, Debug, Default)]
pub struct ProfileContainer<'a> {
    /// A unique identifier for a profile, 16 bytes.
    pub profile_id: Field<&'a [u8], 1, OPT_ZERO>,
    pub start_time_unix_nano: Field<Fixed64, 2, OPT_ZERO>,
    pub end_time_unix_nano: Field<Fixed64, 3, OPT_ZERO>,
    pub attributes: Repeated<KeyValue<'a>, 4>,
    pub dropped_attributes_count: Field<u32, 5, OPT_ZERO>,
    /// For example "pprof" or "jfr".
    pub original_payload_format: Field<&'a str, 6, OPT_ZERO>,
    pub original_payload: Field<&'a [u8], 7, OPT_ZERO>,
    pub profile: Field<Encoded<Profile<'a>>, 8, NO_OPT_ZERO>,
}

impl Message for ProfileContainer<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.profile_id)?;
        sink.field(&self.start_time_unix_nano)?;
        sink.field(&self.end_time_unix_nano)?;
        sink.repeated(&self.attributes)?;
        sink.field(&self.dropped_attributes_count)?;
        sink.field(&self.original_payload_format)?;
        sink.field(&self.original_payload)?;
        sink.field(&self.profile)
    }
}

/// The profiles produced by one instrumentation scope.
#[derive(Clone, Debug)]
pub struct ScopeProfiles<'a> {
    pub scope: Field<Encoded<InstrumentationScope<'a>>, 1, NO_OPT_ZERO>,
    pub profiles: Repeated<ProfileContainer<'a>, 2>,
    pub schema_url: Field<&'a str, 3, OPT_ZERO>,
}

impl Message for ScopeProfiles<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.scope)?;
        sink.repeated(&self.profiles)?;
        sink.field(&self.schema_url)
    }
}

/// The profiles produced by one resource, grouped by scope.
#[derive(Clone, Debug)]
pub struct ResourceProfiles<'a> {
    pub resource: Field<Encoded<Resource<'a>>, 1, NO_OPT_ZERO>,
    pub scope_profiles: Repeated<ScopeProfiles<'a>, 2>,
    pub schema_url: Field<&'a str, 3, OPT_ZERO>,
}

impl Message for ResourceProfiles<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.resource)?;
        sink.repeated(&self.scope_profiles)?;
        sink.field(&self.schema_url)
    }
}

/// The request envelope of the profiles service's `Export` call.
#[derive(Clone, Debug, Default)]
pub struct ExportProfilesServiceRequest<'a> {
    pub resource_profiles: Repeated<ResourceProfiles<'a>, 1>,
}

impl Message for ExportProfilesServiceRequest<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.repeated(&self.resource_profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::roundtrip;
    use crate::{message, prost_impls, repeated, AnyValue};

    fn container<'a>(profile_id: &'a [u8], format: &'a str) -> ProfileContainer<'a> {
        ProfileContainer {
            profile_id: profile_id.into(),
            start_time_unix_nano: Fixed64(1_000).into(),
            end_time_unix_nano: Fixed64(2_000).into(),
            attributes: repeated([KeyValue {
                key: "profile.frame.type".into(),
                value: message(AnyValue::String("native".into())),
            }]),
            dropped_attributes_count: 3.into(),
            original_payload_format: format.into(),
            original_payload: b"raw".as_slice().into(),
            profile: message(Profile::default()),
        }
    }

    #[test]
    fn envelope_roundtrip() {
        let id = [9u8; 16];
        let request = ExportProfilesServiceRequest {
            resource_profiles: repeated([ResourceProfiles {
                resource: message(Resource {
                    attributes: repeated([KeyValue {
                        key: "service.name".into(),
                        value: message(AnyValue::String("checkout".into())),
                    }]),
                    ..Resource::default()
                }),
                scope_profiles: repeated([ScopeProfiles {
                    scope: message(InstrumentationScope {
                        name: "profiler".into(),
                        version: "1.0".into(),
                        ..InstrumentationScope::default()
                    }),
                    profiles: repeated([container(&id, "pprof"), container(&id, "jfr")]),
                    schema_url: "https://opentelemetry.io/schemas/1.21.0".into(),
                }]),
                schema_url: "".into(),
            }]),
        };

        let decoded: prost_impls::ExportProfilesServiceRequest = roundtrip(request);
        assert_eq!(decoded.resource_profiles.len(), 1);
        let resource_profiles = &decoded.resource_profiles[0];
        let resource = resource_profiles.resource.as_ref().unwrap();
        assert_eq!(resource.attributes[0].key, "service.name");
        let scope_profiles = &resource_profiles.scope_profiles[0];
        assert_eq!(scope_profiles.scope.as_ref().unwrap().name, "profiler");
        assert_eq!(scope_profiles.profiles.len(), 2);

        let first = &scope_profiles.profiles[0];
        assert_eq!(first.profile_id, id);
        assert_eq!(first.start_time_unix_nano, 1_000);
        assert_eq!(first.end_time_unix_nano, 2_000);
        assert_eq!(first.dropped_attributes_count, 3);
        assert_eq!(first.original_payload_format, "pprof");
        assert_eq!(first.original_payload, b"raw");
        // An empty profile is still present.
        assert_eq!(first.profile, Some(prost_impls::Profile::default()));
        assert_eq!(scope_profiles.profiles[1].original_payload_format, "jfr");
    }

    #[test]
    fn empty_scope_is_present() {
        let scope_profiles = ScopeProfiles {
            scope: message(InstrumentationScope::default()),
            profiles: Box::default(),
            schema_url: "".into(),
        };
        let encoded = Encoded::new(scope_profiles);
        // tag and zero length of the scope.
        assert_eq!(encoded.len(), 2);
    }
}
