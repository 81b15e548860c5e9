// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use parking_lot::Mutex;
use profiles_otlp::{OtlpProfileExporter, Protocol, Request, Transport};
use profiles_protobuf::prost_impls::{any_value::Value, ExportProfilesServiceRequest};
use profiles_sdk::api::ProfilerProvider;
use profiles_sdk::common::{Attributes, Context, Resource, SpanContext, SpanId, TraceId};
use profiles_sdk::data::{ProfileData, SampleData};
use profiles_sdk::processor::BatchProfileProcessor;
use profiles_sdk::provider::SdkProfilerProvider;
use profiles_sdk::testing::TestClock;
use prost::Message as _;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Collector {
    requests: Mutex<Vec<Request>>,
}

impl Transport for Collector {
    fn send(&self, request: Request) -> anyhow::Result<()> {
        self.requests.lock().push(request);
        Ok(())
    }
}

#[test]
fn provider_to_wire() {
    let collector = Arc::new(Collector::default());
    let exporter = OtlpProfileExporter::builder(collector.clone())
        .set_protocol(Protocol::HttpProtobuf)
        .build();
    let processor = BatchProfileProcessor::builder(Arc::new(exporter))
        .set_schedule_delay(Duration::from_secs(60))
        .build()
        .unwrap();
    let provider = SdkProfilerProvider::builder()
        .set_resource(Resource::new(Attributes::new().with("service.name", "checkout")))
        .set_clock(Arc::new(TestClock::new(5_000)))
        .add_profile_processor(Arc::new(processor))
        .build();

    let profiler = provider
        .profiler_builder("async-profiler")
        .set_instrumentation_version("3.0")
        .build();
    let span = SpanContext::new(TraceId::from(1u128), SpanId::from(2u64));
    for i in 0..3i64 {
        profiler
            .profile_builder()
            .set_timestamp_nanos(1_000)
            .set_context(Context::with_span_context(span))
            .set_attribute("iteration", i)
            .set_original_payload("jfr", b"payload".as_slice())
            .set_profile(ProfileData {
                string_table: vec![String::new(), "cpu".to_string()],
                samples: vec![SampleData {
                    values: vec![i],
                    ..SampleData::default()
                }],
                ..ProfileData::default()
            })
            .emit();
    }
    assert!(provider.force_flush().join(Duration::from_secs(5)).is_success());

    let requests = collector.requests.lock();
    assert_eq!(requests.len(), 1);
    let request = ExportProfilesServiceRequest::decode(requests[0].body.clone()).unwrap();
    assert_eq!(request.resource_profiles.len(), 1);
    let resource = request.resource_profiles[0].resource.as_ref().unwrap();
    assert_eq!(resource.attributes.len(), 1);
    assert_eq!(
        resource.attributes[0].value.as_ref().and_then(|v| v.value.clone()),
        Some(Value::StringValue("checkout".to_string()))
    );

    let scope_profiles = &request.resource_profiles[0].scope_profiles;
    assert_eq!(scope_profiles.len(), 1);
    let scope = scope_profiles[0].scope.as_ref().unwrap();
    assert_eq!(scope.name, "async-profiler");
    assert_eq!(scope.version, "3.0");

    let profiles = &scope_profiles[0].profiles;
    assert_eq!(profiles.len(), 3);
    for (i, container) in profiles.iter().enumerate() {
        assert_eq!(container.profile_id.len(), 16);
        assert_eq!(container.start_time_unix_nano, 1_000);
        assert_eq!(container.end_time_unix_nano, 5_000);
        assert_eq!(container.original_payload_format, "jfr");
        assert_eq!(container.original_payload, b"payload");
        assert_eq!(
            container.attributes[0].value.as_ref().and_then(|v| v.value.clone()),
            Some(Value::IntValue(i as i64))
        );
        let profile = container.profile.as_ref().unwrap();
        assert_eq!(profile.sample[0].value, vec![i as i64]);
    }
    assert_ne!(profiles[0].profile_id, profiles[1].profile_id);

    drop(requests);
    assert!(provider.shutdown().join(Duration::from_secs(5)).is_success());
}
