// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The SDK implementation of [`ProfilerProvider`].

mod profiler;
mod registry;
mod shared_state;

pub use profiler::SdkProfiler;
pub use shared_state::LimitsSupplier;

use crate::api::{NoopProfiler, Profiler, ProfilerBuilder, ProfilerProvider};
use crate::common::{Clock, InstrumentationScope, Resource, SystemClock};
use crate::processor::{self, ProfileProcessor};
use crate::{Completion, ProfileLimits};
use registry::ComponentRegistry;
use shared_state::ProfilerSharedState;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_SCOPE_NAME: &str = "unknown";

/// Creates profilers sharing one resource, limits, clock and processor
/// pipeline.
///
/// Dropping the provider closes it: the processors are shut down and the
/// drop waits up to 10 seconds for them.
pub struct SdkProfilerProvider {
    shared: Arc<ProfilerSharedState>,
    registry: ComponentRegistry<SdkProfiler>,
    is_noop: bool,
}

impl SdkProfilerProvider {
    pub fn builder() -> SdkProfilerProviderBuilder {
        SdkProfilerProviderBuilder::default()
    }

    /// Flushes every processor.
    pub fn force_flush(&self) -> Completion {
        self.shared.processor().force_flush()
    }

    /// Shuts the processors down. Records emitted afterwards are dropped.
    /// Only the first call has an effect; every call returns its result.
    pub fn shutdown(&self) -> Completion {
        if self.shared.has_been_shutdown() {
            debug!("Calling shutdown() multiple times.");
        }
        self.shared.shutdown()
    }

    /// Shuts down and waits up to 10 seconds for it to finish.
    pub fn close(&self) {
        self.shutdown().join(Duration::from_secs(10));
    }
}

impl ProfilerProvider for SdkProfilerProvider {
    fn profiler_with_scope(&self, scope: InstrumentationScope) -> Arc<dyn Profiler> {
        if self.is_noop {
            return NoopProfiler::shared();
        }
        let scope = if scope.name().is_empty() {
            debug!("Profiler requested without instrumentation scope name.");
            let mut named = InstrumentationScope::new(DEFAULT_SCOPE_NAME)
                .with_attributes(scope.attributes().clone());
            if let Some(version) = scope.version() {
                named = named.with_version(version);
            }
            if let Some(schema_url) = scope.schema_url() {
                named = named.with_schema_url(schema_url);
            }
            named
        } else {
            scope
        };
        self.registry.get(scope)
    }

    fn profiler_builder(&self, name: &str) -> ProfilerBuilder<'_> {
        ProfilerBuilder::new(self, name)
    }
}

impl Drop for SdkProfilerProvider {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct SdkProfilerProviderBuilder {
    resource: Resource,
    limits: LimitsSupplier,
    clock: Arc<dyn Clock>,
    processors: Vec<Arc<dyn ProfileProcessor>>,
}

impl Default for SdkProfilerProviderBuilder {
    fn default() -> Self {
        Self {
            resource: Resource::default(),
            limits: Arc::new(ProfileLimits::default),
            clock: Arc::new(SystemClock),
            processors: Vec::new(),
        }
    }
}

impl SdkProfilerProviderBuilder {
    /// Replaces the default resource.
    pub fn set_resource(&mut self, resource: Resource) -> &mut Self {
        self.resource = resource;
        self
    }

    /// Merges `resource` into the current one.
    pub fn add_resource(&mut self, resource: &Resource) -> &mut Self {
        self.resource = self.resource.merge(resource);
        self
    }

    pub fn set_profile_limits<F>(&mut self, supplier: F) -> &mut Self
    where
        F: Fn() -> ProfileLimits + Send + Sync + 'static,
    {
        self.limits = Arc::new(supplier);
        self
    }

    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
        self.clock = clock;
        self
    }

    /// Processors are invoked in the order they are added.
    pub fn add_profile_processor(&mut self, processor: Arc<dyn ProfileProcessor>) -> &mut Self {
        self.processors.push(processor);
        self
    }

    pub fn build(&mut self) -> SdkProfilerProvider {
        let processor = processor::composite(std::mem::take(&mut self.processors));
        let is_noop = processor.is_noop();
        let shared = Arc::new(ProfilerSharedState::new(
            self.resource.clone(),
            self.limits.clone(),
            processor,
            self.clock.clone(),
        ));
        let factory_state = shared.clone();
        SdkProfilerProvider {
            registry: ComponentRegistry::new(move |scope| {
                SdkProfiler::new(factory_state.clone(), scope)
            }),
            shared,
            is_noop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AttributeValue, Context, SpanContext, SpanId, TraceId};
    use crate::export::InMemoryProfileExporter;
    use crate::processor::SimpleProfileProcessor;
    use crate::testing::TestClock;

    fn provider(exporter: &Arc<InMemoryProfileExporter>) -> SdkProfilerProvider {
        SdkProfilerProvider::builder()
            .add_profile_processor(Arc::new(SimpleProfileProcessor::new(exporter.clone())))
            .build()
    }

    #[test]
    fn same_scope_same_profiler() {
        let exporter = Arc::new(InMemoryProfileExporter::new());
        let provider = provider(&exporter);
        let a = provider.get("a");
        assert!(Arc::ptr_eq(&a, &provider.get("a")));
        let versioned = provider
            .profiler_builder("a")
            .set_instrumentation_version("1")
            .build();
        assert!(!Arc::ptr_eq(&a, &versioned));
    }

    #[test]
    fn no_processors_means_noop() {
        let provider = SdkProfilerProvider::builder().build();
        assert!(Arc::ptr_eq(&provider.get("a"), &NoopProfiler::shared()));
    }

    #[test]
    fn emit_fills_in_defaults() {
        let exporter = Arc::new(InMemoryProfileExporter::new());
        let clock = Arc::new(TestClock::new(42));
        let provider = SdkProfilerProvider::builder()
            .set_clock(clock.clone())
            .set_profile_limits(|| {
                ProfileLimits::builder()
                    .set_max_number_of_attributes(1)
                    .build()
                    .unwrap_or_default()
            })
            .add_profile_processor(Arc::new(SimpleProfileProcessor::new(exporter.clone())))
            .build();

        let span_context = SpanContext::new(TraceId::from(7), SpanId::from(9));
        provider
            .get("")
            .profile_builder()
            .set_context(Context::with_span_context(span_context))
            .set_attribute("a", "x")
            .set_attribute("b", "y")
            .emit();

        let finished = exporter.finished_profiles();
        assert_eq!(finished.len(), 1);
        let record = &finished[0];
        assert_eq!(record.scope.name(), "unknown");
        assert_eq!(record.profile_id.len(), 16);
        assert_eq!(record.timestamp_epoch_nanos, 0);
        assert_eq!(record.observed_timestamp_epoch_nanos, 42);
        assert_eq!(record.span_context, span_context);
        assert_eq!(record.attributes.get("a"), Some(&AttributeValue::from("x")));
        assert_eq!(record.dropped_attributes_count(), 1);
        assert_eq!(
            record.resource.get("service.name"),
            Some(&AttributeValue::from("unknown_service"))
        );
    }

    #[test]
    fn emit_after_shutdown_is_dropped() {
        let exporter = Arc::new(InMemoryProfileExporter::new());
        let provider = provider(&exporter);
        let profiler = provider.get("a");
        assert!(provider.shutdown().is_success());
        assert!(provider.shutdown().is_success());
        profiler.profile_builder().emit();
        assert!(exporter.finished_profiles().is_empty());
    }
}
