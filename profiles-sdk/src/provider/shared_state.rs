// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Clock, Resource};
use crate::processor::ProfileProcessor;
use crate::{Completion, ProfileLimits};
use std::sync::{Arc, OnceLock};

pub type LimitsSupplier = Arc<dyn Fn() -> ProfileLimits + Send + Sync>;

/// State shared by a provider and all of its profilers.
pub(crate) struct ProfilerSharedState {
    resource: Arc<Resource>,
    limits: LimitsSupplier,
    processor: Arc<dyn ProfileProcessor>,
    clock: Arc<dyn Clock>,
    /// Set by the first shutdown; later calls return the same completion.
    shutdown: OnceLock<Completion>,
}

impl ProfilerSharedState {
    pub(crate) fn new(
        resource: Resource,
        limits: LimitsSupplier,
        processor: Arc<dyn ProfileProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resource: Arc::new(resource),
            limits,
            processor,
            clock,
            shutdown: OnceLock::new(),
        }
    }

    pub(crate) fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// Queried for every record, so limits may change while running.
    pub(crate) fn limits(&self) -> ProfileLimits {
        (self.limits)()
    }

    pub(crate) fn processor(&self) -> &Arc<dyn ProfileProcessor> {
        &self.processor
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn has_been_shutdown(&self) -> bool {
        self.shutdown.get().is_some()
    }

    pub(crate) fn shutdown(&self) -> Completion {
        self.shutdown
            .get_or_init(|| self.processor.shutdown())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Context, SystemClock};
    use crate::ReadWriteProfile;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingShutdown(AtomicUsize);

    impl ProfileProcessor for CountingShutdown {
        fn on_emit(&self, _context: &Context, _profile: &ReadWriteProfile) {}

        fn shutdown(&self) -> Completion {
            self.0.fetch_add(1, Ordering::SeqCst);
            Completion::succeeded()
        }
    }

    #[test]
    fn shutdown_runs_once() {
        let processor = Arc::new(CountingShutdown::default());
        let state = ProfilerSharedState::new(
            Resource::empty(),
            Arc::new(ProfileLimits::default),
            processor.clone(),
            Arc::new(SystemClock),
        );
        assert!(!state.has_been_shutdown());
        assert!(state.shutdown().is_success());
        assert!(state.shutdown().is_success());
        assert!(state.has_been_shutdown());
        assert_eq!(processor.0.load(Ordering::SeqCst), 1);
    }
}
