// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api::{PendingProfile, ProfileBuilder, Profiler};
use crate::common::InstrumentationScope;
use crate::provider::shared_state::ProfilerSharedState;
use crate::ReadWriteProfile;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Emits records for one instrumentation scope.
pub struct SdkProfiler {
    shared: Arc<ProfilerSharedState>,
    scope: Arc<InstrumentationScope>,
}

impl SdkProfiler {
    pub(crate) fn new(shared: Arc<ProfilerSharedState>, scope: InstrumentationScope) -> Self {
        Self {
            shared,
            scope: Arc::new(scope),
        }
    }

    pub fn scope(&self) -> &InstrumentationScope {
        &self.scope
    }
}

impl Profiler for SdkProfiler {
    fn profile_builder(&self) -> ProfileBuilder<'_> {
        ProfileBuilder::new(self)
    }

    /// Dropped silently once the provider has been shut down.
    fn emit(&self, pending: PendingProfile) {
        if self.shared.has_been_shutdown() {
            return;
        }
        let context = pending.context.unwrap_or_default();
        let profile = ReadWriteProfile {
            limits: self.shared.limits(),
            resource: self.shared.resource().clone(),
            scope: self.scope.clone(),
            profile_id: pending
                .profile_id
                .unwrap_or_else(|| Uuid::new_v4().as_bytes().to_vec()),
            timestamp_epoch_nanos: pending.timestamp_epoch_nanos,
            observed_timestamp_epoch_nanos: pending
                .observed_timestamp_epoch_nanos
                .unwrap_or_else(|| self.shared.clock().now()),
            span_context: context.span_context(),
            original_payload_format: pending.original_payload_format,
            original_payload: pending.original_payload,
            profile: pending.profile,
            attributes: Mutex::new(None),
        };
        for (key, value) in pending.attributes {
            profile.set_attribute(key, value);
        }
        self.shared.processor().on_emit(&context, &profile);
    }
}
