// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The process-wide provider.

use crate::api::{NoopProfilerProvider, Profiler, ProfilerProvider};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<dyn ProfilerProvider>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
#[error("the global profiler provider has already been set")]
pub struct AlreadySetError;

/// Installs the process-wide provider. Can only succeed once; it should
/// happen before the first call to [`provider`].
pub fn set_provider(provider: Arc<dyn ProfilerProvider>) -> Result<(), AlreadySetError> {
    GLOBAL.set(provider).map_err(|_| AlreadySetError)
}

/// The installed provider, or the no-op provider if none was set.
pub fn provider() -> Arc<dyn ProfilerProvider> {
    GLOBAL
        .get()
        .cloned()
        .unwrap_or_else(NoopProfilerProvider::shared)
}

/// Shorthand for `provider().get(name)`.
pub fn profiler(name: &str) -> Arc<dyn Profiler> {
    provider().get(name)
}
