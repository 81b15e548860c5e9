// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The interface instrumentation code programs against.
//!
//! A [`ProfilerProvider`] hands out one [`Profiler`] per instrumentation
//! scope; each profiler creates [`ProfileBuilder`]s which collect the fields
//! of one record and [`ProfileBuilder::emit`] it. The no-op implementations
//! are used until an SDK provider is installed.

use crate::common::{AttributeValue, Context, InstrumentationScope};
use crate::data::ProfileData;
use bytes::Bytes;
use std::sync::{Arc, LazyLock};
use std::time::{SystemTime, UNIX_EPOCH};

pub trait ProfilerProvider: Send + Sync {
    /// Returns the profiler for `scope`. Providers return the same instance
    /// for the same name, version and schema url.
    fn profiler_with_scope(&self, scope: InstrumentationScope) -> Arc<dyn Profiler>;

    fn profiler_builder(&self, name: &str) -> ProfilerBuilder<'_>;

    fn get(&self, name: &str) -> Arc<dyn Profiler> {
        self.profiler_builder(name).build()
    }
}

pub trait Profiler: Send + Sync {
    fn profile_builder(&self) -> ProfileBuilder<'_>;

    /// Called by [`ProfileBuilder::emit`].
    fn emit(&self, profile: PendingProfile);
}

/// Identifies the scope of a profiler before obtaining it.
pub struct ProfilerBuilder<'a> {
    provider: &'a dyn ProfilerProvider,
    scope: InstrumentationScope,
}

impl<'a> ProfilerBuilder<'a> {
    pub fn new(provider: &'a dyn ProfilerProvider, name: &str) -> Self {
        Self {
            provider,
            scope: InstrumentationScope::new(name),
        }
    }

    pub fn set_schema_url(&mut self, schema_url: &str) -> &mut Self {
        self.scope = std::mem::take(&mut self.scope).with_schema_url(schema_url);
        self
    }

    pub fn set_instrumentation_version(&mut self, version: &str) -> &mut Self {
        self.scope = std::mem::take(&mut self.scope).with_version(version);
        self
    }

    pub fn build(&self) -> Arc<dyn Profiler> {
        self.provider.profiler_with_scope(self.scope.clone())
    }
}

/// The fields of a record as set by instrumentation. Unset fields are filled
/// in by the SDK at emission.
#[derive(Clone, Debug, Default)]
pub struct PendingProfile {
    pub profile_id: Option<Vec<u8>>,
    pub timestamp_epoch_nanos: u64,
    pub observed_timestamp_epoch_nanos: Option<u64>,
    pub context: Option<Context>,
    pub attributes: Vec<(String, AttributeValue)>,
    pub original_payload_format: String,
    pub original_payload: Bytes,
    pub profile: Arc<ProfileData>,
}

pub struct ProfileBuilder<'a> {
    profiler: &'a dyn Profiler,
    pending: PendingProfile,
}

fn epoch_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(profiler: &'a dyn Profiler) -> Self {
        Self {
            profiler,
            pending: PendingProfile::default(),
        }
    }

    /// A random version 4 UUID is used when none is set.
    pub fn set_profile_id(&mut self, profile_id: impl Into<Vec<u8>>) -> &mut Self {
        self.pending.profile_id = Some(profile_id.into());
        self
    }

    pub fn set_timestamp_nanos(&mut self, epoch_nanos: u64) -> &mut Self {
        self.pending.timestamp_epoch_nanos = epoch_nanos;
        self
    }

    pub fn set_timestamp(&mut self, time: SystemTime) -> &mut Self {
        self.set_timestamp_nanos(epoch_nanos(time))
    }

    /// Defaults to the provider clock's time at emission.
    pub fn set_observed_timestamp_nanos(&mut self, epoch_nanos: u64) -> &mut Self {
        self.pending.observed_timestamp_epoch_nanos = Some(epoch_nanos);
        self
    }

    pub fn set_observed_timestamp(&mut self, time: SystemTime) -> &mut Self {
        self.set_observed_timestamp_nanos(epoch_nanos(time))
    }

    pub fn set_context(&mut self, context: Context) -> &mut Self {
        self.pending.context = Some(context);
        self
    }

    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> &mut Self {
        self.pending.attributes.push((key.into(), value.into()));
        self
    }

    pub fn set_all_attributes<I, K, V>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        for (key, value) in attributes {
            self.set_attribute(key, value);
        }
        self
    }

    /// The profile in the format it was collected in, e.g. "pprof" or "jfr".
    pub fn set_original_payload(
        &mut self,
        format: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> &mut Self {
        self.pending.original_payload_format = format.into();
        self.pending.original_payload = payload.into();
        self
    }

    pub fn set_profile(&mut self, profile: impl Into<Arc<ProfileData>>) -> &mut Self {
        self.pending.profile = profile.into();
        self
    }

    /// Hands the record to the profiler. The builder is reset and may be
    /// reused.
    pub fn emit(&mut self) {
        self.profiler.emit(std::mem::take(&mut self.pending));
    }
}

/// Hands out [`NoopProfiler`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfilerProvider;

static NOOP_PROVIDER: LazyLock<Arc<dyn ProfilerProvider>> =
    LazyLock::new(|| -> Arc<dyn ProfilerProvider> { Arc::new(NoopProfilerProvider) });

static NOOP_PROFILER: LazyLock<Arc<dyn Profiler>> =
    LazyLock::new(|| -> Arc<dyn Profiler> { Arc::new(NoopProfiler) });

impl NoopProfilerProvider {
    pub fn shared() -> Arc<dyn ProfilerProvider> {
        NOOP_PROVIDER.clone()
    }
}

impl ProfilerProvider for NoopProfilerProvider {
    fn profiler_with_scope(&self, _scope: InstrumentationScope) -> Arc<dyn Profiler> {
        NoopProfiler::shared()
    }

    fn profiler_builder(&self, name: &str) -> ProfilerBuilder<'_> {
        ProfilerBuilder::new(self, name)
    }
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfiler;

impl NoopProfiler {
    pub fn shared() -> Arc<dyn Profiler> {
        NOOP_PROFILER.clone()
    }
}

impl Profiler for NoopProfiler {
    fn profile_builder(&self) -> ProfileBuilder<'_> {
        ProfileBuilder::new(self)
    }

    fn emit(&self, _profile: PendingProfile) {}
}
