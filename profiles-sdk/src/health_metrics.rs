// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Processor Health Metrics
//!
//! This module defines the health metrics emitted by the profile processors, and the
//! [`MetricsRecorder`] seam through which they leave the SDK.
//!
//! ## Overview
//!
//! Health metrics give visibility into the pipeline itself: how many records made it to an
//! exporter, how many were dropped because the queue was full, and how full the queue is. The
//! SDK does not aggregate or ship them; a [`MetricsRecorder`] supplied to the processor builder
//! receives each measurement as it happens.
//!
//! **Note**: Health metrics are **disabled by default**. The default recorder,
//! [`NoopMetricsRecorder`], discards everything.
//!
//! ## Metric Types
//!
//! - **Count**: Incremental counters that track the number of occurrences
//! - **Gauge**: Point-in-time values read when the measurement is taken
//!
//! ## Attributes
//!
//! Every metric carries `profileProcessorType:<processor>`. `processedProfiles` additionally
//! carries `dropped:true` or `dropped:false`.

use std::fmt::Debug;

/// Number of records handled by a processor.
///
/// **Type**: Count  
/// **When Emitted**:
/// - `dropped:true` when a record is refused because the queue is full
/// - `dropped:false` for the records of each successful export
///
/// **Attributes**: `profileProcessorType`, `dropped`
pub const PROCESSED_PROFILES: &str = "processedProfiles";

/// Number of records waiting in the queue.
///
/// **Type**: Gauge  
/// **When Emitted**: After each export attempt  
/// **Attributes**: `profileProcessorType`
pub const QUEUE_SIZE: &str = "queueSize";

pub const ATTR_PROCESSOR_TYPE: &str = "profileProcessorType";
pub const ATTR_DROPPED: &str = "dropped";

pub const BATCH_PROFILE_PROCESSOR: &str = "BatchProfileProcessor";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HealthMetric {
    Count(&'static str, i64),
    Gauge(&'static str, i64),
}

impl HealthMetric {
    pub fn name(&self) -> &'static str {
        match self {
            HealthMetric::Count(name, _) | HealthMetric::Gauge(name, _) => name,
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            HealthMetric::Count(_, value) | HealthMetric::Gauge(_, value) => *value,
        }
    }
}

/// Receives health metrics. Called from producer threads and from processor
/// workers, so implementations must not block.
pub trait MetricsRecorder: Debug + Send + Sync {
    fn record(&self, metric: HealthMetric, attributes: &[(&'static str, &'static str)]);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsRecorder;

impl MetricsRecorder for NoopMetricsRecorder {
    fn record(&self, _metric: HealthMetric, _attributes: &[(&'static str, &'static str)]) {}
}

pub(crate) fn dropped_attribute(dropped: bool) -> (&'static str, &'static str) {
    (ATTR_DROPPED, if dropped { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let metric = HealthMetric::Count(PROCESSED_PROFILES, 3);
        assert_eq!(metric.name(), "processedProfiles");
        assert_eq!(metric.value(), 3);
        assert_eq!(HealthMetric::Gauge(QUEUE_SIZE, 7).name(), "queueSize");
    }

    #[test]
    fn test_dropped_attribute() {
        assert_eq!(dropped_attribute(true), ("dropped", "true"));
        assert_eq!(dropped_attribute(false), ("dropped", "false"));
    }
}
