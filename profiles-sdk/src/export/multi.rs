// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::data::ProfileRecord;
use crate::export::ProfileExporter;
use crate::Completion;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Forwards every call to each exporter in registration order. The combined
/// completion succeeds only if all of theirs do.
pub struct MultiProfileExporter {
    exporters: Vec<Arc<dyn ProfileExporter>>,
}

impl MultiProfileExporter {
    pub fn new(exporters: Vec<Arc<dyn ProfileExporter>>) -> Self {
        Self { exporters }
    }

    fn for_each<F>(&self, operation: &'static str, f: F) -> Completion
    where
        F: Fn(&dyn ProfileExporter) -> Completion,
    {
        let completions = self.exporters.iter().map(|exporter| {
            catch_unwind(AssertUnwindSafe(|| f(exporter.as_ref()))).unwrap_or_else(|_| {
                warn!(operation, "Exporter panicked");
                Completion::failed()
            })
        });
        Completion::of_all(completions.collect::<Vec<_>>())
    }
}

impl ProfileExporter for MultiProfileExporter {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion {
        self.for_each("export", |exporter| exporter.export(profiles))
    }

    fn flush(&self) -> Completion {
        self.for_each("flush", |exporter| exporter.flush())
    }

    fn shutdown(&self) -> Completion {
        self.for_each("shutdown", |exporter| exporter.shutdown())
    }
}
