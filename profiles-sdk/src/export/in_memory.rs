// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::data::ProfileRecord;
use crate::export::ProfileExporter;
use crate::Completion;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps every exported record in memory, for tests.
#[derive(Debug, Default)]
pub struct InMemoryProfileExporter {
    finished: Mutex<Vec<ProfileRecord>>,
    is_shutdown: AtomicBool,
}

impl InMemoryProfileExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The records exported so far, in export order.
    pub fn finished_profiles(&self) -> Vec<ProfileRecord> {
        self.finished.lock().clone()
    }

    pub fn reset(&self) {
        self.finished.lock().clear();
    }
}

impl ProfileExporter for InMemoryProfileExporter {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Completion::failed();
        }
        self.finished.lock().extend_from_slice(profiles);
        Completion::succeeded()
    }

    fn flush(&self) -> Completion {
        Completion::succeeded()
    }

    /// Clears the collected records.
    fn shutdown(&self) -> Completion {
        self.is_shutdown.store(true, Ordering::SeqCst);
        self.reset();
        Completion::succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_until_shutdown() {
        let exporter = InMemoryProfileExporter::new();
        assert!(exporter
            .export(&[ProfileRecord::default(), ProfileRecord::default()])
            .is_success());
        assert_eq!(exporter.finished_profiles().len(), 2);
        exporter.reset();
        assert!(exporter.finished_profiles().is_empty());

        assert!(exporter.shutdown().is_success());
        assert!(!exporter.export(&[ProfileRecord::default()]).is_success());
        assert!(exporter.finished_profiles().is_empty());
    }
}
