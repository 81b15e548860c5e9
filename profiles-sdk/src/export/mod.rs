// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The exporter seam and the exporters which live in-process.

mod in_memory;
mod multi;
mod noop;
mod string_writing;

pub use in_memory::InMemoryProfileExporter;
pub use multi::MultiProfileExporter;
pub use noop::NoopProfileExporter;
pub use string_writing::{StringWritingProfileExporter, StringWritingProfileExporterBuilder};

use crate::data::ProfileRecord;
use crate::Completion;
use std::sync::Arc;
use std::time::Duration;

/// Sends batches of records somewhere.
///
/// A processor never calls `export` concurrently with itself, but different
/// processors sharing an exporter may.
pub trait ProfileExporter: Send + Sync {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion;

    /// Completes once everything handed to `export` so far has been sent.
    fn flush(&self) -> Completion;

    /// Releases resources. Later exports fail.
    fn shutdown(&self) -> Completion;

    /// Shuts down and waits up to 10 seconds for it to finish.
    fn close(&self) {
        self.shutdown().join(Duration::from_secs(10));
    }
}

/// Combines exporters into one which fans out to all of them in order.
pub fn composite(exporters: Vec<Arc<dyn ProfileExporter>>) -> Arc<dyn ProfileExporter> {
    let mut exporters = exporters;
    match exporters.len() {
        0 => NoopProfileExporter::shared(),
        1 => exporters.remove(0),
        _ => Arc::new(MultiProfileExporter::new(exporters)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_shortcuts() {
        assert!(Arc::ptr_eq(
            &composite(Vec::new()),
            &NoopProfileExporter::shared()
        ));

        let exporter: Arc<dyn ProfileExporter> = Arc::new(InMemoryProfileExporter::new());
        assert!(Arc::ptr_eq(&composite(vec![exporter.clone()]), &exporter));
    }
}
