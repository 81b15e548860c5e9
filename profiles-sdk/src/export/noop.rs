// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::data::ProfileRecord;
use crate::export::ProfileExporter;
use crate::Completion;
use std::sync::{Arc, LazyLock};

/// Accepts everything and does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfileExporter;

static SHARED: LazyLock<Arc<dyn ProfileExporter>> =
    LazyLock::new(|| -> Arc<dyn ProfileExporter> { Arc::new(NoopProfileExporter) });

impl NoopProfileExporter {
    /// The process-wide instance.
    pub fn shared() -> Arc<dyn ProfileExporter> {
        SHARED.clone()
    }
}

impl ProfileExporter for NoopProfileExporter {
    fn export(&self, _profiles: &[ProfileRecord]) -> Completion {
        Completion::succeeded()
    }

    fn flush(&self) -> Completion {
        Completion::succeeded()
    }

    fn shutdown(&self) -> Completion {
        Completion::succeeded()
    }
}
