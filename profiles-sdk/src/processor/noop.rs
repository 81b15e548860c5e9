// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::Context;
use crate::processor::ProfileProcessor;
use crate::ReadWriteProfile;
use std::sync::{Arc, LazyLock};

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfileProcessor;

static SHARED: LazyLock<Arc<dyn ProfileProcessor>> =
    LazyLock::new(|| -> Arc<dyn ProfileProcessor> { Arc::new(NoopProfileProcessor) });

impl NoopProfileProcessor {
    /// The process-wide instance.
    pub fn shared() -> Arc<dyn ProfileProcessor> {
        SHARED.clone()
    }
}

impl ProfileProcessor for NoopProfileProcessor {
    fn on_emit(&self, _context: &Context, _profile: &ReadWriteProfile) {}

    fn is_noop(&self) -> bool {
        true
    }
}
