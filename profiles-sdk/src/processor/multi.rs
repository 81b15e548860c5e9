// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::Context;
use crate::processor::ProfileProcessor;
use crate::{Completion, ReadWriteProfile};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Forwards every call to each processor in registration order.
///
/// A processor which panics is logged and counted as failed; the ones after
/// it are still called.
pub struct MultiProfileProcessor {
    processors: Vec<Arc<dyn ProfileProcessor>>,
}

impl MultiProfileProcessor {
    pub fn new(processors: Vec<Arc<dyn ProfileProcessor>>) -> Self {
        Self { processors }
    }

    fn for_each<F>(&self, operation: &'static str, f: F) -> Completion
    where
        F: Fn(&dyn ProfileProcessor) -> Completion,
    {
        let completions: Vec<Completion> = self
            .processors
            .iter()
            .map(|processor| {
                catch_unwind(AssertUnwindSafe(|| f(processor.as_ref()))).unwrap_or_else(|_| {
                    warn!(operation, "Processor panicked");
                    Completion::failed()
                })
            })
            .collect();
        Completion::of_all(completions)
    }
}

impl ProfileProcessor for MultiProfileProcessor {
    fn on_emit(&self, context: &Context, profile: &ReadWriteProfile) {
        for processor in &self.processors {
            if catch_unwind(AssertUnwindSafe(|| processor.on_emit(context, profile))).is_err() {
                warn!(operation = "on_emit", "Processor panicked");
            }
        }
    }

    fn shutdown(&self) -> Completion {
        self.for_each("shutdown", |processor| processor.shutdown())
    }

    fn force_flush(&self) -> Completion {
        self.for_each("force_flush", |processor| processor.force_flush())
    }
}
