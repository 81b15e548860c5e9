// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::Context;
use crate::export::ProfileExporter;
use crate::processor::ProfileProcessor;
use crate::{Completion, ReadWriteProfile};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Exports each record as soon as it is emitted, as a batch of one.
///
/// Meant for tests and debugging: the export runs on the emitting thread.
pub struct SimpleProfileProcessor {
    exporter: Arc<dyn ProfileExporter>,
    /// Serializes calls into the exporter.
    export_lock: Mutex<()>,
    pending: Arc<Mutex<HashMap<u64, Completion>>>,
    next_id: AtomicU64,
    is_shutdown: AtomicBool,
}

impl SimpleProfileProcessor {
    pub fn new(exporter: Arc<dyn ProfileExporter>) -> Self {
        Self {
            exporter,
            export_lock: Mutex::new(()),
            pending: Arc::default(),
            next_id: AtomicU64::new(0),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl ProfileProcessor for SimpleProfileProcessor {
    fn on_emit(&self, _context: &Context, profile: &ReadWriteProfile) {
        let records = [profile.to_data()];
        let result = {
            let _guard = self.export_lock.lock();
            catch_unwind(AssertUnwindSafe(|| self.exporter.export(&records)))
        };
        let Ok(result) = result else {
            warn!("Exporter panicked");
            return;
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().insert(id, result.clone());
        let pending = self.pending.clone();
        result.when_complete(move |success| {
            pending.lock().remove(&id);
            if !success {
                debug!("Exporter failed");
            }
        });
    }

    fn shutdown(&self) -> Completion {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return Completion::succeeded();
        }
        let result = Completion::new();
        let flushed = self.force_flush();
        let exporter = self.exporter.clone();
        let done = result.clone();
        flushed.clone().when_complete(move |_| {
            let shutdown = exporter.shutdown();
            shutdown.clone().when_complete(move |shutdown_ok| {
                if flushed.is_success() && shutdown_ok {
                    done.succeed();
                } else {
                    done.fail();
                }
            });
        });
        result
    }

    /// Completes once every export started so far has completed.
    fn force_flush(&self) -> Completion {
        let pending: Vec<Completion> = self.pending.lock().values().cloned().collect();
        Completion::of_all(pending)
    }
}
