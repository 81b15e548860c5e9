// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::Context;
use crate::data::ProfileRecord;
use crate::export::ProfileExporter;
use crate::health_metrics::{
    dropped_attribute, HealthMetric, MetricsRecorder, NoopMetricsRecorder, ATTR_PROCESSOR_TYPE,
    BATCH_PROFILE_PROCESSOR, PROCESSED_PROFILES, QUEUE_SIZE,
};
use crate::processor::ProfileProcessor;
use crate::{Completion, ConfigError, ReadWriteProfile};
use crossbeam_queue::ArrayQueue;
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const WORKER_THREAD_NAME: &str = "BatchProfileProcessor_WorkerThread";

pub const DEFAULT_SCHEDULE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 2048;
pub const DEFAULT_MAX_EXPORT_BATCH_SIZE: usize = 512;
pub const DEFAULT_EXPORTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Sentinel for [`Worker::profiles_needed`]: the worker is not waiting.
const NOT_WAITING: usize = usize::MAX;

#[derive(Default)]
struct FlushState {
    requested: Option<Completion>,
    worker_stopped: bool,
}

struct Worker {
    exporter: Arc<dyn ProfileExporter>,
    metrics: Arc<dyn MetricsRecorder>,
    schedule_delay: Duration,
    max_export_batch_size: usize,
    exporter_timeout: Duration,
    queue: ArrayQueue<ProfileRecord>,
    /// How many queued records the worker waits for before it wants to be
    /// woken up early.
    profiles_needed: AtomicUsize,
    signaled: Mutex<bool>,
    signal: Condvar,
    flush: Mutex<FlushState>,
    continue_work: AtomicBool,
}

impl Worker {
    fn add_profile(&self, record: ProfileRecord) {
        if self.queue.push(record).is_err() {
            self.metrics.record(
                HealthMetric::Count(PROCESSED_PROFILES, 1),
                &[
                    (ATTR_PROCESSOR_TYPE, BATCH_PROFILE_PROCESSOR),
                    dropped_attribute(true),
                ],
            );
        } else if self.queue.len() >= self.profiles_needed.load(Ordering::SeqCst) {
            self.wake();
        }
    }

    fn wake(&self) {
        *self.signaled.lock() = true;
        self.signal.notify_one();
    }

    fn run(&self) {
        let mut batch = Vec::with_capacity(self.max_export_batch_size);
        let mut next_export = Instant::now() + self.schedule_delay;

        while self.continue_work.load(Ordering::SeqCst) {
            // A request made while this one drains gets its own token.
            let requested = self.flush.lock().requested.take();
            if let Some(requested) = requested {
                if self.flush(&mut batch) {
                    requested.succeed();
                } else {
                    requested.fail();
                }
            }

            while batch.len() < self.max_export_batch_size {
                match self.queue.pop() {
                    Some(record) => batch.push(record),
                    None => break,
                }
            }

            if batch.len() >= self.max_export_batch_size || Instant::now() >= next_export {
                self.export_current_batch(&mut batch);
                next_export = Instant::now() + self.schedule_delay;
            }

            if self.queue.is_empty() && Instant::now() < next_export {
                let needed = self.max_export_batch_size - batch.len();
                self.profiles_needed.store(needed, Ordering::SeqCst);
                let mut signaled = self.signaled.lock();
                if !*signaled && self.queue.len() < needed {
                    self.signal.wait_until(&mut signaled, next_export);
                }
                *signaled = false;
                drop(signaled);
                self.profiles_needed.store(NOT_WAITING, Ordering::SeqCst);
            }
        }

        let mut state = self.flush.lock();
        state.worker_stopped = true;
        let requested = state.requested.take();
        drop(state);
        if let Some(requested) = requested {
            if self.queue.is_empty() {
                requested.succeed();
            } else {
                requested.fail();
            }
        }
    }

    /// Exports everything queued at the time of the call. Returns false if
    /// any export failed.
    fn flush(&self, batch: &mut Vec<ProfileRecord>) -> bool {
        let mut success = true;
        let mut remaining = self.queue.len();
        while remaining > 0 {
            let Some(record) = self.queue.pop() else {
                break;
            };
            batch.push(record);
            remaining -= 1;
            if batch.len() >= self.max_export_batch_size {
                success &= self.export_current_batch(batch);
            }
        }
        success & self.export_current_batch(batch)
    }

    /// Exports and clears `batch`. An empty batch counts as a success.
    fn export_current_batch(&self, batch: &mut Vec<ProfileRecord>) -> bool {
        if batch.is_empty() {
            return true;
        }

        let success = match catch_unwind(AssertUnwindSafe(|| self.exporter.export(batch))) {
            Ok(result) => {
                if result.join(self.exporter_timeout).is_success() {
                    self.metrics.record(
                        HealthMetric::Count(PROCESSED_PROFILES, batch.len() as i64),
                        &[
                            (ATTR_PROCESSOR_TYPE, BATCH_PROFILE_PROCESSOR),
                            dropped_attribute(false),
                        ],
                    );
                    true
                } else {
                    debug!(batch_size = batch.len(), "Exporter failed");
                    false
                }
            }
            Err(_) => {
                warn!(batch_size = batch.len(), "Exporter panicked");
                false
            }
        };
        batch.clear();
        self.metrics.record(
            HealthMetric::Gauge(QUEUE_SIZE, self.queue.len() as i64),
            &[(ATTR_PROCESSOR_TYPE, BATCH_PROFILE_PROCESSOR)],
        );
        success
    }

    fn force_flush(&self) -> Completion {
        let mut state = self.flush.lock();
        if state.worker_stopped {
            return if self.queue.is_empty() {
                Completion::succeeded()
            } else {
                Completion::failed()
            };
        }
        if let Some(requested) = &state.requested {
            return requested.clone();
        }
        let requested = Completion::new();
        state.requested = Some(requested.clone());
        drop(state);
        self.wake();
        requested
    }

    fn shutdown(self: &Arc<Self>) -> Completion {
        let result = Completion::new();
        let flushed = self.force_flush();
        let worker = self.clone();
        let done = result.clone();
        flushed.clone().when_complete(move |_| {
            worker.continue_work.store(false, Ordering::SeqCst);
            worker.wake();
            let shutdown = worker.exporter.shutdown();
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
}

/// Batches records and hands them to an exporter from a dedicated worker
/// thread.
///
/// Emitting never blocks: records are snapshotted and offered to a bounded
/// queue, and dropped when it is full. The worker exports whenever
/// `max_export_batch_size` records are available, or `schedule_delay` after
/// the previous export, whichever comes first. Exports never overlap and
/// keep emission order.
pub struct BatchProfileProcessor {
    worker: Arc<Worker>,
    is_shutdown: AtomicBool,
}

impl BatchProfileProcessor {
    pub fn builder(exporter: Arc<dyn ProfileExporter>) -> BatchProfileProcessorBuilder {
        BatchProfileProcessorBuilder {
            exporter,
            metrics: Arc::new(NoopMetricsRecorder),
            schedule_delay: DEFAULT_SCHEDULE_DELAY,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            max_export_batch_size: DEFAULT_MAX_EXPORT_BATCH_SIZE,
            exporter_timeout: DEFAULT_EXPORTER_TIMEOUT,
        }
    }

    pub fn max_export_batch_size(&self) -> usize {
        self.worker.max_export_batch_size
    }

    pub fn schedule_delay(&self) -> Duration {
        self.worker.schedule_delay
    }

    pub fn exporter_timeout(&self) -> Duration {
        self.worker.exporter_timeout
    }

    pub fn max_queue_size(&self) -> usize {
        self.worker.queue.capacity()
    }
}

impl ProfileProcessor for BatchProfileProcessor {
    fn on_emit(&self, _context: &Context, profile: &ReadWriteProfile) {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return;
        }
        self.worker.add_profile(profile.to_data());
    }

    /// Flushes, then shuts the exporter down and stops the worker. Only the
    /// first call does anything; later calls succeed immediately.
    fn shutdown(&self) -> Completion {
        if self
            .is_shutdown
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Completion::succeeded();
        }
        self.worker.shutdown()
    }

    /// Exports everything queued so far. Concurrent calls share one flush.
    fn force_flush(&self) -> Completion {
        self.worker.force_flush()
    }
}

impl Drop for BatchProfileProcessor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct BatchProfileProcessorBuilder {
    exporter: Arc<dyn ProfileExporter>,
    metrics: Arc<dyn MetricsRecorder>,
    schedule_delay: Duration,
    max_queue_size: usize,
    max_export_batch_size: usize,
    exporter_timeout: Duration,
}

impl BatchProfileProcessorBuilder {
    /// The longest time a record waits in the queue while fewer than
    /// `max_export_batch_size` are available.
    pub fn set_schedule_delay(&mut self, delay: Duration) -> &mut Self {
        self.schedule_delay = delay;
        self
    }

    /// Records emitted while the queue is full are dropped.
    pub fn set_max_queue_size(&mut self, size: usize) -> &mut Self {
        self.max_queue_size = size;
        self
    }

    /// Clamped to the queue size.
    pub fn set_max_export_batch_size(&mut self, size: usize) -> &mut Self {
        self.max_export_batch_size = size;
        self
    }

    /// How long the worker waits on each export.
    pub fn set_exporter_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.exporter_timeout = timeout;
        self
    }

    pub fn set_metrics_recorder(&mut self, metrics: Arc<dyn MetricsRecorder>) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// Validates the settings and starts the worker thread.
    pub fn build(&self) -> Result<BatchProfileProcessor, ConfigError> {
        if self.schedule_delay.is_zero() {
            return Err(ConfigError::NotPositive {
                name: "schedule_delay",
            });
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_queue_size",
            });
        }
        if self.max_export_batch_size == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_export_batch_size",
            });
        }
        if self.exporter_timeout.is_zero() {
            return Err(ConfigError::NotPositive {
                name: "exporter_timeout",
            });
        }

        let max_export_batch_size = self.max_export_batch_size.min(self.max_queue_size);
        let worker = Arc::new(Worker {
            exporter: self.exporter.clone(),
            metrics: self.metrics.clone(),
            schedule_delay: self.schedule_delay,
            max_export_batch_size,
            exporter_timeout: self.exporter_timeout,
            queue: ArrayQueue::new(self.max_queue_size),
            profiles_needed: AtomicUsize::new(NOT_WAITING),
            signaled: Mutex::new(false),
            signal: Condvar::new(),
            flush: Mutex::new(FlushState::default()),
            continue_work: AtomicBool::new(true),
        });

        let runner = worker.clone();
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runner.run())
            .inspect_err(|e| warn!("Failed to spawn the batch worker: {e}"))?;

        Ok(BatchProfileProcessor {
            worker,
            is_shutdown: AtomicBool::new(false),
        })
    }
}
