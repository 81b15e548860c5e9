// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use parking_lot::Mutex;
use profiles_sdk::common::Context;
use profiles_sdk::data::ProfileRecord;
use profiles_sdk::export::{InMemoryProfileExporter, ProfileExporter};
use profiles_sdk::health_metrics::{HealthMetric, MetricsRecorder, PROCESSED_PROFILES};
use profiles_sdk::processor::{BatchProfileProcessor, ProfileProcessor};
use profiles_sdk::{Completion, ProfileLimits, ReadWriteProfile};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn profile() -> ReadWriteProfile {
    ReadWriteProfile::from_record(&ProfileRecord::default(), ProfileLimits::default())
}

fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[derive(Debug, Default)]
struct RecordingMetrics {
    metrics: Mutex<Vec<(HealthMetric, Vec<(&'static str, &'static str)>)>>,
}

impl RecordingMetrics {
    fn count(&self, name: &str, dropped: &str) -> i64 {
        self.metrics
            .lock()
            .iter()
            .filter_map(|(metric, attributes)| match metric {
                HealthMetric::Count(n, value)
                    if *n == name && attributes.contains(&("dropped", dropped)) =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .sum()
    }
}

impl MetricsRecorder for RecordingMetrics {
    fn record(&self, metric: HealthMetric, attributes: &[(&'static str, &'static str)]) {
        self.metrics.lock().push((metric, attributes.to_vec()));
    }
}

/// Blocks inside the first export until released.
struct Stalled {
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
    exported: AtomicUsize,
}

impl ProfileExporter for Stalled {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion {
        if let Some(entered) = self.entered.lock().take() {
            let _ = entered.send(());
            let _ = self.release.lock().recv();
        }
        self.exported.fetch_add(profiles.len(), Ordering::SeqCst);
        Completion::succeeded()
    }

    fn flush(&self) -> Completion {
        Completion::succeeded()
    }

    fn shutdown(&self) -> Completion {
        Completion::succeeded()
    }
}

#[test]
fn exports_as_soon_as_a_batch_is_full() {
    let exporter = Arc::new(InMemoryProfileExporter::new());
    let processor = BatchProfileProcessor::builder(exporter.clone())
        .set_schedule_delay(Duration::from_secs(10))
        .set_max_export_batch_size(5)
        .build()
        .unwrap();

    for _ in 0..5 {
        processor.on_emit(&Context::new(), &profile());
    }
    assert!(wait_for(Duration::from_secs(5), || {
        exporter.finished_profiles().len() == 5
    }));
}

#[test]
fn exports_after_the_schedule_delay() {
    let exporter = Arc::new(InMemoryProfileExporter::new());
    let processor = BatchProfileProcessor::builder(exporter.clone())
        .set_schedule_delay(Duration::from_millis(50))
        .set_max_export_batch_size(100)
        .build()
        .unwrap();

    let start = Instant::now();
    processor.on_emit(&Context::new(), &profile());
    assert!(wait_for(Duration::from_secs(5), || {
        exporter.finished_profiles().len() == 1
    }));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn drops_when_the_queue_is_full() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let exporter = Arc::new(Stalled {
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
        exported: AtomicUsize::new(0),
    });
    let metrics = Arc::new(RecordingMetrics::default());
    let processor = BatchProfileProcessor::builder(exporter.clone())
        .set_schedule_delay(Duration::from_secs(60))
        .set_max_queue_size(2)
        .set_max_export_batch_size(1)
        .set_metrics_recorder(metrics.clone())
        .build()
        .unwrap();

    // The first record stalls the worker inside the exporter.
    processor.on_emit(&Context::new(), &profile());
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    for _ in 0..5 {
        processor.on_emit(&Context::new(), &profile());
    }
    assert_eq!(metrics.count(PROCESSED_PROFILES, "true"), 3);

    release_tx.send(()).unwrap();
    assert!(processor
        .force_flush()
        .join(Duration::from_secs(5))
        .is_success());
    assert_eq!(exporter.exported.load(Ordering::SeqCst), 3);
    assert_eq!(metrics.count(PROCESSED_PROFILES, "false"), 3);
}

#[test]
fn a_flush_requested_during_a_flush_is_not_lost() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let exporter = Arc::new(Stalled {
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
        exported: AtomicUsize::new(0),
    });
    let processor = BatchProfileProcessor::builder(exporter.clone())
        .set_schedule_delay(Duration::from_secs(60))
        .build()
        .unwrap();

    processor.on_emit(&Context::new(), &profile());
    let first = processor.force_flush();
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // Queued after the first flush counted what it would drain.
    processor.on_emit(&Context::new(), &profile());
    let second = processor.force_flush();

    release_tx.send(()).unwrap();
    assert!(first.join(Duration::from_secs(5)).is_success());
    assert!(second.join(Duration::from_secs(5)).is_success());
    assert_eq!(exporter.exported.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_shutdowns_shut_the_exporter_down_once() {
    #[derive(Default)]
    struct CountingShutdown(AtomicUsize);

    impl ProfileExporter for CountingShutdown {
        fn export(&self, _profiles: &[ProfileRecord]) -> Completion {
            Completion::succeeded()
        }

        fn flush(&self) -> Completion {
            Completion::succeeded()
        }

        fn shutdown(&self) -> Completion {
            self.0.fetch_add(1, Ordering::SeqCst);
            Completion::succeeded()
        }
    }

    let exporter = Arc::new(CountingShutdown::default());
    let processor = Arc::new(
        BatchProfileProcessor::builder(exporter.clone())
            .build()
            .unwrap(),
    );
    processor.on_emit(&Context::new(), &profile());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let processor = processor.clone();
            thread::spawn(move || {
                processor
                    .shutdown()
                    .join(Duration::from_secs(10))
                    .is_success()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert!(wait_for(Duration::from_secs(5), || {
        exporter.0.load(Ordering::SeqCst) == 1
    }));
    drop(processor);
    assert_eq!(exporter.0.load(Ordering::SeqCst), 1);
}

#[test]
fn a_panicking_exporter_does_not_stop_the_worker() {
    struct PanicsOnce(AtomicUsize, InMemoryProfileExporter);

    impl ProfileExporter for PanicsOnce {
        fn export(&self, profiles: &[ProfileRecord]) -> Completion {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first export");
            }
            self.1.export(profiles)
        }

        fn flush(&self) -> Completion {
            Completion::succeeded()
        }

        fn shutdown(&self) -> Completion {
            Completion::succeeded()
        }
    }

    let exporter = Arc::new(PanicsOnce(AtomicUsize::new(0), InMemoryProfileExporter::new()));
    let processor = BatchProfileProcessor::builder(exporter.clone())
        .set_schedule_delay(Duration::from_secs(60))
        .build()
        .unwrap();

    processor.on_emit(&Context::new(), &profile());
    let first = processor.force_flush();
    assert!(first.join(Duration::from_secs(5)).is_done());
    assert!(!first.is_success());

    processor.on_emit(&Context::new(), &profile());
    assert!(processor
        .force_flush()
        .join(Duration::from_secs(5))
        .is_success());
    assert_eq!(exporter.1.finished_profiles().len(), 1);
}
