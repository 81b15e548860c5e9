// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::data::ProfileRecord;
use crate::export::ProfileExporter;
use crate::Completion;
use indexmap::IndexMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

type Consumer = Box<dyn Fn(String) + Send + Sync>;

/// Writes a one-line summary of each record to a consumer; by default, to
/// the `tracing` log at info level.
///
/// In fold mode, identical lines within one export are written once,
/// followed by a space and their number of occurrences.
pub struct StringWritingProfileExporter {
    consumer: Consumer,
    fold: bool,
    is_shutdown: AtomicBool,
}

impl StringWritingProfileExporter {
    pub fn builder() -> StringWritingProfileExporterBuilder {
        StringWritingProfileExporterBuilder::default()
    }

    fn format(profile: &ProfileRecord) -> String {
        let mut line = String::with_capacity(60);
        let span_context = profile.span_context;
        let _ = write!(
            line,
            "Profile from StringWritingProfileExporter: {} {} [scopeInfo: {}:{}] {}",
            span_context.trace_id(),
            span_context.span_id(),
            profile.scope.name(),
            profile.scope.version().unwrap_or_default(),
            profile.attributes,
        );
        line
    }
}

impl ProfileExporter for StringWritingProfileExporter {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Completion::failed();
        }
        if self.fold {
            let mut counts: IndexMap<String, u64> = IndexMap::new();
            for profile in profiles {
                *counts.entry(Self::format(profile)).or_default() += 1;
            }
            for (line, count) in counts {
                (self.consumer)(format!("{line} {count}"));
            }
        } else {
            for profile in profiles {
                (self.consumer)(Self::format(profile));
            }
        }
        Completion::succeeded()
    }

    fn flush(&self) -> Completion {
        Completion::succeeded()
    }

    fn shutdown(&self) -> Completion {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            info!("Calling shutdown() multiple times.");
        }
        Completion::succeeded()
    }
}

#[derive(Default)]
pub struct StringWritingProfileExporterBuilder {
    consumer: Option<Consumer>,
    fold: bool,
}

impl StringWritingProfileExporterBuilder {
    pub fn set_consumer<F>(&mut self, consumer: F) -> &mut Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.consumer = Some(Box::new(consumer));
        self
    }

    pub fn set_fold(&mut self, fold: bool) -> &mut Self {
        self.fold = fold;
        self
    }

    pub fn build(&mut self) -> StringWritingProfileExporter {
        let consumer: Consumer = match self.consumer.take() {
            Some(consumer) => consumer,
            None => Box::new(|line: String| info!("{line}")),
        };
        StringWritingProfileExporter {
            consumer,
            fold: self.fold,
            is_shutdown: AtomicBool::new(false),
        }
    }
}
