// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hooks invoked for every emitted record.

mod batch;
mod multi;
mod noop;
mod simple;

pub use batch::{BatchProfileProcessor, BatchProfileProcessorBuilder};
pub use multi::MultiProfileProcessor;
pub use noop::NoopProfileProcessor;
pub use simple::SimpleProfileProcessor;

use crate::common::Context;
use crate::{Completion, ReadWriteProfile};
use std::sync::Arc;
use std::time::Duration;

/// Receives records as they are emitted. `on_emit` is called on the
/// emitting thread and must not block.
pub trait ProfileProcessor: Send + Sync {
    fn on_emit(&self, context: &Context, profile: &ReadWriteProfile);

    fn shutdown(&self) -> Completion {
        self.force_flush()
    }

    fn force_flush(&self) -> Completion {
        Completion::succeeded()
    }

    /// Shuts down and waits up to 10 seconds for it to finish.
    fn close(&self) {
        self.shutdown().join(Duration::from_secs(10));
    }

    /// True for processors which discard everything, letting the provider
    /// skip building records at all.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Combines processors into one which fans out to all of them in order.
pub fn composite(processors: Vec<Arc<dyn ProfileProcessor>>) -> Arc<dyn ProfileProcessor> {
    let mut processors = processors;
    match processors.len() {
        0 => NoopProfileProcessor::shared(),
        1 => processors.remove(0),
        _ => Arc::new(MultiProfileProcessor::new(processors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProfileRecord;
    use crate::export::InMemoryProfileExporter;
    use crate::ProfileLimits;

    #[test]
    fn zero_processors_is_the_noop_singleton() {
        let processor = composite(Vec::new());
        assert!(processor.is_noop());
        assert!(Arc::ptr_eq(&processor, &NoopProfileProcessor::shared()));

        let profile =
            ReadWriteProfile::from_record(&ProfileRecord::default(), ProfileLimits::default());
        processor.on_emit(&Context::new(), &profile);
        assert!(processor.force_flush().is_success());
        assert!(processor.shutdown().is_success());
        assert!(processor.force_flush().is_success());
    }

    #[test]
    fn one_processor_is_returned_as_is() {
        let simple: Arc<dyn ProfileProcessor> = Arc::new(SimpleProfileProcessor::new(Arc::new(
            InMemoryProfileExporter::new(),
        )));
        let processor = composite(vec![simple.clone()]);
        assert!(Arc::ptr_eq(&processor, &simple));
        assert!(!processor.is_noop());
    }
}
