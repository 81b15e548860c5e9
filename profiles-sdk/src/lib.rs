// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! The in-process half of a profiles pipeline.
//!
//! Instrumented code obtains a [`api::Profiler`] from a
//! [`provider::SdkProfilerProvider`] and emits records through a
//! [`api::ProfileBuilder`]. Each emitted record is handed to the provider's
//! [`processor::ProfileProcessor`] as a [`ReadWriteProfile`]; processors take
//! an immutable [`data::ProfileRecord`] snapshot and eventually hand batches
//! of them to a [`export::ProfileExporter`].
//!
//! The [`processor::BatchProfileProcessor`] is the one to use in production.
//! It never blocks the emitting thread: records go into a bounded queue which
//! is drained by a single worker thread.

pub mod api;
mod attributes_map;
pub mod common;
mod completion;
pub mod data;
mod error;
pub mod export;
pub mod global;
pub mod health_metrics;
mod limits;
pub mod processor;
pub mod provider;
mod read_write;
pub mod testing;

pub use attributes_map::AttributesMap;
pub use completion::Completion;
pub use error::{ConfigError, IndexError};
pub use limits::{ProfileLimits, ProfileLimitsBuilder, DEFAULT_MAX_NUMBER_OF_ATTRIBUTES};
pub use read_write::ReadWriteProfile;
