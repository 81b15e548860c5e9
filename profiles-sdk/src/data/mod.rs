// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Immutable snapshots handed from processors to exporters.

mod profile;
mod record;

pub use profile::*;
pub use record::*;
