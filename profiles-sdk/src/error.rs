// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Rejected configuration. Returned synchronously by the builders.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
    #[error("failed to spawn the worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A reference from one payload entity into a table which does not resolve.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum IndexError {
    #[error("{entity}[{position}].{field} = {index} is out of range for {table} of length {len}")]
    OutOfRange {
        entity: &'static str,
        position: usize,
        field: &'static str,
        index: i64,
        table: &'static str,
        len: usize,
    },
}
