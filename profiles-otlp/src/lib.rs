// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Sends profile records to an OTLP collector.
//!
//! [`ProfilesRequestMarshaler`] turns a batch of records into an
//! `ExportProfilesServiceRequest` whose encoded size is known up front;
//! [`OtlpProfileExporter`] frames it for gRPC or HTTP and hands the bytes to
//! a [`Transport`].

mod exporter;
mod marshal;

pub use exporter::{
    OtlpProfileExporter, OtlpProfileExporterBuilder, Protocol, Request, Transport,
    GRPC_EXPORT_PATH, HTTP_EXPORT_PATH,
};
pub use marshal::ProfilesRequestMarshaler;
