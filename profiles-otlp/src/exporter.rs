// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::marshal::ProfilesRequestMarshaler;
use anyhow::Context as _;
use bytes::Bytes;
use profiles_sdk::data::ProfileRecord;
use profiles_sdk::export::ProfileExporter;
use profiles_sdk::Completion;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub const GRPC_EXPORT_PATH: &str =
    "/opentelemetry.proto.collector.profile.v1.ProfileService/Export";
pub const HTTP_EXPORT_PATH: &str = "/v1/profiles";

const GRPC_CONTENT_TYPE: &str = "application/grpc";
const HTTP_CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Protocol {
    /// Unary gRPC call; the body is a length-prefixed message frame.
    #[default]
    Grpc,
    /// HTTP POST of the bare protobuf message.
    HttpProtobuf,
}

impl Protocol {
    pub fn path(self) -> &'static str {
        match self {
            Protocol::Grpc => GRPC_EXPORT_PATH,
            Protocol::HttpProtobuf => HTTP_EXPORT_PATH,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Protocol::Grpc => GRPC_CONTENT_TYPE,
            Protocol::HttpProtobuf => HTTP_CONTENT_TYPE,
        }
    }
}

/// An encoded request, ready to be sent.
#[derive(Clone, Debug)]
pub struct Request {
    pub path: &'static str,
    pub content_type: &'static str,
    pub body: Bytes,
}

/// Delivers requests to a collector. Implementations own the connection,
/// retries and the status handling of their protocol.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> anyhow::Result<()>;

    fn shutdown(&self) {}
}

/// Exports batches of records as OTLP `ExportProfilesServiceRequest`s.
pub struct OtlpProfileExporter {
    protocol: Protocol,
    transport: Arc<dyn Transport>,
    is_shutdown: AtomicBool,
}

impl OtlpProfileExporter {
    pub fn builder(transport: Arc<dyn Transport>) -> OtlpProfileExporterBuilder {
        OtlpProfileExporterBuilder {
            protocol: Protocol::default(),
            transport,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn encode(&self, profiles: &[ProfileRecord]) -> anyhow::Result<Bytes> {
        let marshaler = ProfilesRequestMarshaler::create(profiles);
        let body = match self.protocol {
            Protocol::Grpc => {
                let len = u32::try_from(marshaler.len())
                    .context("request does not fit in a gRPC frame")?;
                let mut frame = Vec::with_capacity(5 + len as usize);
                // Uncompressed.
                frame.push(0);
                frame.extend_from_slice(&len.to_be_bytes());
                marshaler.write_to(&mut frame)?;
                frame
            }
            Protocol::HttpProtobuf => marshaler.to_vec()?,
        };
        Ok(Bytes::from(body))
    }
}

impl std::fmt::Debug for OtlpProfileExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtlpProfileExporter")
            .field("protocol", &self.protocol)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

impl ProfileExporter for OtlpProfileExporter {
    fn export(&self, profiles: &[ProfileRecord]) -> Completion {
        if self.is_shutdown.load(Ordering::SeqCst) {
            debug!("Export called after shutdown");
            return Completion::failed();
        }
        let result = self.encode(profiles).and_then(|body| {
            self.transport.send(Request {
                path: self.protocol.path(),
                content_type: self.protocol.content_type(),
                body,
            })
        });
        match result {
            Ok(()) => Completion::succeeded(),
            Err(err) => {
                debug!(?err, profiles = profiles.len(), "Failed to export profiles");
                Completion::failed()
            }
        }
    }

    /// Requests are sent synchronously, so there is never anything to flush.
    fn flush(&self) -> Completion {
        Completion::succeeded()
    }

    fn shutdown(&self) -> Completion {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            debug!("Calling shutdown() multiple times.");
        } else {
            self.transport.shutdown();
        }
        Completion::succeeded()
    }
}

pub struct OtlpProfileExporterBuilder {
    protocol: Protocol,
    transport: Arc<dyn Transport>,
}

impl OtlpProfileExporterBuilder {
    pub fn set_protocol(&mut self, protocol: Protocol) -> &mut Self {
        self.protocol = protocol;
        self
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = transport;
        self
    }

    pub fn build(&self) -> OtlpProfileExporter {
        OtlpProfileExporter {
            protocol: self.protocol,
            transport: self.transport.clone(),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use profiles_protobuf::prost_impls::ExportProfilesServiceRequest;
    use prost::Message as _;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<Request>>,
        fail: AtomicBool,
        shutdowns: AtomicUsize,
    }

    impl Transport for Recording {
        fn send(&self, request: Request) -> anyhow::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            self.requests.lock().push(request);
            Ok(())
        }

        fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn records() -> Vec<ProfileRecord> {
        (1..=3u8)
            .map(|i| ProfileRecord {
                profile_id: vec![i; 16],
                ..ProfileRecord::default()
            })
            .collect()
    }

    #[test]
    fn grpc_frame() {
        let transport = Arc::new(Recording::default());
        let exporter = OtlpProfileExporter::builder(transport.clone()).build();
        assert_eq!(exporter.protocol(), Protocol::Grpc);
        assert!(exporter.export(&records()).is_success());

        let requests = transport.requests.lock();
        let request = &requests[0];
        assert_eq!(request.path, GRPC_EXPORT_PATH);
        assert_eq!(request.content_type, "application/grpc");
        assert_eq!(request.body[0], 0);
        let len = u32::from_be_bytes([
            request.body[1],
            request.body[2],
            request.body[3],
            request.body[4],
        ]);
        assert_eq!(len as usize, request.body.len() - 5);
        let decoded = ExportProfilesServiceRequest::decode(&request.body[5..]).unwrap();
        assert_eq!(decoded.resource_profiles[0].scope_profiles[0].profiles.len(), 3);
    }

    #[test]
    fn http_body_is_the_bare_message() {
        let transport = Arc::new(Recording::default());
        let exporter = OtlpProfileExporter::builder(transport.clone())
            .set_protocol(Protocol::HttpProtobuf)
            .build();
        assert!(exporter.export(&records()).is_success());

        let requests = transport.requests.lock();
        assert_eq!(requests[0].path, "/v1/profiles");
        assert_eq!(requests[0].content_type, "application/x-protobuf");
        let decoded = ExportProfilesServiceRequest::decode(requests[0].body.clone()).unwrap();
        assert_eq!(decoded.resource_profiles.len(), 1);
    }

    #[test]
    fn transport_errors_fail_the_export() {
        let transport = Arc::new(Recording::default());
        transport.fail.store(true, Ordering::SeqCst);
        let exporter = OtlpProfileExporter::builder(transport.clone()).build();
        let completion = exporter.export(&records());
        assert!(completion.is_done());
        assert!(!completion.is_success());
    }

    #[test]
    fn shutdown_once() {
        let transport = Arc::new(Recording::default());
        let exporter = OtlpProfileExporter::builder(transport.clone()).build();
        assert!(exporter.shutdown().is_success());
        assert!(exporter.shutdown().is_success());
        assert_eq!(transport.shutdowns.load(Ordering::SeqCst), 1);

        assert!(!exporter.export(&records()).is_success());
        assert!(transport.requests.lock().is_empty());
        assert!(exporter.flush().is_success());
    }
}
