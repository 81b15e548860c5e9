// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::{AttributeValue, Attributes};

pub const SERVICE_NAME: &str = "service.name";
pub const TELEMETRY_SDK_NAME: &str = "telemetry.sdk.name";
pub const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";
pub const TELEMETRY_SDK_VERSION: &str = "telemetry.sdk.version";

/// The entity producing telemetry, described by its attributes.
///
/// Resources compare structurally, which is how records from different
/// allocations of the same resource end up in the same group on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    attributes: Attributes,
    schema_url: Option<String>,
}

impl Resource {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            schema_url: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Attributes::new())
    }

    pub fn with_schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns a resource with the attributes of both; `other` wins on
    /// conflicting keys, and on the schema url when it has one.
    pub fn merge(&self, other: &Resource) -> Resource {
        let mut attributes = self.attributes.clone();
        attributes.extend(&other.attributes);
        Resource {
            attributes,
            schema_url: other.schema_url.clone().or_else(|| self.schema_url.clone()),
        }
    }
}

/// The SDK's own description: an `unknown_service` service name plus the
/// `telemetry.sdk.*` attributes.
impl Default for Resource {
    fn default() -> Self {
        Resource::new(
            Attributes::new()
                .with(SERVICE_NAME, "unknown_service")
                .with(TELEMETRY_SDK_NAME, env!("CARGO_PKG_NAME"))
                .with(TELEMETRY_SDK_LANGUAGE, "rust")
                .with(TELEMETRY_SDK_VERSION, env!("CARGO_PKG_VERSION")),
        )
    }
}
