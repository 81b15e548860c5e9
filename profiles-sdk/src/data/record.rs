// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::{Attributes, InstrumentationScope, Resource, SpanContext};
use crate::data::ProfileData;
use bytes::Bytes;
use std::sync::Arc;

/// One emitted profile with everything needed to export it.
///
/// Records are snapshots: they are created once from a
/// [`crate::ReadWriteProfile`] and never change afterwards. The resource,
/// scope and payload are shared with other records through `Arc`s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileRecord {
    pub resource: Arc<Resource>,
    pub scope: Arc<InstrumentationScope>,
    pub profile_id: Vec<u8>,
    /// Nanoseconds since the Unix epoch.
    pub timestamp_epoch_nanos: u64,
    pub observed_timestamp_epoch_nanos: u64,
    /// [`SpanContext::INVALID`] when the record is not correlated with a span.
    pub span_context: SpanContext,
    pub attributes: Attributes,
    /// Every attribute set on the record, including the ones dropped because
    /// of limits.
    pub total_attribute_count: usize,
    pub original_payload_format: String,
    pub original_payload: Bytes,
    pub profile: Arc<ProfileData>,
}

impl ProfileRecord {
    pub fn dropped_attributes_count(&self) -> usize {
        self.total_attribute_count.saturating_sub(self.attributes.len())
    }
}
