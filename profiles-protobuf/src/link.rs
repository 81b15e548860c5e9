// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{Field, Message, Sink, OPT_ZERO};

/// A pointer from a profile Sample to a trace Span.
///
/// An all-zero trace or span id is the "invalid" sentinel and is treated as
/// absent: [`Link::new`] replaces it with an empty slice so that neither pass
/// emits it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Link<'a> {
    /// A unique identifier of a trace, 16 bytes.
    pub trace_id: Field<&'a [u8], 1, OPT_ZERO>,
    /// A unique identifier for the linked span, 8 bytes.
    pub span_id: Field<&'a [u8], 2, OPT_ZERO>,
}

impl<'a> Link<'a> {
    pub fn new(trace_id: &'a [u8], span_id: &'a [u8]) -> Self {
        Self {
            trace_id: non_zero(trace_id).into(),
            span_id: non_zero(span_id).into(),
        }
    }
}

fn non_zero(id: &[u8]) -> &[u8] {
    if id.iter().all(|byte| *byte == 0) {
        &[]
    } else {
        id
    }
}

impl Message for Link<'_> {
    fn visit<S: Sink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.field(&self.trace_id)?;
        sink.field(&self.span_id)
    }
}

#[cfg(any(test, feature = "prost_impls"))]
impl From<&Link<'_>> for crate::prost_impls::Link {
    fn from(link: &Link<'_>) -> Self {
        Self {
            trace_id: link.trace_id.value.to_vec(),
            span_id: link.span_id.value.to_vec(),
        }
    }
}
