// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Identity and correlation types shared by every signal: attributes,
//! resources, instrumentation scopes, span contexts, and clocks.

mod attributes;
mod clock;
mod resource;
mod scope;
mod span_context;

pub use attributes::*;
pub use clock::*;
pub use resource::*;
pub use scope::*;
pub use span_context::*;
