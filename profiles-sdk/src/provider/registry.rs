// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::common::InstrumentationScope;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Key = (String, Option<String>, Option<String>);

/// Caches one component per (name, version, schema url). Scope attributes
/// are not part of the identity; the first ones win.
pub(crate) struct ComponentRegistry<V> {
    components: Mutex<HashMap<Key, Arc<V>>>,
    factory: Box<dyn Fn(InstrumentationScope) -> V + Send + Sync>,
}

impl<V> ComponentRegistry<V> {
    pub(crate) fn new<F>(factory: F) -> Self
    where
        F: Fn(InstrumentationScope) -> V + Send + Sync + 'static,
    {
        Self {
            components: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    pub(crate) fn get(&self, scope: InstrumentationScope) -> Arc<V> {
        let key = (
            scope.name().to_owned(),
            scope.version().map(str::to_owned),
            scope.schema_url().map(str::to_owned),
        );
        self.components
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::new((self.factory)(scope)))
            .clone()
    }
}
