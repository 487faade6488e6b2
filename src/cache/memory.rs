// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{CacheBackend, CacheError, CacheRecord};
use crate::model::content::value_kind;
use crate::model::VisitorId;

/// In-process backend. Namespaces must be registered before use, like a configured cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    namespaces: Mutex<HashMap<String, HashMap<VisitorId, Value>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
        self.register(namespace);
        self
    }

    pub fn register(&self, namespace: impl Into<String>) {
        let mut namespaces = self
            .namespaces
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        namespaces.entry(namespace.into()).or_default();
    }

    /// Number of records currently stored in `namespace`.
    pub fn record_count(&self, namespace: &str) -> Result<usize, CacheError> {
        let namespaces = self.lock(namespace)?;
        namespaces
            .get(namespace)
            .map(HashMap::len)
            .ok_or_else(|| missing(namespace))
    }

    fn lock(
        &self,
        namespace: &str,
    ) -> Result<MutexGuard<'_, HashMap<String, HashMap<VisitorId, Value>>>, CacheError> {
        self.namespaces.lock().map_err(|_| CacheError::Poisoned {
            namespace: namespace.to_owned(),
        })
    }
}

fn missing(namespace: &str) -> CacheError {
    CacheError::ConfigurationMissing {
        namespace: namespace.to_owned(),
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, namespace: &str, id: &VisitorId) -> Result<Option<Value>, CacheError> {
        let namespaces = self.lock(namespace)?;
        let entries = namespaces.get(namespace).ok_or_else(|| missing(namespace))?;
        Ok(entries.get(id).cloned())
    }

    fn add(&self, namespace: &str, record: CacheRecord) -> Result<(), CacheError> {
        if !(record.value.is_object() || record.value.is_null()) {
            return Err(CacheError::InvalidPayload {
                namespace: namespace.to_owned(),
                id: record.filename,
                reason: format!("expected object or null, got {}", value_kind(&record.value)),
            });
        }

        let mut namespaces = self.lock(namespace)?;
        let entries = namespaces
            .get_mut(namespace)
            .ok_or_else(|| missing(namespace))?;
        entries.insert(record.filename, record.value);
        Ok(())
    }

    fn invalidate(&self, namespace: &str, id: &VisitorId) -> Result<(), CacheError> {
        let mut namespaces = self.lock(namespace)?;
        let entries = namespaces
            .get_mut(namespace)
            .ok_or_else(|| missing(namespace))?;
        entries.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::MemoryCache;
    use crate::cache::{CacheBackend, CacheError, CacheRecord};
    use crate::model::VisitorId;

    fn id(raw: &str) -> VisitorId {
        VisitorId::new(raw).unwrap()
    }

    #[test]
    fn unregistered_namespace_is_a_configuration_error() {
        let cache = MemoryCache::new();
        let err = cache.get("light_persist", &id("x")).unwrap_err();
        assert_eq!(
            err,
            CacheError::ConfigurationMissing {
                namespace: "light_persist".to_owned()
            }
        );
    }

    #[test]
    fn add_get_invalidate() {
        let cache = MemoryCache::new().with_namespace("ns");
        assert_eq!(cache.get("ns", &id("x")).unwrap(), None);

        cache
            .add(
                "ns",
                CacheRecord {
                    value: json!({"a": 1}),
                    filename: id("x"),
                },
            )
            .unwrap();
        assert_eq!(cache.get("ns", &id("x")).unwrap(), Some(json!({"a": 1})));
        assert_eq!(cache.record_count("ns").unwrap(), 1);

        cache.invalidate("ns", &id("x")).unwrap();
        assert_eq!(cache.get("ns", &id("x")).unwrap(), None);
        cache.invalidate("ns", &id("x")).unwrap();
    }

    #[test]
    fn rejects_non_mapping_payloads() {
        let cache = MemoryCache::new().with_namespace("ns");
        let err = cache
            .add(
                "ns",
                CacheRecord {
                    value: json!("scalar"),
                    filename: id("x"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidPayload { .. }), "got: {err:?}");

        cache
            .add(
                "ns",
                CacheRecord {
                    value: json!(null),
                    filename: id("x"),
                },
            )
            .unwrap();
        assert_eq!(cache.get("ns", &id("x")).unwrap(), Some(json!(null)));
    }
}
