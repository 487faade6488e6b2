// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The cache backend seam.
//!
//! The session layer treats the backend as an opaque, namespaced `id -> blob` store. Storage
//! format and expiry belong to the backend.

pub mod memory;

use serde::Serialize;
use serde_json::Value;

use crate::model::VisitorId;

pub use memory::MemoryCache;

/// One stored mapping: `value` is a JSON object, or `null` when the visitor never wrote anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheRecord {
    pub value: Value,
    pub filename: VisitorId,
}

/// Blocking, namespaced key/blob storage.
pub trait CacheBackend: Send + Sync {
    fn get(&self, namespace: &str, id: &VisitorId) -> Result<Option<Value>, CacheError>;

    /// Writes (or overwrites) the record stored under `record.filename`.
    fn add(&self, namespace: &str, record: CacheRecord) -> Result<(), CacheError>;

    fn invalidate(&self, namespace: &str, id: &VisitorId) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache namespace {namespace:?} is not configured")]
    ConfigurationMissing { namespace: String },
    #[error("invalid payload for {namespace:?}/{id}: {reason}")]
    InvalidPayload {
        namespace: String,
        id: VisitorId,
        reason: String,
    },
    #[error("cache namespace {namespace:?} is unavailable: lock poisoned")]
    Poisoned { namespace: String },
}
