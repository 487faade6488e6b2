// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use serde_json::Value;

use super::scope::ScopedSession;
use crate::cache::{CacheBackend, CacheError, CacheRecord};
use crate::config::{PersistConfig, PurgeMode};
use crate::identity::{self, CookieTransport};
use crate::model::{Content, VisitorId};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot open visitor session: no {collaborator} was provided")]
    Bootstrap { collaborator: &'static str },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("stored content for {namespace:?}/{visitor_id} is a {found}, expected a mapping")]
    InvalidPayload {
        namespace: String,
        visitor_id: VisitorId,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded { visitor_id: VisitorId, is_new: bool },
}

/// The per-visitor key/value mapping for one request.
///
/// Only reachable through a [`ScopedSession`], which owns the write-back.
pub struct SessionStore<C> {
    config: Arc<PersistConfig>,
    cookies: C,
    cache: Arc<dyn CacheBackend>,
    state: LoadState,
    content: Content,
    flush_suppressed: bool,
}

impl<C> std::fmt::Debug for SessionStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("namespace", &self.config.namespace)
            .field("state", &self.state)
            .field("content", &self.content)
            .field("flush_suppressed", &self.flush_suppressed)
            .finish_non_exhaustive()
    }
}

/// Wires the collaborators a session needs, then opens it.
pub struct SessionStoreBuilder<C> {
    config: Arc<PersistConfig>,
    cookies: Option<C>,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl<C: CookieTransport> SessionStoreBuilder<C> {
    pub fn new(config: Arc<PersistConfig>) -> Self {
        Self {
            config,
            cookies: None,
            cache: None,
        }
    }

    pub fn cookies(mut self, cookies: C) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves the visitor identity and, for a returning visitor, loads the stored mapping.
    ///
    /// Any failure aborts the open; there is no memory-only fallback session.
    pub fn open(self) -> Result<ScopedSession<C>, SessionError> {
        let cookies = self.cookies.ok_or(SessionError::Bootstrap {
            collaborator: "cookie transport",
        })?;
        let cache = self.cache.ok_or(SessionError::Bootstrap {
            collaborator: "cache backend",
        })?;

        let mut store = SessionStore {
            config: self.config,
            cookies,
            cache,
            state: LoadState::NotLoaded,
            content: Content::unset(),
            flush_suppressed: false,
        };
        store.ensure_loaded()?;
        Ok(ScopedSession::new(store))
    }
}

impl<C: CookieTransport> SessionStore<C> {
    pub fn builder(config: Arc<PersistConfig>) -> SessionStoreBuilder<C> {
        SessionStoreBuilder::new(config)
    }

    pub fn visitor_id(&self) -> Option<&VisitorId> {
        match &self.state {
            LoadState::Loaded { visitor_id, .. } => Some(visitor_id),
            LoadState::NotLoaded => None,
        }
    }

    /// True when the identity was minted for this request.
    pub fn is_new_visitor(&self) -> bool {
        matches!(self.state, LoadState::Loaded { is_new: true, .. })
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn has(&self, key: &str) -> bool {
        self.content.has(key)
    }

    /// Copy of the value at `key`; `"*"` reads the whole mapping.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.content.get(key)
    }

    /// Mutable view into the stored value at `key`, for editing nested structures in place.
    ///
    /// Returns `None` (and creates nothing) when the key is absent. The view borrows the
    /// store, so it cannot outlive the next store call or the end of the scope.
    pub fn get_reference(&mut self, key: &str) -> Option<&mut Value> {
        self.content.get_mut(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value, reset: bool) {
        let key = key.into();
        tracing::trace!(key = %key, reset, "set visitor value");
        self.content.set(key, value, reset);
    }

    pub fn delete(&mut self, key: &str) -> Result<(), SessionError> {
        self.ensure_loaded()?;
        if self.content.delete(key) {
            tracing::trace!(key, "deleted visitor value");
        }
        Ok(())
    }

    /// Removes the identity cookie and invalidates the cached record right away.
    ///
    /// With [`PurgeMode::RetainContent`] the in-memory mapping survives and is written back at
    /// scope end under the purged identifier.
    pub fn purge(&mut self) -> Result<(), SessionError> {
        let visitor_id = self.ensure_loaded()?.clone();
        let cookie = &self.config.cookie;
        self.cookies.remove_cookie(&cookie.name, &cookie.path);
        self.cache.invalidate(&self.config.namespace, &visitor_id)?;

        if self.config.purge == PurgeMode::DiscardContent {
            self.content.clear();
            self.flush_suppressed = true;
        }
        tracing::debug!(
            namespace = %self.config.namespace,
            %visitor_id,
            mode = ?self.config.purge,
            "purged visitor session"
        );
        Ok(())
    }

    /// Writes the current mapping under the resolved identifier. Called once, by the scope.
    pub(crate) fn flush(&mut self) -> Result<(), SessionError> {
        let visitor_id = self.ensure_loaded()?.clone();
        if self.flush_suppressed {
            tracing::debug!(%visitor_id, "skipping flush of purged visitor session");
            return Ok(());
        }

        let record = CacheRecord {
            value: self.content.to_payload(),
            filename: visitor_id,
        };
        tracing::debug!(
            namespace = %self.config.namespace,
            visitor_id = %record.filename,
            entries = self.content.len(),
            "flushing visitor session"
        );
        self.cache.add(&self.config.namespace, record)?;
        Ok(())
    }

    pub(crate) fn into_cookies(self) -> C {
        self.cookies
    }

    /// Resolves identity and loads content at most once; later calls return the same id.
    fn ensure_loaded(&mut self) -> Result<&VisitorId, SessionError> {
        if let LoadState::NotLoaded = self.state {
            let resolved = identity::resolve(&self.config.cookie, &mut self.cookies);
            if !resolved.is_new {
                self.content = self.load(&resolved.visitor_id)?;
            }
            self.state = LoadState::Loaded {
                visitor_id: resolved.visitor_id,
                is_new: resolved.is_new,
            };
        }

        match &self.state {
            LoadState::Loaded { visitor_id, .. } => Ok(visitor_id),
            LoadState::NotLoaded => unreachable!("state is loaded above"),
        }
    }

    fn load(&self, visitor_id: &VisitorId) -> Result<Content, SessionError> {
        let namespace = &self.config.namespace;
        let payload = self.cache.get(namespace, visitor_id)?;
        let content =
            Content::from_payload(payload).map_err(|unexpected| SessionError::InvalidPayload {
                namespace: namespace.clone(),
                visitor_id: visitor_id.clone(),
                found: unexpected.found,
            })?;
        tracing::debug!(
            namespace = %namespace,
            %visitor_id,
            entries = content.len(),
            "loaded visitor session"
        );
        Ok(content)
    }
}
