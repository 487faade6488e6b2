// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::ops::{Deref, DerefMut};

use super::session::{SessionError, SessionStore};
use crate::identity::CookieTransport;

/// Owns an open [`SessionStore`] and writes it back exactly once when the scope ends.
///
/// [`finish`](Self::finish) flushes and hands the flush result (and the cookie transport, with
/// any outbound cookie changes) to the caller. Every other exit path, including an early `?`
/// return or a panic unwinding through the scope, flushes on drop; a failure there can only be
/// logged.
pub struct ScopedSession<C: CookieTransport> {
    store: Option<SessionStore<C>>,
}

impl<C: CookieTransport> ScopedSession<C> {
    pub(crate) fn new(store: SessionStore<C>) -> Self {
        Self { store: Some(store) }
    }

    /// Flushes the mapping and returns the cookie transport.
    pub fn finish(mut self) -> Result<C, SessionError> {
        let mut store = self.take();
        store.flush()?;
        Ok(store.into_cookies())
    }

    /// Runs `f` against the store, then finishes the scope.
    ///
    /// The flush also happens if `f` panics.
    pub fn run<T>(
        mut self,
        f: impl FnOnce(&mut SessionStore<C>) -> T,
    ) -> Result<(T, C), SessionError> {
        let output = f(&mut *self);
        let cookies = self.finish()?;
        Ok((output, cookies))
    }

    fn take(&mut self) -> SessionStore<C> {
        self.store.take().expect("session scope is only finished once")
    }
}

impl<C: CookieTransport> Deref for ScopedSession<C> {
    type Target = SessionStore<C>;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref().expect("session scope is open until finished")
    }
}

impl<C: CookieTransport> DerefMut for ScopedSession<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store.as_mut().expect("session scope is open until finished")
    }
}

impl<C: CookieTransport> Drop for ScopedSession<C> {
    fn drop(&mut self) {
        let Some(mut store) = self.store.take() else {
            return;
        };
        if std::thread::panicking() {
            tracing::warn!(
                visitor_id = ?store.visitor_id(),
                "flushing visitor session while unwinding"
            );
        }
        if let Err(err) = store.flush() {
            tracing::error!(
                visitor_id = ?store.visitor_id(),
                error = %err,
                "visitor session was not persisted"
            );
        }
    }
}

impl<C: CookieTransport> std::fmt::Debug for ScopedSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedSession")
            .field("store", &self.store)
            .finish()
    }
}
