// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Request-scoped visitor sessions.
//!
//! A [`SessionStore`] resolves the visitor identity and loads the stored mapping when it is
//! opened, is mutated during the request, and is written back exactly once when its
//! [`ScopedSession`] ends (via [`ScopedSession::finish`], or on drop for every other exit path).

pub mod scope;
pub mod session;

pub use scope::ScopedSession;
pub use session::{SessionError, SessionStore, SessionStoreBuilder};
