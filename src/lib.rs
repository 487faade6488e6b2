// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keepsake — cookie-identified per-visitor key/value persistence.
//!
//! A visitor gets an opaque id in a long-lived cookie on first contact. Each request opens a
//! [`store::ScopedSession`] that loads the visitor's mapping from a [`cache::CacheBackend`],
//! lets request code read and merge values into it, and writes it back exactly once when the
//! scope ends.

pub mod cache;
pub mod config;
pub mod http;
pub mod identity;
pub mod model;
pub mod store;
