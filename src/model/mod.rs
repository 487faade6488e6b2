// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A visitor is known by a [`VisitorId`]; what we keep for them is a [`Content`] mapping.

pub mod content;
pub mod ids;

pub use content::{Content, UnexpectedPayload, WILDCARD_KEY};
pub use ids::{IdError, VisitorId};
