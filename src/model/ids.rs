// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Opaque per-visitor identifier carried in the identity cookie and used as the cache key.
///
/// The value is not interpreted. It only has to survive a round trip through a cookie
/// header, so it must be non-empty and consist of cookie-octets without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisitorId {
    value: String,
}

impl VisitorId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_cookie_value(&value)?;
        Ok(Self { value })
    }

    /// Mints a fresh identifier: microseconds since the epoch as 13 hex digits followed by
    /// 8 random hex digits.
    pub fn generate() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros())
            .unwrap_or_default();
        let entropy: u32 = rand::random();
        Self {
            value: format!("{micros:013x}{entropy:08x}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for VisitorId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for VisitorId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for VisitorId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VisitorId> for String {
    fn from(id: VisitorId) -> Self {
        id.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("visitor id must not be empty")]
    Empty,
    #[error("visitor id contains {0:?}, which cannot travel in a cookie value")]
    InvalidChar(char),
}

fn validate_cookie_value(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    // RFC 6265 cookie-octet: printable ASCII minus space, DQUOTE, comma, semicolon, backslash.
    match value
        .chars()
        .find(|&ch| !ch.is_ascii_graphic() || matches!(ch, '"' | ',' | ';' | '\\'))
    {
        Some(ch) => Err(IdError::InvalidChar(ch)),
        None => Ok(()),
    }
}
