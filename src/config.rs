// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only configuration owned by the session component.
//!
//! Loaded from a TOML file; every field has a default so an empty file is valid:
//!
//! ```toml
//! namespace = "light_persist"
//! purge = "retain-content"
//!
//! [cookie]
//! name = "psd_"
//! path = "/"
//! lifetime_days = 3650
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "light_persist";
pub const DEFAULT_COOKIE_NAME: &str = "psd_";
pub const DEFAULT_COOKIE_PATH: &str = "/";
pub const DEFAULT_COOKIE_LIFETIME_DAYS: u32 = 3650;
pub const MAX_COOKIE_LIFETIME_DAYS: u32 = 365 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistConfig {
    /// Cache namespace every visitor record is stored under.
    pub namespace: String,
    pub cookie: CookieConfig,
    pub purge: PurgeMode,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            cookie: CookieConfig::default(),
            purge: PurgeMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub lifetime_days: u32,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_owned(),
            path: DEFAULT_COOKIE_PATH.to_owned(),
            lifetime_days: DEFAULT_COOKIE_LIFETIME_DAYS,
        }
    }
}

impl CookieConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::days(i64::from(self.lifetime_days))
    }
}

/// What `purge` does to the in-memory mapping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurgeMode {
    /// Drop the cookie and the cache entry only.
    ///
    /// The mapping stays in memory and the scope-end flush writes it back under the purged
    /// identifier, re-creating the entry that was just invalidated.
    #[default]
    RetainContent,

    /// Also forget the in-memory mapping and skip the scope-end flush.
    DiscardContent,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl PersistConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "namespace",
                reason: "must not be empty",
            });
        }
        if self.cookie.name.is_empty() || !self.cookie.name.chars().all(is_cookie_token_char) {
            return Err(ConfigError::Invalid {
                field: "cookie.name",
                reason: "must be a non-empty cookie token",
            });
        }
        if !self.cookie.path.starts_with('/') || self.cookie.path.contains(';') {
            return Err(ConfigError::Invalid {
                field: "cookie.path",
                reason: "must start with '/' and not contain ';'",
            });
        }
        if self.cookie.lifetime_days == 0 {
            return Err(ConfigError::Invalid {
                field: "cookie.lifetime_days",
                reason: "must be positive",
            });
        }
        if self.cookie.lifetime_days > MAX_COOKIE_LIFETIME_DAYS {
            return Err(ConfigError::Invalid {
                field: "cookie.lifetime_days",
                reason: "must not exceed 365000 days",
            });
        }
        Ok(())
    }
}

fn is_cookie_token_char(ch: char) -> bool {
    ch.is_ascii_graphic()
        && !matches!(
            ch,
            '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?'
                | '=' | '{' | '}'
        )
}
