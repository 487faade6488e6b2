// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Visitor identity: which cookie carries it, and how a missing one gets minted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::CookieConfig;
use crate::model::VisitorId;

/// Cookie access for the current request/response pair.
pub trait CookieTransport {
    /// Value of the named cookie on the inbound request.
    fn read_cookie(&self, name: &str) -> Option<&str>;

    /// Schedules a cookie on the outbound response.
    fn write_cookie(&mut self, cookie: OutboundCookie);

    /// Schedules removal of the named cookie on the outbound response.
    fn remove_cookie(&mut self, name: &str, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set(OutboundCookie),
    Remove { name: String, path: String },
}

impl CookieChange {
    pub fn name(&self) -> &str {
        match self {
            Self::Set(cookie) => &cookie.name,
            Self::Remove { name, .. } => name,
        }
    }

    /// Renders the change as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        match self {
            Self::Set(cookie) => format!(
                "{}={}; Expires={}; Path={}",
                cookie.name,
                cookie.value,
                cookie.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
                cookie.path
            ),
            Self::Remove { name, path } => format!(
                "{name}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path={path}"
            ),
        }
    }
}

/// Request cookies in, response cookie changes out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    inbound: BTreeMap<String, String>,
    outbound: Vec<CookieChange>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inbound.insert(name.into(), value.into());
        self
    }

    /// Collects `name=value` pairs from one or more `Cookie` header values.
    ///
    /// The first occurrence of a name wins, matching how browsers order more specific paths first.
    pub fn from_cookie_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut jar = Self::new();
        for header in headers {
            for pair in header.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                jar.inbound
                    .entry(name.to_owned())
                    .or_insert_with(|| value.to_owned());
            }
        }
        jar
    }

    pub fn changes(&self) -> &[CookieChange] {
        &self.outbound
    }

    pub fn into_changes(self) -> Vec<CookieChange> {
        self.outbound
    }
}

impl CookieTransport for CookieJar {
    fn read_cookie(&self, name: &str) -> Option<&str> {
        self.inbound.get(name).map(String::as_str)
    }

    fn write_cookie(&mut self, cookie: OutboundCookie) {
        self.outbound.retain(|change| change.name() != cookie.name);
        self.outbound.push(CookieChange::Set(cookie));
    }

    fn remove_cookie(&mut self, name: &str, path: &str) {
        self.outbound.retain(|change| change.name() != name);
        self.outbound.push(CookieChange::Remove {
            name: name.to_owned(),
            path: path.to_owned(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub visitor_id: VisitorId,
    /// No usable identity cookie arrived; the id was minted for this request.
    pub is_new: bool,
}

/// Reads the identity cookie, or mints an id and schedules the long-lived cookie for it.
pub fn resolve<C: CookieTransport + ?Sized>(
    cookie: &CookieConfig,
    cookies: &mut C,
) -> ResolvedIdentity {
    resolve_at(cookie, cookies, Utc::now())
}

pub(crate) fn resolve_at<C: CookieTransport + ?Sized>(
    cookie: &CookieConfig,
    cookies: &mut C,
    now: DateTime<Utc>,
) -> ResolvedIdentity {
    if let Some(raw) = cookies.read_cookie(&cookie.name) {
        match VisitorId::new(raw) {
            Ok(visitor_id) => {
                tracing::debug!(cookie = %cookie.name, %visitor_id, "reusing visitor identity");
                return ResolvedIdentity {
                    visitor_id,
                    is_new: false,
                };
            }
            Err(err) => {
                tracing::debug!(cookie = %cookie.name, error = %err, "ignoring unusable identity cookie");
            }
        }
    }

    let visitor_id = VisitorId::generate();
    cookies.write_cookie(OutboundCookie {
        name: cookie.name.clone(),
        value: visitor_id.to_string(),
        expires: now
            .checked_add_signed(cookie.lifetime())
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        path: cookie.path.clone(),
    });
    tracing::debug!(cookie = %cookie.name, %visitor_id, "minted visitor identity");

    ResolvedIdentity {
        visitor_id,
        is_new: true,
    }
}
