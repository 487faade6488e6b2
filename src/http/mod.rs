// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP surface over visitor sessions.
//!
//! Every request opens one scoped session from its `Cookie` header, runs a single store
//! operation, finishes the scope (the one write-back), and turns outbound cookie changes into
//! `Set-Cookie` headers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cache::CacheBackend;
use crate::config::PersistConfig;
use crate::identity::CookieJar;
use crate::store::{SessionError, SessionStore};

#[derive(Clone)]
pub struct AppState {
    config: Arc<PersistConfig>,
    cache: Arc<dyn CacheBackend>,
}

impl AppState {
    pub fn new(config: Arc<PersistConfig>, cache: Arc<dyn CacheBackend>) -> Self {
        Self { config, cache }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/values/{key}",
            get(get_value).put(put_value).delete(delete_value),
        )
        .route("/values/{key}/present", get(value_present))
        .route("/purge", post(purge))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct SetParams {
    #[serde(default)]
    reset: bool,
}

#[derive(Debug)]
enum Reply {
    Value(Option<Value>),
    Presence(bool),
    NoContent,
}

async fn get_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    in_session(state, &headers, move |store| Ok(Reply::Value(store.get(&key)))).await
}

async fn value_present(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    in_session(state, &headers, move |store| Ok(Reply::Presence(store.has(&key)))).await
}

async fn put_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<SetParams>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> Response {
    in_session(state, &headers, move |store| {
        store.set(key, value, params.reset);
        Ok(Reply::NoContent)
    })
    .await
}

async fn delete_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    in_session(state, &headers, move |store| {
        store.delete(&key)?;
        Ok(Reply::NoContent)
    })
    .await
}

async fn purge(State(state): State<AppState>, headers: HeaderMap) -> Response {
    in_session(state, &headers, |store| {
        store.purge()?;
        Ok(Reply::NoContent)
    })
    .await
}

async fn in_session<F>(state: AppState, headers: &HeaderMap, op: F) -> Response
where
    F: FnOnce(&mut SessionStore<CookieJar>) -> Result<Reply, SessionError> + Send + 'static,
{
    let jar = CookieJar::from_cookie_headers(
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
    );

    // Cache calls block; keep them off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        let session = SessionStore::builder(state.config)
            .cookies(jar)
            .cache(state.cache)
            .open()?;
        let (reply, jar) = session.run(op)?;
        reply.map(|reply| (reply, jar))
    })
    .await;

    match outcome {
        Ok(Ok((reply, jar))) => {
            let mut response = reply.into_response();
            for change in jar.changes() {
                match HeaderValue::from_str(&change.to_header_value()) {
                    Ok(value) => {
                        response.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(err) => {
                        tracing::warn!(
                            cookie = change.name(),
                            error = %err,
                            "dropping unrenderable cookie"
                        );
                    }
                }
            }
            response
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "visitor session request failed");
            error_response(&err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "visitor session task failed");
            error_response("visitor session task failed")
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Value(Some(value)) => (StatusCode::OK, Json(value)).into_response(),
            Self::Value(None) => (StatusCode::NOT_FOUND, Json(Value::Null)).into_response(),
            Self::Presence(present) => Json(json!({ "present": present })).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
