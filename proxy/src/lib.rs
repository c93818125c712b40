//! HTTP API for the MediSync blob proxy.
//!
//! Three route families:
//!
//! - `/api/blobs/{store}/{key}/{operation}` — origin-gated CRUD onto
//!   the backing [`BlobStore`], with `operation` one of `get`, `set`,
//!   `delete`.
//! - `/api/medicine-data` — the single fixed-key variant: `PUT` stores
//!   the body, `GET` returns it or 404.
//! - `/api/auth/check` — `POST` with a bearer token; answers with the
//!   decoded claims or 401.
//!
//! The origin gate compares the `Origin` header against one configured
//! origin (or a `Referer` prefixed by it). It is a string comparison,
//! spoofable by any non-browser client; it is the only access control
//! on the blob routes.

pub mod auth;
pub mod config;

use crate::auth::TokenVerifier;
use crate::config::ProxyConfig;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use medisync_store::BlobStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store name backing the fixed-key route.
const FIXED_STORE: &str = "medicine-data-store";
/// Key backing the fixed-key route.
const FIXED_KEY: &str = "data";

/// Shared state for the proxy routes.
pub struct ProxyState {
    store: Arc<dyn BlobStore>,
    verifier: TokenVerifier,
    config: ProxyConfig,
}

impl ProxyState {
    /// Creates proxy state over `store` with the given config.
    pub fn new(store: Arc<dyn BlobStore>, config: ProxyConfig) -> Self {
        let verifier = TokenVerifier::new(config.auth.clone());
        Self {
            store,
            verifier,
            config,
        }
    }
}

/// Builds the HTTP router with the given state.
pub fn build_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/api/blobs/{store}/{key}/{operation}", any(blob_handler))
        .route("/api/medicine-data", any(fixed_key_handler))
        .route("/api/auth/check", any(auth_check_handler))
        .with_state(state)
}

fn apply_cors(response: &mut Response, allowed_origin: &str) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(allowed_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("null")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

fn cors_json(status: StatusCode, allowed_origin: &str, body: Value) -> Response {
    let mut response = (status, Json(body)).into_response();
    apply_cors(&mut response, allowed_origin);
    response
}

fn origin_allowed(headers: &HeaderMap, allowed_origin: &str) -> bool {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    origin == Some(allowed_origin)
        || referer.is_some_and(|r| r.starts_with(&format!("{allowed_origin}/")))
}

async fn blob_handler(
    State(state): State<Arc<ProxyState>>,
    Path((store, key, operation)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let allowed = state.config.allowed_origin.as_str();

    // Preflight carries no credentials and touches no store.
    if method == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors(&mut response, allowed);
        return response;
    }

    if !origin_allowed(&headers, allowed) {
        debug!("Rejected blob request with non-matching origin");
        return cors_json(StatusCode::FORBIDDEN, allowed, json!({"error": "Forbidden"}));
    }

    if store.is_empty() || key.is_empty() {
        return cors_json(
            StatusCode::BAD_REQUEST,
            allowed,
            json!({"error": "Store name and key are required"}),
        );
    }

    match (method, operation.as_str()) {
        (Method::GET, "get") => match state.store.get(&store, &key).await {
            Ok(value) => cors_json(StatusCode::OK, allowed, value.unwrap_or(Value::Null)),
            Err(e) => store_failure(allowed, e),
        },
        (Method::POST, "set") => {
            let value: Value = match serde_json::from_slice(&body) {
                Ok(value) => value,
                Err(_) => {
                    return cors_json(
                        StatusCode::BAD_REQUEST,
                        allowed,
                        json!({"error": "Invalid JSON body"}),
                    );
                }
            };
            match state.store.set(&store, &key, value).await {
                Ok(()) => cors_json(StatusCode::OK, allowed, json!({"success": true})),
                Err(e) => store_failure(allowed, e),
            }
        }
        (Method::DELETE, "delete") => match state.store.delete(&store, &key).await {
            Ok(()) => cors_json(StatusCode::OK, allowed, json!({"success": true})),
            Err(e) => store_failure(allowed, e),
        },
        _ => cors_json(
            StatusCode::METHOD_NOT_ALLOWED,
            allowed,
            json!({"error": "Method not allowed"}),
        ),
    }
}

fn store_failure(allowed_origin: &str, error: medisync_store::StoreError) -> Response {
    warn!("Blob store error: {error}");
    cors_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        allowed_origin,
        json!({"error": error.to_string()}),
    )
}

/// Single fixed-key variant: one slot, PUT to write, GET to read.
async fn fixed_key_handler(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    body: Bytes,
) -> Response {
    match method {
        Method::PUT => {
            let value: Value = match serde_json::from_slice(&body) {
                Ok(value) => value,
                Err(_) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": "Invalid JSON body"})),
                    )
                        .into_response();
                }
            };
            match state.store.set(FIXED_STORE, FIXED_KEY, value).await {
                Ok(()) => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
                Err(e) => fixed_key_failure(e),
            }
        }
        Method::GET => match state.store.get(FIXED_STORE, FIXED_KEY).await {
            Ok(Some(value)) => (StatusCode::OK, Json(value)).into_response(),
            Ok(None) => (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"}))).into_response(),
            Err(e) => fixed_key_failure(e),
        },
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"error": "Method Not Allowed"})),
        )
            .into_response(),
    }
}

fn fixed_key_failure(error: medisync_store::StoreError) -> Response {
    warn!("Blob store error: {error}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal Server Error"})),
    )
        .into_response()
}

async fn auth_check_handler(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"error": "Method not allowed"})),
        )
            .into_response();
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "No token provided"})),
        )
            .into_response();
    };

    match state.verifier.verify(token).await {
        Ok(claims) => (
            StatusCode::OK,
            Json(json!({"message": "Token is valid", "user": claims})),
        )
            .into_response(),
        Err(e) => {
            debug!("Token verification failed: {e}");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid token"})),
            )
                .into_response()
        }
    }
}
