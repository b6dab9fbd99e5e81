//! Integration test helpers for Shopfront.
//!
//! Tests drive the storefront router in-process with `tower::ServiceExt::oneshot`
//! while a `wiremock` server stands in for the REST backend, so no running
//! services are needed.
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::Value;
use shopfront_storefront::config::{
    BackendConfig, DEFAULT_AUTH_COOKIE, StorefrontConfig, parse_backend_url,
};
use shopfront_storefront::state::AppState;
use tower::ServiceExt;

/// Path prefix the mock backend is mounted under.
pub const BACKEND_PREFIX: &str = "/api/v1";

/// Token the tests present as the auth cookie.
pub const TOKEN: &str = "tok";

/// Storefront config pointing at a mock backend.
#[must_use]
pub fn test_config(backend_uri: &str, cache_ttl: Duration) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        auth_cookie: DEFAULT_AUTH_COOKIE.to_string(),
        max_body_bytes: 1024 * 1024,
        backend: BackendConfig {
            base_url: parse_backend_url(&format!("{backend_uri}{BACKEND_PREFIX}")).unwrap(),
            timeout: Duration::from_secs(5),
            cache_ttl,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Storefront router with caching disabled.
#[must_use]
pub fn test_app(backend_uri: &str) -> Router {
    app_with_config(test_config(backend_uri, Duration::ZERO))
}

/// Storefront router for a given config.
#[must_use]
pub fn app_with_config(config: StorefrontConfig) -> Router {
    shopfront_storefront::app(AppState::new(config).unwrap())
}

/// `Cookie` header value carrying the test token.
#[must_use]
pub fn token_cookie() -> String {
    format!("{DEFAULT_AUTH_COOKIE}={TOKEN}")
}

/// Full backend path for a relative backend path.
#[must_use]
pub fn backend_path(path: &str) -> String {
    format!("{BACKEND_PREFIX}/{path}")
}

/// Response parts collected for assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Send one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Request builder with the token cookie set.
#[must_use]
pub fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", token_cookie())
}

/// JSON request body.
#[must_use]
pub fn json_body(value: &Value) -> Body {
    Body::from(serde_json::to_vec(value).unwrap())
}
