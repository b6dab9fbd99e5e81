//! REST backend client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts, catalog and accounts;
//!   the storefront holds no local copy.
//! - Every response is wrapped in a `{ success, data, message, meta }` envelope.
//! - Anonymous catalog reads are cached in memory via `moka`.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//!
//! let cart = client.get_cart(&token).await?;
//! client.update_cart_item(&token, &cart.items[0].id, 3).await?;
//! ```

mod auth;
mod cache;
mod cart;
pub mod query;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub use cache::{CachedResponse, cache_key, is_cacheable_path};
pub use types::{BackendCart, BackendToken, Envelope};

use crate::config::BackendConfig;

/// Message shown when the backend gives us nothing better.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Characters of a response body kept in logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend answered 2xx but with `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Path would leave the backend base URL or is otherwise unusable.
    #[error("Invalid backend path: {0}")]
    InvalidPath(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Message that is safe to show to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Rejected(message) => message.clone(),
            Self::RateLimited(_) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::InvalidPath(_) => "Invalid request path".to_string(),
            Self::Http(_) | Self::Parse(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status to answer the browser with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Http(_) | Self::Parse(_) => StatusCode::BAD_GATEWAY,
            Self::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Rejected(_) | Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Whether this error indicates a fault on our side or the backend's.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_))
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Looks at `message`, then `error` (string or `{ message }`), and falls back
/// to [`GENERIC_ERROR_MESSAGE`].
#[must_use]
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    let non_empty = |v: Option<&serde_json::Value>| {
        v.and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    non_empty(value.get("message"))
        .or_else(|| non_empty(value.get("error")))
        .or_else(|| non_empty(value.get("error").and_then(|e| e.get("message"))))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

fn truncate(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}

fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

/// Reject paths that could escape the backend base URL.
fn validate_path(path: &str) -> Result<&str, BackendError> {
    let trimmed = path.trim_start_matches('/');
    let invalid = || BackendError::InvalidPath(path.to_string());

    if trimmed.is_empty() || trimmed.contains("://") || trimmed.contains(['\\', '?', '#']) {
        return Err(invalid());
    }

    let has_bad_segment = trimmed.trim_end_matches('/').split('/').any(|segment| {
        let lower = segment.to_ascii_lowercase();
        matches!(
            lower.as_str(),
            "" | "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
        )
    });
    if has_bad_segment {
        return Err(invalid());
    }

    Ok(trimmed)
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the REST backend.
///
/// Cheap to clone; the HTTP connection pool and cache are shared.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<String, CachedResponse>>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopfront-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL all paths are joined to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Whether anonymous catalog responses are cached.
    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.inner.cache.is_some()
    }

    /// Build the absolute URL for a backend path and query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path is empty, contains dot segments, or
    /// would resolve outside the base URL.
    pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, BackendError> {
        let relative = validate_path(path)?;
        let mut url = self
            .inner
            .base_url
            .join(relative)
            .map_err(|_| BackendError::InvalidPath(path.to_string()))?;

        if !url.as_str().starts_with(self.inner.base_url.as_str()) {
            return Err(BackendError::InvalidPath(path.to_string()));
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Start a request, attaching the bearer token when present.
    #[must_use]
    pub fn request(&self, method: Method, url: Url, token: Option<&BackendToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.secret().expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited(retry_after(response.headers())));
        }

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&response_text),
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Envelope::empty());
        }

        let envelope: Envelope<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text),
                    "Failed to parse backend response"
                );
                return Err(BackendError::Parse(e));
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            return Err(BackendError::Rejected(message));
        }

        Ok(envelope)
    }

    /// GET a backend path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&BackendToken>,
    ) -> Result<Envelope<T>, BackendError> {
        let url = self.endpoint(path, &[])?;
        self.execute(self.request(Method::GET, url, token)).await
    }

    /// Send a JSON body to a backend path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, body, token))]
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&BackendToken>,
    ) -> Result<Envelope<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, &[])?;
        self.execute(self.request(method, url, token).json(body))
            .await
    }

    /// DELETE a backend path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token))]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&BackendToken>,
    ) -> Result<Envelope<T>, BackendError> {
        let url = self.endpoint(path, &[])?;
        self.execute(self.request(Method::DELETE, url, token))
            .await
    }

    /// Send a prepared request without interpreting the response.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend could not be reached.
    pub async fn forward(&self, builder: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        Ok(builder.send().await?)
    }

    /// Anonymous GET, served from cache when possible.
    ///
    /// `headers` are sent with the request; the ones that change the
    /// representation are part of the cache key. Only successful responses
    /// are cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not be reached.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn fetch_cached(
        &self,
        url: Url,
        headers: HeaderMap,
    ) -> Result<CachedResponse, BackendError> {
        let key = cache_key(&url, &headers);

        if let Some(cache) = &self.inner.cache
            && let Some(hit) = cache.get(&key).await
        {
            debug!("Cache hit");
            return Ok(hit);
        }

        let response = self.inner.client.get(url).headers(headers).send().await?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        let cached = CachedResponse {
            status,
            content_type,
            body,
        };

        if status.is_success()
            && let Some(cache) = &self.inner.cache
        {
            cache.insert(key, cached.clone()).await;
        }

        Ok(cached)
    }

    /// Whether the backend answers at all (any non-5xx response).
    pub async fn ping(&self) -> bool {
        match self.inner.client.get(self.inner.base_url.clone()).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(e) => {
                tracing::warn!(error = %e, "Backend readiness check failed");
                false
            }
        }
    }
}
