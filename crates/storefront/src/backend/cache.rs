//! Cache types for anonymous catalog responses.

use axum::body::Bytes;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Top-level backend paths whose anonymous GETs may be cached.
pub const CACHEABLE_PREFIXES: &[&str] = &[
    "products",
    "categories",
    "subcategories",
    "brands",
    "banners",
    "page-content",
];

/// Request headers that select a different representation of the same URL.
const VARY_HEADERS: [HeaderName; 2] = [ACCEPT, ACCEPT_LANGUAGE];

/// A fully buffered backend response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Whether an anonymous GET of `path` may be served from cache.
#[must_use]
pub fn is_cacheable_path(path: &str) -> bool {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .is_some_and(|first| CACHEABLE_PREFIXES.contains(&first))
}

/// Cache key for an anonymous GET: the URL plus the headers in `VARY_HEADERS`.
#[must_use]
pub fn cache_key(url: &Url, headers: &HeaderMap) -> String {
    let mut key = url.to_string();
    for name in &VARY_HEADERS {
        key.push('\n');
        if let Some(value) = headers.get(name) {
            key.push_str(&String::from_utf8_lossy(value.as_bytes()));
        }
    }
    key
}
