//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `BACKEND_API_URL` - Base URL of the REST backend (e.g., <https://api.example.com/v1>)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_AUTH_COOKIE` - Cookie carrying the backend access token (default: accessToken)
//! - `STOREFRONT_MAX_BODY_BYTES` - Request body and upload limit (default: 10 MiB)
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `BACKEND_CACHE_TTL_SECS` - Anonymous catalog cache TTL, 0 disables (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default cookie name set by the browser-side auth library.
pub const DEFAULT_AUTH_COOKIE: &str = "accessToken";

const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Cookie holding the backend access token
    pub auth_cookie: String,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// REST backend configuration
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every backend path is joined to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL for cached anonymous catalog responses; zero disables caching
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let auth_cookie = get_env_or_default("STOREFRONT_AUTH_COOKIE", DEFAULT_AUTH_COOKIE);
        if auth_cookie.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_AUTH_COOKIE".to_string(),
                "cookie name cannot be empty".to_string(),
            ));
        }
        let max_body_bytes = get_parsed_env(
            "STOREFRONT_MAX_BODY_BYTES",
            &DEFAULT_MAX_BODY_BYTES.to_string(),
        )?;

        let backend = BackendConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            auth_cookie,
            max_body_bytes,
            backend,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("BACKEND_API_URL")?;
        let base_url = parse_backend_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_API_URL".to_string(), e))?;
        let timeout = Duration::from_secs(get_parsed_env("BACKEND_TIMEOUT_SECS", "30")?);
        let cache_ttl = Duration::from_secs(get_parsed_env("BACKEND_CACHE_TTL_SECS", "60")?);

        Ok(Self {
            base_url,
            timeout,
            cache_ttl,
        })
    }
}

/// Parse a backend base URL and normalise it to end with a slash.
///
/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// so `https://api.example.com/v1` must become `https://api.example.com/v1/`.
///
/// # Errors
///
/// Returns a description of the problem if the URL is not absolute http(s).
pub fn parse_backend_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, falling back to `default`.
fn get_parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            auth_cookie: DEFAULT_AUTH_COOKIE.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            backend: BackendConfig {
                base_url: parse_backend_url("http://localhost:4000/api/v1").unwrap(),
                timeout: Duration::from_secs(30),
                cache_ttl: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("http://localhost:3000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!test_config("http://localhost:3000").is_secure());
        assert!(test_config("https://shop.example.com").is_secure());
    }

    #[test]
    fn test_parse_backend_url_adds_trailing_slash() {
        let url = parse_backend_url("https://api.example.com/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(url.join("products").unwrap().as_str(), "https://api.example.com/v1/products");
    }

    #[test]
    fn test_parse_backend_url_strips_query() {
        let url = parse_backend_url("http://localhost:4000/?debug=1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/");
    }

    #[test]
    fn test_parse_backend_url_rejects_other_schemes() {
        assert!(parse_backend_url("ftp://files.example.com").is_err());
        assert!(parse_backend_url("not a url").is_err());
    }
}
