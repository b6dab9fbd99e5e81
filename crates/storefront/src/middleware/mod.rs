//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (fills the span's `request_id`)
//! 4. Session layer (tower-sessions with a bounded in-memory store)
//! 5. Body limit
//!
//! Token extraction happens per handler via the extractors in [`auth`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalBackendToken, RequireBackendToken, set_backend_token};
pub use request_id::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
pub use session::{CacheSessionStore, create_session_layer};
