//! Session-related types.
//!
//! The session only ever holds the backend access token; carts and
//! accounts live on the backend.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the backend access token issued at login.
    pub const BACKEND_TOKEN: &str = "backend_token";
}
