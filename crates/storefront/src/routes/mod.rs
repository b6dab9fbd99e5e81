//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Backend reachability
//!
//! # Cart (requires sign-in, except count)
//! GET    /api/cart                - Cart with totals and stock report
//! GET    /api/cart/count          - Header badge count
//! POST   /api/cart/items          - Add a product
//! PUT    /api/cart/items/{id}     - Change quantity (stock guarded)
//! DELETE /api/cart/items/{id}     - Remove a line
//!
//! # Checkout
//! POST   /api/checkout/validate   - 409 when stock blocks checkout
//!
//! # Auth
//! POST   /api/auth/login          - Sign in through the backend
//! POST   /api/auth/logout         - Sign out
//! GET    /api/auth/session        - Signed-in status
//!
//! # Everything else under /api/
//! ANY    /api/{*path}             - Passthrough to the backend
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod proxy;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session_status))
}

/// Create all routes for the storefront.
///
/// Unmatched paths fall through to the backend passthrough, which answers
/// 404 for anything outside `/api/`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/cart", cart_routes())
        .route("/api/checkout/validate", post(cart::validate_checkout))
        .nest("/api/auth", auth_routes())
        .fallback(proxy::forward)
}
