//! Backend token extractors.
//!
//! A shopper is signed in when a backend access token is available, either
//! stored in the session by `/api/auth/login` or set as a cookie by the
//! browser-side auth library. The session wins when both are present.

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
};
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;

use crate::backend::BackendToken;
use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

/// Message returned when a signed-in route is hit without a token.
pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";

/// Extractor that requires a backend token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireBackendToken(token): RequireBackendToken) -> impl IntoResponse {
///     // Use token for cart calls
/// }
/// ```
pub struct RequireBackendToken(pub BackendToken);

impl FromRequestParts<AppState> for RequireBackendToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        find_token(parts, state)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized(SIGN_IN_REQUIRED.to_string()))
    }
}

/// Extractor that optionally gets the backend token.
///
/// Unlike `RequireBackendToken`, this does not reject anonymous requests.
pub struct OptionalBackendToken(pub Option<BackendToken>);

impl FromRequestParts<AppState> for OptionalBackendToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(find_token(parts, state).await))
    }
}

async fn find_token(parts: &Parts, state: &AppState) -> Option<BackendToken> {
    if let Some(session) = parts.extensions.get::<Session>()
        && let Some(raw) = session
            .get::<String>(session_keys::BACKEND_TOKEN)
            .await
            .ok()
            .flatten()
        && !raw.is_empty()
    {
        return Some(BackendToken::new(raw));
    }

    cookie_token(parts, &state.config().auth_cookie)
}

/// Read the token cookie from any `Cookie` header.
fn cookie_token(parts: &Parts, cookie_name: &str) -> Option<BackendToken> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
        .map(|cookie| BackendToken::new(cookie.value()))
}

/// Store the backend token in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_backend_token(
    session: &Session,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::BACKEND_TOKEN, token).await
}
