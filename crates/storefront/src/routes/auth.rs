//! Session route handlers.
//!
//! Credentials are checked by the backend. On success the access token is kept
//! in the server-side session and never returned to the browser.

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use serde::Serialize;
use serde_json::Value;
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;
use tracing::instrument;

use crate::backend::Envelope;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::{OptionalBackendToken, set_backend_token};
use crate::state::AppState;

/// Fields of the login response that may hold the access token, in lookup order.
const TOKEN_FIELDS: &[&str] = &["accessToken", "access_token", "token"];

/// Token-bearing fields removed from the login response.
const STRIPPED_FIELDS: &[&str] = &["accessToken", "access_token", "refreshToken", "refresh_token", "token"];

/// Whether the shopper has a backend token.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// Pull the access token out of the login response data.
fn access_token(data: Option<&Value>) -> Option<String> {
    let data = data?;
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| data.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(String::from)
}

/// Remove every token-bearing field from the login response data.
fn strip_tokens(data: Option<Value>) -> Option<Value> {
    data.map(|mut value| {
        if let Some(object) = value.as_object_mut() {
            for field in STRIPPED_FIELDS {
                object.remove(*field);
            }
        }
        value
    })
}

/// Sign in through the backend.
#[instrument(skip(state, session, credentials))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(credentials): ApiJson<Value>,
) -> Result<Envelope<Value>> {
    let envelope = state.backend().login(&credentials).await?;

    let token = access_token(envelope.data.as_ref()).ok_or_else(|| {
        AppError::Internal("login response carried no access token".to_string())
    })?;

    // New session ID on privilege change
    session.cycle_id().await?;
    set_backend_token(&session, &token).await?;

    add_breadcrumb("auth", "Signed in", None);
    tracing::info!("Shopper signed in");

    Ok(Envelope {
        success: true,
        data: strip_tokens(envelope.data),
        message: envelope.message,
        meta: envelope.meta,
    })
}

/// Sign out: tell the backend, drop the session and expire the token cookie.
///
/// The backend call is best effort; the local session is cleared regardless.
#[instrument(skip(state, session, token))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalBackendToken(token): OptionalBackendToken,
) -> Result<impl IntoResponse> {
    if let Some(token) = token
        && let Err(e) = state.backend().logout(&token).await
    {
        tracing::warn!(error = %e, "Backend logout failed");
    }

    session.flush().await?;

    let mut expired = Cookie::new(state.config().auth_cookie.clone(), "");
    expired.set_path("/");
    expired.make_removal();

    add_breadcrumb("auth", "Signed out", None);

    Ok((
        AppendHeaders([(SET_COOKIE, expired.to_string())]),
        Envelope::<()>::empty().with_message("Signed out"),
    ))
}

/// Report whether the shopper is signed in.
pub async fn session_status(
    OptionalBackendToken(token): OptionalBackendToken,
) -> Envelope<SessionStatus> {
    Envelope::ok(SessionStatus {
        authenticated: token.is_some(),
    })
}
