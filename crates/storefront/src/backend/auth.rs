//! Session endpoints on the backend.
//!
//! Credential checks happen on the backend; the storefront only relays the
//! request and keeps the resulting token.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::instrument;

use super::{BackendClient, BackendError, BackendToken, Envelope};

impl BackendClient {
    /// Relay a login request to `/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Value) -> Result<Envelope<Value>, BackendError> {
        self.send(Method::POST, "auth/login", credentials, None)
            .await
    }

    /// Tell the backend the token is no longer in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &BackendToken) -> Result<(), BackendError> {
        self.send::<_, Value>(Method::POST, "auth/logout", &json!({}), Some(token))
            .await?;
        Ok(())
    }
}
