//! Wire types shared with the REST backend.

use axum::Json;
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shopfront_core::CartItem;

// =============================================================================
// Envelope
// =============================================================================

/// The `{ success, data, message, meta }` wrapper every backend response uses.
///
/// The storefront answers the browser in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Missing on some 2xx responses; treated as success.
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    /// Pagination and other metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

const fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: None,
        }
    }

    /// Successful envelope with no data.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            meta: None,
        }
    }

    /// Failed envelope with a user-facing message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            meta: None,
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart as returned by `GET /shopping/cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartPayload")]
pub struct BackendCart {
    pub items: Vec<CartItem>,
}

/// The backend answers with either a bare item array or `{ items: [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CartPayload {
    Items(Vec<CartItem>),
    Cart {
        #[serde(default)]
        items: Vec<CartItem>,
    },
}

impl From<CartPayload> for BackendCart {
    fn from(payload: CartPayload) -> Self {
        match payload {
            CartPayload::Items(items) | CartPayload::Cart { items } => Self { items },
        }
    }
}

impl BackendCart {
    /// Sum of line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Find a line by its cart item ID.
    #[must_use]
    pub fn item(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Backend access token presented as `Authorization: Bearer`.
#[derive(Clone)]
pub struct BackendToken(SecretString);

impl BackendToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl std::fmt::Debug for BackendToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BackendToken([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_missing_success_defaults_true() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"data": [1, 2]})).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!([1, 2])));
        assert_eq!(envelope.meta, None);
    }

    #[test]
    fn test_envelope_keeps_meta() {
        let envelope: Envelope<serde_json::Value> = serde_json::from_value(json!({
            "success": true,
            "data": [],
            "message": "ok",
            "meta": {"page": 2, "totalPages": 9}
        }))
        .unwrap();
        assert_eq!(envelope.meta, Some(json!({"page": 2, "totalPages": 9})));
    }

    #[test]
    fn test_failure_envelope_serializes_null_data() {
        let value = serde_json::to_value(Envelope::<()>::failure("Out of stock")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "data": null, "message": "Out of stock"})
        );
    }

    #[test]
    fn test_cart_from_object_payload() {
        let envelope: Envelope<BackendCart> = serde_json::from_value(json!({
            "success": true,
            "data": {"items": [
                {"item_id": "a", "item_price": 10, "item_quantity": 2},
                {"item_id": "b", "item_price": "5.5", "item_quantity": "1"}
            ]}
        }))
        .unwrap();
        let cart = envelope.data.unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.item("b").map(|i| i.quantity), Some(1));
    }

    #[test]
    fn test_cart_from_array_payload() {
        let cart: BackendCart =
            serde_json::from_value(json!([{"item_id": "a", "item_quantity": 4}])).unwrap();
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_cart_null_data_is_none() {
        let envelope: Envelope<BackendCart> =
            serde_json::from_value(json!({"success": true, "data": null})).unwrap();
        assert_eq!(envelope.data.unwrap_or_default(), BackendCart::default());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = BackendToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        assert_eq!(format!("{token:?}"), "BackendToken([REDACTED])");
    }
}
