//! Cart operations against `/shopping/cart`.
//!
//! Cart state lives on the backend and is scoped to the bearer token, so
//! every method requires one.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{BackendCart, BackendClient, BackendError, BackendToken};

const CART_PATH: &str = "shopping/cart";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCartItemBody<'a> {
    product_id: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateCartItemBody {
    quantity: u32,
}

/// Path of a single cart line; item IDs must be one path segment.
fn item_path(item_id: &str) -> Result<String, BackendError> {
    if item_id.is_empty() || item_id.contains('/') {
        return Err(BackendError::InvalidPath(item_id.to_string()));
    }
    Ok(format!("{CART_PATH}/{item_id}"))
}

impl BackendClient {
    /// Fetch the current cart. A missing cart is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &BackendToken) -> Result<BackendCart, BackendError> {
        let envelope = self.get::<BackendCart>(CART_PATH, Some(token)).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn add_cart_item(
        &self,
        token: &BackendToken,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let body = AddCartItemBody {
            product_id,
            quantity,
        };
        self.send::<_, serde_json::Value>(Method::POST, CART_PATH, &body, Some(token))
            .await?;
        Ok(())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &BackendToken,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let path = item_path(item_id)?;
        let body = UpdateCartItemBody { quantity };
        self.send::<_, serde_json::Value>(Method::PUT, &path, &body, Some(token))
            .await?;
        Ok(())
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(
        &self,
        token: &BackendToken,
        item_id: &str,
    ) -> Result<(), BackendError> {
        let path = item_path(item_id)?;
        self.delete::<serde_json::Value>(&path, Some(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path() {
        assert_eq!(item_path("abc123").ok().as_deref(), Some("shopping/cart/abc123"));
        assert!(matches!(item_path(""), Err(BackendError::InvalidPath(_))));
        assert!(matches!(item_path("a/b"), Err(BackendError::InvalidPath(_))));
    }

    #[test]
    fn test_add_body_is_camel_case() {
        let body = AddCartItemBody {
            product_id: "p-1",
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_value(&body).ok(),
            Some(serde_json::json!({"productId": "p-1", "quantity": 2}))
        );
    }
}
