//! Cart route handlers.
//!
//! The cart itself lives on the backend. Every handler re-reads it after a
//! mutation and answers with a [`CartView`]: the backend lines plus totals and
//! the stock report computed by `shopfront_core`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CartItem, CartStockReport, CartTotals, assess_cart, assess_item, calculate_totals};
use tracing::instrument;

use crate::backend::{BackendCart, Envelope};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{OptionalBackendToken, RequireBackendToken};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// A cart line with its computed line total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
}

/// Cart as returned to the browser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub totals: CartTotals,
    pub stock: CartStockReport,
}

impl From<BackendCart> for CartView {
    fn from(cart: BackendCart) -> Self {
        let item_count = cart.total_quantity();
        let totals = calculate_totals(&cart.items);
        let stock = assess_cart(&cart.items);
        let items = cart
            .items
            .into_iter()
            .map(|item| CartLineView {
                line_total: item.line_total(),
                item,
            })
            .collect();

        Self {
            items,
            item_count,
            totals,
            stock,
        }
    }
}

/// Badge count for the header.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Requests
// =============================================================================

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart line request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart with totals and stock report.
#[instrument(skip(state, token))]
pub async fn show(
    State(state): State<AppState>,
    RequireBackendToken(token): RequireBackendToken,
) -> Result<Envelope<CartView>> {
    let cart = state.backend().get_cart(&token).await?;
    Ok(Envelope::ok(CartView::from(cart)))
}

/// Total quantity in the cart. Anonymous shoppers have an empty cart.
#[instrument(skip(state, token))]
pub async fn count(
    State(state): State<AppState>,
    OptionalBackendToken(token): OptionalBackendToken,
) -> Result<Envelope<CartCount>> {
    let count = match token {
        Some(token) => state.backend().get_cart(&token).await?.total_quantity(),
        None => 0,
    };
    Ok(Envelope::ok(CartCount { count }))
}

/// Add a product to the cart.
#[instrument(skip(state, token))]
pub async fn add(
    State(state): State<AppState>,
    RequireBackendToken(token): RequireBackendToken,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> Result<Envelope<CartView>> {
    let product_id = request.product_id.trim();
    if product_id.is_empty() {
        return Err(AppError::BadRequest("Product is required".to_string()));
    }
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    add_breadcrumb(
        "cart",
        "Added item to cart",
        Some(&[("product_id", product_id)]),
    );

    let backend = state.backend();
    backend.add_cart_item(&token, product_id, quantity).await?;
    let cart = backend.get_cart(&token).await?;

    Ok(Envelope::ok(CartView::from(cart)).with_message("Added to cart"))
}

/// Change the quantity of a cart line.
///
/// Increases that would push a line over its available stock are refused
/// before anything is sent to the backend. Decreases always go through so an
/// over-stock line can be fixed.
#[instrument(skip(state, token, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireBackendToken(token): RequireBackendToken,
    ApiPath(item_id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateCartItemRequest>,
) -> Result<Envelope<CartView>> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1. Remove the item instead.".to_string(),
        ));
    }

    let backend = state.backend();
    let cart = backend.get_cart(&token).await?;
    let item = cart
        .item(&item_id)
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    if request.quantity > item.quantity {
        let proposed = CartItem {
            quantity: request.quantity,
            ..item.clone()
        };
        let assessment = assess_item(&proposed);
        if assessment.status.is_blocking() {
            tracing::debug!(
                item_id = %item_id,
                requested = request.quantity,
                available = ?assessment.available_stock,
                "Refusing cart update over available stock"
            );
            return Err(AppError::BadRequest(assessment.message.unwrap_or_else(
                || format!("{} cannot be added in that quantity", proposed.display_name()),
            )));
        }
    }

    let quantity = request.quantity.to_string();
    add_breadcrumb(
        "cart",
        "Updated cart quantity",
        Some(&[("item_id", item_id.as_str()), ("quantity", quantity.as_str())]),
    );

    backend
        .update_cart_item(&token, &item_id, request.quantity)
        .await?;
    let cart = backend.get_cart(&token).await?;

    Ok(Envelope::ok(CartView::from(cart)))
}

/// Remove a cart line.
#[instrument(skip(state, token))]
pub async fn remove(
    State(state): State<AppState>,
    RequireBackendToken(token): RequireBackendToken,
    ApiPath(item_id): ApiPath<String>,
) -> Result<Envelope<CartView>> {
    add_breadcrumb(
        "cart",
        "Removed item from cart",
        Some(&[("item_id", item_id.as_str())]),
    );

    let backend = state.backend();
    backend.remove_cart_item(&token, &item_id).await?;
    let cart = backend.get_cart(&token).await?;

    Ok(Envelope::ok(CartView::from(cart)).with_message("Removed from cart"))
}

/// Check whether the cart may proceed to checkout.
///
/// Answers 409 with the cart view when any line is out of stock or over its
/// available stock; the message lists every blocking line.
#[instrument(skip(state, token))]
pub async fn validate_checkout(
    State(state): State<AppState>,
    RequireBackendToken(token): RequireBackendToken,
) -> Result<Response> {
    let cart = state.backend().get_cart(&token).await?;
    if cart.items.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let view = CartView::from(cart);
    if let Some(summary) = view.stock.blocking_summary() {
        tracing::info!(
            blocking = view.stock.blocking.len(),
            "Checkout blocked by stock issues"
        );
        let body = Envelope {
            success: false,
            data: Some(view),
            message: Some(summary),
            meta: None,
        };
        return Ok((StatusCode::CONFLICT, body).into_response());
    }

    Ok(Envelope::ok(view).into_response())
}
