//! Cart line item as delivered by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::money::round_cents;

/// A single line in a shopping cart.
///
/// Field names on the wire follow the backend's `item_*` convention. Every
/// field is optional on input; malformed numbers decode to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line ID.
    #[serde(rename = "item_id", default, deserialize_with = "lenient::string")]
    pub id: String,
    /// Product this line refers to.
    #[serde(rename = "item_productId", default, deserialize_with = "lenient::optional_string")]
    pub product_id: Option<String>,
    /// Display name.
    #[serde(rename = "item_name", default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Unit price in the store currency.
    #[serde(rename = "item_price", default, deserialize_with = "lenient::decimal")]
    pub unit_price: Decimal,
    /// Requested quantity.
    #[serde(rename = "item_quantity", default, deserialize_with = "lenient::count")]
    pub quantity: u32,
    /// Backend in-stock flag, when the backend sends one.
    #[serde(rename = "item_instock", default, deserialize_with = "lenient::optional_flag")]
    pub in_stock: Option<bool>,
    /// Units available, when known.
    #[serde(rename = "item_stock", default, deserialize_with = "lenient::optional_count")]
    pub available_stock: Option<u32>,
    /// Pre-order lines pay a deposit now and are exempt from stock checks.
    #[serde(rename = "item_isPreOrder", default, deserialize_with = "lenient::flag")]
    pub is_pre_order: bool,
    /// Per-item low-stock threshold.
    #[serde(
        rename = "item_lowStockThreshold",
        default,
        deserialize_with = "lenient::optional_count"
    )]
    pub low_stock_threshold: Option<u32>,
    /// Image URL.
    #[serde(rename = "item_image", default, deserialize_with = "lenient::optional_string")]
    pub image: Option<String>,
}

impl CartItem {
    /// Price of the whole line, rounded to cents.
    ///
    /// Negative prices count as zero, as does a line whose total overflows
    /// `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        let price = self.unit_price.max(Decimal::ZERO);
        price
            .checked_mul(Decimal::from(self.quantity))
            .map_or_else(|| round_cents(Decimal::ZERO), round_cents)
    }

    /// Whether the item can currently be sold from stock.
    ///
    /// An explicit backend flag wins. Without one, a known stock level of zero
    /// means out of stock and an unknown stock level means in stock.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        let flagged = self
            .in_stock
            .unwrap_or_else(|| self.available_stock.is_none_or(|stock| stock > 0));
        flagged && self.available_stock != Some(0)
    }

    /// Name for user-facing messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { "This item" } else { name }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_full_item() {
        let item: CartItem = serde_json::from_value(json!({
            "item_id": "line-1",
            "item_productId": "prod-9",
            "item_name": "Desk Lamp",
            "item_price": "24.50",
            "item_quantity": 2,
            "item_instock": true,
            "item_stock": 12,
            "item_isPreOrder": false,
            "item_lowStockThreshold": 3,
            "item_image": "https://cdn.example.com/lamp.jpg"
        }))
        .unwrap();

        assert_eq!(item.id, "line-1");
        assert_eq!(item.product_id.as_deref(), Some("prod-9"));
        assert_eq!(item.unit_price, Decimal::new(2450, 2));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.available_stock, Some(12));
        assert_eq!(item.low_stock_threshold, Some(3));
        assert!(!item.is_pre_order);
    }

    #[test]
    fn test_deserialize_malformed_numbers_default_to_zero() {
        let item: CartItem = serde_json::from_value(json!({
            "item_id": "line-2",
            "item_price": "free",
            "item_quantity": "several",
            "item_stock": null
        }))
        .unwrap();

        assert_eq!(item.id, "line-2");
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert_eq!(item.quantity, 0);
        assert_eq!(item.available_stock, None);
        assert_eq!(item.in_stock, None);
    }

    #[test]
    fn test_deserialize_numeric_ids_as_strings() {
        let item: CartItem = serde_json::from_value(json!({
            "item_id": 42,
            "item_productId": 1007,
            "item_name": {"en": "Mug"},
            "item_image": false,
            "item_quantity": 1
        }))
        .unwrap();

        assert_eq!(item.id, "42");
        assert_eq!(item.product_id.as_deref(), Some("1007"));
        assert_eq!(item.name, "");
        assert_eq!(item.image, None);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_line_total_overflow_counts_as_zero() {
        let item: CartItem = serde_json::from_value(json!({
            "item_id": "huge",
            "item_price": "79228162514264337593543950335",
            "item_quantity": 2
        }))
        .unwrap();

        assert_eq!(item.line_total().to_string(), "0.00");
    }

    #[test]
    fn test_line_total_rounds_to_cents() {
        let item = CartItem {
            unit_price: Decimal::new(3333, 3),
            quantity: 3,
            ..CartItem::default()
        };
        assert_eq!(item.line_total().to_string(), "10.00");
    }

    #[test]
    fn test_line_total_ignores_negative_price() {
        let item = CartItem {
            unit_price: Decimal::new(-5, 0),
            quantity: 2,
            ..CartItem::default()
        };
        assert_eq!(item.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_is_in_stock_derivation() {
        let unknown = CartItem::default();
        assert!(unknown.is_in_stock());

        let flagged_out = CartItem {
            in_stock: Some(false),
            available_stock: Some(10),
            ..CartItem::default()
        };
        assert!(!flagged_out.is_in_stock());

        let empty_shelf = CartItem {
            in_stock: Some(true),
            available_stock: Some(0),
            ..CartItem::default()
        };
        assert!(!empty_shelf.is_in_stock());
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(CartItem::default().display_name(), "This item");
    }
}
