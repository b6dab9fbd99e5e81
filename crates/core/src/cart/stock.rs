//! Stock assessment for cart lines.
//!
//! Each line is classified once; the cart report then splits the findings
//! into blocking issues (checkout must not proceed) and warnings.

use serde::{Deserialize, Serialize};

use super::CartItem;

/// Low-stock threshold used when an item does not carry its own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

/// Stock classification of a single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Plenty of stock for the requested quantity.
    InStock,
    /// Requested quantity fits, but few units remain.
    LowStock,
    /// Requested quantity is larger than what is available.
    ExceedsStock,
    /// Nothing can be sold.
    OutOfStock,
    /// Pre-order line, not checked against stock.
    PreOrder,
}

impl StockStatus {
    /// Whether this status must prevent checkout.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::OutOfStock | Self::ExceedsStock)
    }
}

/// Stock assessment of one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStockAssessment {
    pub item_id: String,
    pub status: StockStatus,
    pub requested_quantity: u32,
    pub available_stock: Option<u32>,
    pub is_out_of_stock: bool,
    pub exceeds_stock: bool,
    pub is_low_stock: bool,
    pub is_pre_order: bool,
    /// Human-readable explanation; `None` for lines that are simply in stock.
    pub message: Option<String>,
}

/// A problem worth showing to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockIssue {
    pub item_id: String,
    pub name: String,
    pub status: StockStatus,
    pub message: String,
}

/// Stock findings for a whole cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartStockReport {
    pub items: Vec<ItemStockAssessment>,
    /// Out-of-stock and exceeds-stock lines.
    pub blocking: Vec<StockIssue>,
    /// Low-stock lines.
    pub warnings: Vec<StockIssue>,
}

impl CartStockReport {
    #[must_use]
    pub fn has_blocking_issues(&self) -> bool {
        !self.blocking.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Blocking messages joined into one line, for error responses.
    #[must_use]
    pub fn blocking_summary(&self) -> Option<String> {
        if self.blocking.is_empty() {
            return None;
        }
        Some(
            self.blocking
                .iter()
                .map(|issue| issue.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn classify(item: &CartItem) -> StockStatus {
    if item.is_pre_order {
        return StockStatus::PreOrder;
    }
    if !item.is_in_stock() {
        return StockStatus::OutOfStock;
    }
    let Some(stock) = item.available_stock else {
        return StockStatus::InStock;
    };
    if item.quantity > stock {
        return StockStatus::ExceedsStock;
    }

    let threshold = item
        .low_stock_threshold
        .filter(|t| *t > 0)
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    if stock <= threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

fn message_for(item: &CartItem, status: StockStatus) -> Option<String> {
    let name = item.display_name();
    let stock = item.available_stock.unwrap_or(0);
    match status {
        StockStatus::InStock => None,
        StockStatus::PreOrder => Some(format!("{name} is available for pre-order")),
        StockStatus::OutOfStock => Some(format!("{name} is out of stock")),
        StockStatus::ExceedsStock => Some(format!(
            "Only {stock} of {name} available, but {} requested",
            item.quantity
        )),
        StockStatus::LowStock => Some(format!("Only {stock} left in stock")),
    }
}

/// Classify a single cart line.
#[must_use]
pub fn assess_item(item: &CartItem) -> ItemStockAssessment {
    let status = classify(item);
    ItemStockAssessment {
        item_id: item.id.clone(),
        status,
        requested_quantity: item.quantity,
        available_stock: item.available_stock,
        is_out_of_stock: status == StockStatus::OutOfStock,
        exceeds_stock: status == StockStatus::ExceedsStock,
        is_low_stock: status == StockStatus::LowStock,
        is_pre_order: status == StockStatus::PreOrder,
        message: message_for(item, status),
    }
}

/// Classify every line and collect blocking issues and warnings.
#[must_use]
pub fn assess_cart(items: &[CartItem]) -> CartStockReport {
    let mut report = CartStockReport::default();

    for item in items {
        let assessment = assess_item(item);
        if let Some(message) = assessment.message.clone() {
            let issue = StockIssue {
                item_id: item.id.clone(),
                name: item.display_name().to_string(),
                status: assessment.status,
                message,
            };
            if assessment.status.is_blocking() {
                report.blocking.push(issue);
            } else if assessment.status == StockStatus::LowStock {
                report.warnings.push(issue);
            }
        }
        report.items.push(assessment);
    }

    report
}
