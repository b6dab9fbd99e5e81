//! Cart engine.
//!
//! Pure functions over a snapshot of cart lines. The storefront calls these on
//! every cart response so the browser never has to do money arithmetic.

mod item;
mod lenient;
pub mod stock;
pub mod totals;

pub use item::CartItem;
pub use stock::{
    CartStockReport, ItemStockAssessment, StockIssue, StockStatus, assess_cart, assess_item,
};
pub use totals::{CartTotals, calculate_totals};
