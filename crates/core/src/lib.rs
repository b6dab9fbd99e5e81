//! Shopfront Core - cart engine.
//!
//! This crate holds the computed logic behind the storefront cart:
//! - [`cart::totals`] - subtotals, pre-order deposits and the amount due now
//! - [`cart::stock`] - per-line stock classification and checkout blocking
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The storefront binary fetches cart snapshots from the backend and
//! runs them through this crate before answering the browser.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod money;

pub use cart::{
    CartItem, CartStockReport, CartTotals, ItemStockAssessment, StockIssue, StockStatus,
    assess_cart, assess_item, calculate_totals,
};
pub use money::round_cents;
