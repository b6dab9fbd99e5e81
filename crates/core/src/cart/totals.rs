//! Cart totals with pre-order deposits.
//!
//! Pre-order lines are split: half of their value is due at checkout, the
//! remainder is collected when the goods ship. Regular lines are due in full.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CartItem;
use crate::money::round_cents;

/// Share of a pre-order line's value collected at checkout.
pub const PRE_ORDER_DEPOSIT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Computed money totals for a cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Every line, regular and pre-order.
    pub cart_sub_total: Decimal,
    /// Lines sold from stock.
    pub regular_subtotal: Decimal,
    /// Lines sold as pre-orders.
    pub pre_order_subtotal: Decimal,
    /// Deposit collected now for pre-order lines.
    pub pre_order_deposit_due: Decimal,
    /// Pre-order value collected later.
    pub pre_order_balance_due: Decimal,
    /// Amount charged at checkout: regular lines plus pre-order deposit.
    pub due_now_subtotal: Decimal,
}

impl Default for CartTotals {
    fn default() -> Self {
        let zero = round_cents(Decimal::ZERO);
        Self {
            cart_sub_total: zero,
            regular_subtotal: zero,
            pre_order_subtotal: zero,
            pre_order_deposit_due: zero,
            pre_order_balance_due: zero,
            due_now_subtotal: zero,
        }
    }
}

impl CartTotals {
    /// Whether any part of the cart is a pre-order.
    #[must_use]
    pub fn has_pre_order(&self) -> bool {
        !self.pre_order_subtotal.is_zero()
    }
}

/// Sum that counts as zero when it overflows `Decimal`.
fn add_or_zero(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

/// Compute totals for a list of cart lines.
///
/// Never fails: overflowing sums count as zero, like malformed prices.
#[must_use]
pub fn calculate_totals(items: &[CartItem]) -> CartTotals {
    let (regular, pre_order) =
        items
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(regular, pre_order), item| {
                if item.is_pre_order {
                    (regular, add_or_zero(pre_order, item.line_total()))
                } else {
                    (add_or_zero(regular, item.line_total()), pre_order)
                }
            });

    let regular_subtotal = round_cents(regular);
    let pre_order_subtotal = round_cents(pre_order);
    let pre_order_deposit_due = round_cents(
        pre_order_subtotal
            .checked_mul(PRE_ORDER_DEPOSIT_RATE)
            .unwrap_or(Decimal::ZERO),
    );
    let pre_order_balance_due = round_cents(
        pre_order_subtotal
            .checked_sub(pre_order_deposit_due)
            .unwrap_or(Decimal::ZERO),
    );

    CartTotals {
        cart_sub_total: round_cents(add_or_zero(regular_subtotal, pre_order_subtotal)),
        regular_subtotal,
        pre_order_subtotal,
        pre_order_deposit_due,
        pre_order_balance_due,
        due_now_subtotal: round_cents(add_or_zero(regular_subtotal, pre_order_deposit_due)),
    }
}
