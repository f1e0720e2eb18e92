//! Read-only cart view consumed by checkout.

use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One product line as checkout sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl CartItem {
    /// unit_price * quantity, saturating.
    pub fn line_total(&self) -> Money {
        self.unit_price
            .try_multiply(self.quantity)
            .unwrap_or_else(|| Money::new(i64::MAX, self.unit_price.currency))
    }
}

/// Ordered snapshot of the cart contents.
///
/// Checkout never mutates the cart through this; it only reads totals and,
/// once the order is settled, asks the cart collaborator to clear itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Coupon discount applied to the cart.
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub currency: Currency,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self {
            items,
            discount: Money::zero(Currency::INR),
            currency: Currency::INR,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals before discount.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(self.currency), |acc, item| acc + item.line_total())
    }
}
