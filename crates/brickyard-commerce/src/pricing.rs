//! Checkout pricing: delivery fee, tax and advance payment.
//!
//! Every percentage is rounded half up to whole rupees using
//! [`Money::percentage_rounded`].

use serde::{Deserialize, Serialize};

use crate::cart::CartSnapshot;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use crate::payment::PaymentMethod;

/// Advance percentage recorded for cash-on-delivery orders.
pub const COD_ADVANCE_PERCENT: u8 = 100;

/// Store-wide pricing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Delivery is free only when the subtotal is strictly above this.
    pub free_delivery_threshold: Money,
    pub delivery_fee: Money,
    pub tax_percent: u8,
    /// Share of the total collected up front for online methods.
    pub advance_percent: u8,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_delivery_threshold: Money::inr(10_000),
            delivery_fee: Money::inr(500),
            tax_percent: 18,
            advance_percent: 25,
        }
    }
}

impl PricingPolicy {
    /// ₹0 when `subtotal` exceeds the threshold, the flat fee otherwise.
    pub fn delivery_fee_for(&self, subtotal: Money) -> Money {
        if subtotal.amount_minor > self.free_delivery_threshold.amount_minor {
            Money::zero(subtotal.currency)
        } else {
            Money::new(self.delivery_fee.amount_minor, subtotal.currency)
        }
    }

    /// Price a subtotal with an optional coupon discount.
    ///
    /// The delivery threshold looks at the subtotal before discount; tax is
    /// charged on the discounted subtotal.
    pub fn price(&self, subtotal: Money, discount: Money) -> Result<OrderPricing, CommerceError> {
        let currency = subtotal.currency;
        let discount = discount.non_negative();
        let taxable = subtotal
            .try_subtract(&discount)
            .ok_or_else(|| mismatch(currency, discount.currency))?
            .non_negative();

        let delivery_fee = self.delivery_fee_for(subtotal);
        let tax = taxable
            .percentage_rounded(i64::from(self.tax_percent))
            .ok_or(CommerceError::Overflow)?;
        let total = taxable
            .try_add(&delivery_fee)
            .and_then(|t| t.try_add(&tax))
            .ok_or(CommerceError::Overflow)?;

        Ok(OrderPricing {
            subtotal,
            discount,
            delivery_fee,
            tax,
            total,
        })
    }

    /// Price a cart snapshot.
    pub fn price_cart(&self, cart: &CartSnapshot) -> Result<OrderPricing, CommerceError> {
        self.price(cart.subtotal(), cart.discount)
    }

    /// Advance percentage sent with the order: 100 for COD, the policy share otherwise.
    pub fn advance_percentage(&self, method: PaymentMethod) -> u8 {
        if method.is_online() {
            self.advance_percent
        } else {
            COD_ADVANCE_PERCENT
        }
    }

    /// How much is collected now versus on delivery.
    pub fn advance(&self, pricing: &OrderPricing, method: PaymentMethod) -> Result<AdvanceBreakdown, CommerceError> {
        let percentage = self.advance_percentage(method);
        let (due_now, due_on_delivery) = if method.is_online() {
            let due_now = pricing
                .total
                .percentage_rounded(i64::from(percentage))
                .ok_or(CommerceError::Overflow)?;
            let remaining = pricing
                .total
                .try_subtract(&due_now)
                .ok_or(CommerceError::Overflow)?;
            (due_now, remaining)
        } else {
            // COD collects everything at the door
            (Money::zero(pricing.total.currency), pricing.total)
        };

        Ok(AdvanceBreakdown {
            percentage,
            due_now,
            due_on_delivery,
        })
    }
}

/// Full pricing breakdown shown on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Money,
    pub discount: Money,
    pub delivery_fee: Money,
    pub tax: Money,
    /// subtotal - discount + delivery fee + tax
    pub total: Money,
}

impl OrderPricing {
    pub fn has_free_delivery(&self) -> bool {
        self.delivery_fee.is_zero()
    }
}

/// Split of the total between the online advance and the amount due on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceBreakdown {
    pub percentage: u8,
    pub due_now: Money,
    pub due_on_delivery: Money,
}

fn mismatch(expected: Currency, got: Currency) -> CommerceError {
    CommerceError::CurrencyMismatch {
        expected: expected.code().to_string(),
        got: got.code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(subtotal: i64) -> OrderPricing {
        PricingPolicy::default()
            .price(Money::inr(subtotal), Money::zero(Currency::INR))
            .unwrap()
    }

    #[test]
    fn test_delivery_fee_boundary_is_exclusive() {
        assert_eq!(price(10_000).delivery_fee, Money::inr(500));
        assert_eq!(price(10_001).delivery_fee, Money::inr(0));
        assert!(price(10_001).has_free_delivery());
        assert_eq!(price(9_999).delivery_fee, Money::inr(500));
    }

    #[test]
    fn test_tax_rounding() {
        assert_eq!(price(1000).tax, Money::inr(180));
        assert_eq!(price(1050).tax, Money::inr(189));
        // 150.66 rounds up
        assert_eq!(price(837).tax, Money::inr(151));
        // 0.18 * 25 = 4.5, half goes up
        assert_eq!(price(25).tax, Money::inr(5));
        // 0.18 * 836 = 150.48 rounds down
        assert_eq!(price(836).tax, Money::inr(150));
    }

    #[test]
    fn test_cod_twelve_thousand() {
        let policy = PricingPolicy::default();
        let pricing = price(12_000);
        assert_eq!(pricing.delivery_fee, Money::inr(0));
        assert_eq!(pricing.tax, Money::inr(2160));
        assert_eq!(pricing.total, Money::inr(14_160));

        let advance = policy.advance(&pricing, PaymentMethod::Cod).unwrap();
        assert_eq!(advance.percentage, 100);
        assert_eq!(advance.due_on_delivery, Money::inr(14_160));
        assert!(advance.due_now.is_zero());
    }

    #[test]
    fn test_upi_five_thousand() {
        let policy = PricingPolicy::default();
        let pricing = price(5000);
        assert_eq!(pricing.delivery_fee, Money::inr(500));
        assert_eq!(pricing.tax, Money::inr(900));
        assert_eq!(pricing.total, Money::inr(6400));

        let advance = policy.advance(&pricing, PaymentMethod::Upi).unwrap();
        assert_eq!(advance.percentage, 25);
        assert_eq!(advance.due_now, Money::inr(1600));
        assert_eq!(advance.due_on_delivery, Money::inr(4800));
    }

    #[test]
    fn test_advance_rounds_half_up() {
        let policy = PricingPolicy::default();
        let pricing = OrderPricing {
            subtotal: Money::inr(10),
            discount: Money::inr(0),
            delivery_fee: Money::inr(0),
            tax: Money::inr(0),
            total: Money::inr(10),
        };
        // 2.5 -> 3
        let advance = policy.advance(&pricing, PaymentMethod::Card).unwrap();
        assert_eq!(advance.due_now, Money::inr(3));
        assert_eq!(advance.due_on_delivery, Money::inr(7));
    }

    #[test]
    fn test_tax_on_discounted_subtotal() {
        let pricing = PricingPolicy::default()
            .price(Money::inr(10_500), Money::inr(1000))
            .unwrap();
        // threshold uses the pre-discount subtotal
        assert!(pricing.has_free_delivery());
        assert_eq!(pricing.tax, Money::inr(1710));
        assert_eq!(pricing.total, Money::inr(11_210));
    }

    #[test]
    fn test_discount_larger_than_subtotal() {
        let pricing = PricingPolicy::default()
            .price(Money::inr(100), Money::inr(500))
            .unwrap();
        assert!(pricing.tax.is_zero());
        assert_eq!(pricing.total, Money::inr(500));
    }

    #[test]
    fn test_advance_percentage_by_method() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.advance_percentage(PaymentMethod::Cod), 100);
        for method in [PaymentMethod::Card, PaymentMethod::Upi, PaymentMethod::NetBanking] {
            assert_eq!(policy.advance_percentage(method), 25);
        }
    }
}
