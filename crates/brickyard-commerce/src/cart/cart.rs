//! The shopper's cart.

use crate::cart::{CartItem, CartSnapshot};
use crate::error::CommerceError;
use crate::ids::{CartId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Largest quantity of one product a cart may hold.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A cart of building materials, one line per product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: Option<UserId>,
    /// Lines in the order the products were first added.
    pub items: Vec<CartItem>,
    /// Coupon discount on the whole cart.
    pub discount: Money,
    pub currency: Currency,
    /// Unix timestamp of the last change.
    pub updated_at: i64,
}

impl Cart {
    pub fn new() -> Self {
        Self {
            id: CartId::generate(),
            user_id: None,
            items: Vec::new(),
            discount: Money::zero(Currency::INR),
            currency: Currency::INR,
            updated_at: now(),
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::new()
        }
    }

    /// Add `quantity` of a product. A product already in the cart gets the
    /// quantity added to its line; the line keeps its original price.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        self.check_currency(&unit_price)?;

        let existing = self.items.iter().position(|i| i.product_id == product_id);
        let current = existing.map(|idx| self.items[idx].quantity).unwrap_or(0);
        let total = current
            .checked_add(quantity)
            .ok_or(CommerceError::Overflow)?;
        let total = within_limit(total)?;
        unit_price
            .try_multiply(total)
            .ok_or(CommerceError::Overflow)?;

        match existing {
            Some(idx) => self.items[idx].quantity = total,
            None => self.items.push(CartItem {
                product_id,
                name: name.into(),
                quantity: total,
                unit_price,
            }),
        }
        self.touch();
        Ok(())
    }

    /// Set a product's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), CommerceError> {
        let idx = self
            .items
            .iter()
            .position(|i| &i.product_id == product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;

        match quantity {
            q if q < 0 => return Err(CommerceError::InvalidQuantity(q)),
            0 => {
                self.items.remove(idx);
            }
            q => self.items[idx].quantity = within_limit(q)?,
        }
        self.touch();
        Ok(())
    }

    /// Apply a coupon discount, replacing any earlier one.
    pub fn set_discount(&mut self, discount: Money) -> Result<(), CommerceError> {
        self.check_currency(&discount)?;
        self.discount = discount.non_negative();
        self.touch();
        Ok(())
    }

    /// Empty the cart after a settled order.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = Money::zero(self.currency);
        self.touch();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only copy handed to checkout.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            discount: self.discount,
            currency: self.currency,
        }
    }

    fn check_currency(&self, amount: &Money) -> Result<(), CommerceError> {
        if amount.currency == self.currency {
            return Ok(());
        }
        Err(CommerceError::CurrencyMismatch {
            expected: self.currency.code().to_string(),
            got: amount.currency.code().to_string(),
        })
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn within_limit(quantity: i64) -> Result<i64, CommerceError> {
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(CommerceError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_ITEM,
        ));
    }
    Ok(quantity)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cement() -> (ProductId, &'static str, Money) {
        (ProductId::new("prod-cement"), "OPC 53 Cement (50kg)", Money::inr(420))
    }

    #[test]
    fn test_new_cart_is_empty_inr() {
        let cart = Cart::for_user(UserId::new("u-1"));
        assert!(cart.is_empty());
        assert_eq!(cart.currency, Currency::INR);
        assert_eq!(cart.user_id, Some(UserId::new("u-1")));
    }

    #[test]
    fn test_adding_again_merges_lines() {
        let mut cart = Cart::new();
        let (id, name, price) = cement();
        cart.add_item(id.clone(), name, 10, price).unwrap();
        cart.add_item(id, name, 5, Money::inr(999)).unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item_count(), 15);
        assert_eq!(snapshot.subtotal(), Money::inr(6300));
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        let (id, name, price) = cement();
        cart.add_item(id.clone(), name, 1, price).unwrap();

        cart.set_quantity(&id, 4).unwrap();
        assert_eq!(cart.items[0].quantity, 4);

        cart.set_quantity(&id, 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.set_quantity(&id, 2),
            Err(CommerceError::ItemNotInCart(_))
        ));
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        let (id, name, price) = cement();
        assert_eq!(
            cart.add_item(id.clone(), name, 0, price),
            Err(CommerceError::InvalidQuantity(0))
        );
        cart.add_item(id.clone(), name, MAX_QUANTITY_PER_ITEM, price).unwrap();
        assert!(matches!(
            cart.add_item(id, name, 1, price),
            Err(CommerceError::QuantityExceedsLimit(_, _))
        ));
        assert_eq!(cart.items[0].quantity, MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn test_rejects_foreign_currency() {
        let mut cart = Cart::new();
        let result = cart.add_item(
            ProductId::new("p"),
            "Imported tile",
            1,
            Money::from_major(10, Currency::USD),
        );
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let mut cart = Cart::new();
        cart.add_item(ProductId::new("tmt"), "TMT Bar 12mm", 20, Money::inr(600))
            .unwrap();
        cart.set_discount(Money::inr(200)).unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.subtotal(), Money::inr(12_000));
        assert_eq!(snapshot.discount, Money::inr(200));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.discount.is_zero());
        assert_eq!(snapshot.items.len(), 1);
    }
}
