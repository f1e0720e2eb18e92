//! Order creation request and the server's order summary.
//!
//! The order itself is owned by the marketplace API; checkout only builds
//! the creation request and reads back what it needs.

use serde::{Deserialize, Serialize};

use crate::address::ShippingAddress;
use crate::ids::{AddressId, OrderId};
use crate::money::{self, Money};
use crate::payment::PaymentMethod;

/// Body of the order-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Previously persisted delivery address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address_id: Option<AddressId>,
    /// Inline delivery address, used instead of a persisted one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub advance_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payment state of an order as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    AdvancePaid,
    Paid,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::AdvancePaid => "advance_paid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

/// Payment sub-record of a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayment {
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    pub advance_percentage: u8,
    /// Amount to collect now, when the server computed it.
    #[serde(default, with = "money::rupees_opt", skip_serializing_if = "Option::is_none")]
    pub advance_amount: Option<Money>,
    #[serde(default, with = "money::rupees_opt", skip_serializing_if = "Option::is_none")]
    pub remaining_amount: Option<Money>,
}

/// Server-side pricing of a created order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricingSummary {
    #[serde(with = "money::rupees")]
    pub subtotal: Money,
    #[serde(with = "money::rupees")]
    pub delivery_fee: Money,
    #[serde(with = "money::rupees")]
    pub tax: Money,
    #[serde(with = "money::rupees")]
    pub total: Money,
}

/// What checkout keeps after a successful order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    /// Human-facing order number, e.g. "BY-2024-000123".
    pub order_id: OrderId,
    pub payment: OrderPayment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<OrderPricingSummary>,
}

impl CreatedOrder {
    /// Amount the payment widget should collect, preferring the server's figure.
    pub fn amount_due_now(&self, computed: Money) -> Money {
        self.payment.advance_amount.unwrap_or(computed)
    }

    /// Order total, preferring the server's figure.
    pub fn total(&self, computed: Money) -> Money {
        self.pricing.map(|p| p.total).unwrap_or(computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = OrderRequest {
            delivery_address_id: Some(AddressId::new("a1")),
            delivery_address: None,
            payment_method: PaymentMethod::Upi,
            advance_percentage: 25,
            notes: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "deliveryAddressId": "a1",
                "paymentMethod": "upi",
                "advancePercentage": 25
            })
        );
    }

    #[test]
    fn test_created_order_from_server_json() {
        let order: CreatedOrder = serde_json::from_value(serde_json::json!({
            "orderId": "BY-1001",
            "payment": {
                "method": "upi",
                "status": "pending",
                "advancePercentage": 25,
                "advanceAmount": 1600,
                "remainingAmount": 4800
            },
            "pricing": {"subtotal": 5000, "deliveryFee": 500, "tax": 900, "total": 6400}
        }))
        .unwrap();

        assert_eq!(order.order_id.as_str(), "BY-1001");
        assert_eq!(order.amount_due_now(Money::inr(1)), Money::inr(1600));
        assert_eq!(order.total(Money::inr(1)), Money::inr(6400));
    }

    #[test]
    fn test_created_order_tolerates_sparse_payload() {
        let order: CreatedOrder = serde_json::from_value(serde_json::json!({
            "orderId": "BY-1002",
            "payment": {"method": "cod", "status": "cash_collected", "advancePercentage": 100}
        }))
        .unwrap();

        assert_eq!(order.payment.status, PaymentStatus::Unknown);
        assert_eq!(order.amount_due_now(Money::inr(99)), Money::inr(99));
        assert!(order.pricing.is_none());
    }
}
