//! Checkout session state.

use serde::{Deserialize, Serialize};

use brickyard_commerce::pricing::{AdvanceBreakdown, OrderPricing};
use brickyard_commerce::{CheckoutId, CreatedOrder, ShippingAddress, PaymentSelection};

use crate::step::CheckoutStep;

/// Everything the wizard has collected so far.
///
/// Owned by the controller and discarded when checkout ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutId,
    pub current_step: CheckoutStep,
    /// Set when the shipping step is submitted.
    pub shipping_data: Option<ShippingAddress>,
    /// Set when the payment step is submitted.
    pub payment_data: Option<PaymentSelection>,
    /// Set once the marketplace has created the order.
    pub order_created: Option<CreatedOrder>,
    /// Cart pricing at the moment the order was placed.
    pub order_pricing: Option<OrderPricing>,
    /// Advance split fixed when the order was placed.
    pub order_advance: Option<AdvanceBreakdown>,
    /// Order placement in flight.
    pub is_processing: bool,
    /// Message for the last failed action, cleared by the next success.
    pub last_error: Option<String>,
    /// Sent with every order-creation attempt of this session.
    pub idempotency_key: String,
}

impl CheckoutSession {
    pub fn new() -> Self {
        let id = CheckoutId::generate();
        let idempotency_key = format!("chk_{}", id);
        Self {
            id,
            current_step: CheckoutStep::Shipping,
            shipping_data: None,
            payment_data: None,
            order_created: None,
            order_pricing: None,
            order_advance: None,
            is_processing: false,
            last_error: None,
            idempotency_key,
        }
    }

    /// Whether the wizard may move back from its current step.
    pub fn can_go_back(&self) -> bool {
        self.order_created.is_none()
            && !self.is_processing
            && self.current_step.previous().is_some()
    }

    /// Move back to `step`, dropping what was collected after it.
    ///
    /// Going back to shipping clears the payment selection; going back to
    /// payment keeps the address.
    pub(crate) fn rewind_to(&mut self, step: CheckoutStep) {
        if step <= CheckoutStep::Shipping {
            self.payment_data = None;
        }
        self.current_step = step;
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Progress through the wizard, 25 per completed step.
    pub fn progress_percent(&self) -> u8 {
        let done = self.current_step.number() - 1;
        done * 25
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}
