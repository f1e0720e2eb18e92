//! Order submission: persist the address, then create the order.

use tracing::{info, instrument, warn};

use brickyard_commerce::{
    AddressId, CreatedOrder, OrderRequest, PaymentSelection, PricingPolicy, ShippingAddress,
};

use crate::collaborators::Notice;
use crate::config::AddressMode;
use crate::context::CheckoutContext;
use crate::error::{ApiError, CheckoutError};

/// Runs the remote calls behind "Place Order".
///
/// Calls are strictly sequential: the address is saved before the order is
/// created. Nothing here retries; the HTTP client's transport retry is the
/// only automatic one.
pub struct OrderSequencer<'a> {
    ctx: &'a CheckoutContext,
    policy: &'a PricingPolicy,
    mode: AddressMode,
    notes: Option<&'a str>,
}

impl<'a> OrderSequencer<'a> {
    pub fn new(
        ctx: &'a CheckoutContext,
        policy: &'a PricingPolicy,
        mode: AddressMode,
        notes: Option<&'a str>,
    ) -> Self {
        Self {
            ctx,
            policy,
            mode,
            notes,
        }
    }

    /// The order-creation body for this selection.
    ///
    /// `address_id` is used when present; otherwise the address travels inline.
    pub fn build_request(
        &self,
        shipping: &ShippingAddress,
        payment: &PaymentSelection,
        address_id: Option<AddressId>,
    ) -> OrderRequest {
        let delivery_address = match address_id {
            Some(_) => None,
            None => Some(shipping.clone()),
        };
        OrderRequest {
            delivery_address_id: address_id,
            delivery_address,
            payment_method: payment.method,
            advance_percentage: self.policy.advance_percentage(payment.method),
            notes: self
                .notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }

    /// Save the address (separate mode) and create the order.
    ///
    /// A verification demand from either call sends the shopper to the
    /// verification page and is returned as [`CheckoutError::Verification`].
    #[instrument(skip_all, fields(method = %payment.method, mode = ?self.mode))]
    pub async fn submit(
        &self,
        shipping: &ShippingAddress,
        payment: &PaymentSelection,
        idempotency_key: &str,
    ) -> Result<CreatedOrder, CheckoutError> {
        let address_id = match self.mode {
            AddressMode::Separate => {
                let saved = self
                    .ctx
                    .users
                    .add_address(shipping)
                    .await
                    .map_err(|e| self.remote_failure("address save", e))?;
                info!(address_id = %saved.id, "delivery address saved");
                Some(saved.id)
            }
            AddressMode::Inline => None,
        };

        let request = self.build_request(shipping, payment, address_id);
        let order = self
            .ctx
            .orders
            .checkout(&request, idempotency_key)
            .await
            .map_err(|e| self.remote_failure("order creation", e))?;

        info!(
            order_id = %order.order_id,
            advance_percentage = request.advance_percentage,
            "order created"
        );
        Ok(order)
    }

    fn remote_failure(&self, call: &'static str, error: ApiError) -> CheckoutError {
        match error.verification {
            Some(kind) => {
                warn!(call, verification = ?kind, "account verification required");
                self.ctx.notifier.notify(Notice::info(format!(
                    "Please verify your {} to place orders",
                    kind.label()
                )));
                self.ctx.navigator.navigate(kind.route());
                CheckoutError::Verification(kind)
            }
            None => {
                warn!(call, status = ?error.status, error = %error, "remote call failed");
                CheckoutError::Api(error)
            }
        }
    }
}
