//! Hand-off to the payment widget for the advance payment.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::collaborators::{Notice, PaymentOutcome, PaymentRequest};
use crate::context::CheckoutContext;
use crate::error::{CheckoutError, GatewayError};
use crate::route::Route;

/// Where the widget session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffState {
    #[default]
    Idle,
    Processing,
    Success,
    Failed,
}

/// Drives one order's payment widget session.
///
/// `Idle -> Processing -> Success | Failed`; a cancelled widget returns to
/// `Idle`. A failed payment may be attempted again.
#[derive(Debug, Default)]
pub struct GatewayHandoff {
    state: Mutex<HandoffState>,
}

impl GatewayHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HandoffState {
        self.state.lock().map(|s| *s).unwrap_or(HandoffState::Failed)
    }

    fn set(&self, next: HandoffState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// Move to `Processing`, refusing when a session is open or already paid.
    fn begin(&self) -> Result<(), GatewayError> {
        let mut state = self.state.lock().map_err(|_| GatewayError::Busy)?;
        match *state {
            HandoffState::Processing => Err(GatewayError::Busy),
            HandoffState::Success => Err(GatewayError::AlreadyPaid),
            HandoffState::Idle | HandoffState::Failed => {
                *state = HandoffState::Processing;
                Ok(())
            }
        }
    }

    /// Load the widget, open it and act on the outcome.
    #[instrument(skip_all, fields(order_id = %request.order_id, amount = %request.amount))]
    pub async fn run(
        &self,
        ctx: &CheckoutContext,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, CheckoutError> {
        self.begin()?;

        if let Err(e) = ctx.widget.load().await {
            error!(error = %e, "payment widget unavailable");
            self.set(HandoffState::Idle);
            ctx.notifier.notify(Notice::error(e.to_string()));
            return Err(e.into());
        }

        let order_id = request.order_id.clone();
        let outcome = ctx.widget.open(request).await;

        match &outcome {
            PaymentOutcome::Success { payment_id } => {
                info!(%payment_id, "advance payment succeeded");
                self.set(HandoffState::Success);
                ctx.cart.clear_cart().await;
                ctx.notifier
                    .notify(Notice::success("Payment successful! Your order is confirmed."));
                ctx.navigator.navigate(Route::PaymentSuccess(order_id));
            }
            PaymentOutcome::Failed { reason } => {
                warn!(%reason, "advance payment failed");
                self.set(HandoffState::Failed);
                ctx.notifier
                    .notify(Notice::error(format!("Payment failed: {}", reason)));
                ctx.navigator.navigate(Route::PaymentFailure(order_id));
            }
            PaymentOutcome::Cancelled => {
                info!("payment widget closed without paying");
                self.set(HandoffState::Idle);
                ctx.notifier.notify(Notice::info(
                    "Payment cancelled. You can complete it from your order page.",
                ));
                ctx.navigator.navigate(Route::OrderDetails(order_id));
            }
        }

        Ok(outcome)
    }
}
