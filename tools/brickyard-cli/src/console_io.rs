//! Terminal stand-ins for the browser-side collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use brickyard_checkout::collaborators::{
    Navigator, Notice, Notifier, PaymentOutcome, PaymentRequest, PaymentWidget,
};
use brickyard_checkout::{GatewayError, Route};

use crate::output::Output;

/// Prints redirects and remembers the last one.
pub struct ConsoleNavigator {
    output: Output,
    last: Mutex<Option<Route>>,
}

impl ConsoleNavigator {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            last: Mutex::new(None),
        }
    }

    pub fn last(&self) -> Option<Route> {
        self.last.lock().ok().and_then(|r| r.clone())
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        self.output.debug(&format!("Redirect to {}", route));
        if let Ok(mut last) = self.last.lock() {
            *last = Some(route);
        }
    }
}

/// Prints notices as status lines.
pub struct ConsoleNotifier {
    output: Output,
}

impl ConsoleNotifier {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        self.output.notice(&notice);
    }
}

/// Payment widget for a terminal: shows the hand-off and reports an outcome.
///
/// There is no card form here, so the session ends as cancelled unless the
/// caller has already collected the advance out of band.
pub struct ConsoleWidget {
    output: Output,
    key: String,
    assume_paid: bool,
}

impl ConsoleWidget {
    pub fn new(output: Output, key: impl Into<String>, assume_paid: bool) -> Self {
        Self {
            output,
            key: key.into(),
            assume_paid,
        }
    }
}

#[async_trait]
impl PaymentWidget for ConsoleWidget {
    async fn load(&self) -> Result<(), GatewayError> {
        if self.key.trim().is_empty() {
            return Err(GatewayError::LoadFailed(
                "gateway.key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
        self.output.header(&format!("Pay {}", request.merchant_name));
        self.output.kv("Order", request.order_id.as_str());
        self.output.kv("Amount", &request.amount.display());
        self.output.kv("Method", request.method.display_name());
        self.output.kv("Description", &request.description);
        if !request.prefill.contact.is_empty() {
            self.output.kv("Contact", &request.prefill.contact);
        }

        if self.assume_paid {
            let payment_id = format!("pay_cli_{}", request.order_id);
            info!(order_id = %request.order_id, %payment_id, "advance marked as paid");
            PaymentOutcome::Success { payment_id }
        } else {
            PaymentOutcome::Cancelled
        }
    }
}
