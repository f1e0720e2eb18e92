//! Navigation targets checkout can send the shopper to.

use std::fmt;

use brickyard_commerce::OrderId;
use serde::{Deserialize, Serialize};

/// A page outside the checkout wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "page", content = "orderId", rename_all = "kebab-case")]
pub enum Route {
    Login,
    Cart,
    VerifyPhone,
    VerifyEmail,
    OrderConfirmation(OrderId),
    PaymentSuccess(OrderId),
    PaymentFailure(OrderId),
    OrderDetails(OrderId),
}

impl Route {
    /// URL path of the page.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Cart => "/cart".to_string(),
            Route::VerifyPhone => "/auth/verify-phone".to_string(),
            Route::VerifyEmail => "/auth/verify-email".to_string(),
            Route::OrderConfirmation(id) => format!("/order-confirmation/{}", id),
            Route::PaymentSuccess(id) => format!("/payment/success/{}", id),
            Route::PaymentFailure(id) => format!("/payment/failure/{}", id),
            Route::OrderDetails(id) => format!("/orders/{}", id),
        }
    }

    /// The order this page is about, if any.
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Route::OrderConfirmation(id)
            | Route::PaymentSuccess(id)
            | Route::PaymentFailure(id)
            | Route::OrderDetails(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
