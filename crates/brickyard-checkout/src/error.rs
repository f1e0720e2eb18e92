//! Checkout error types.

use brickyard_commerce::{CommerceError, FieldErrors};
use brickyard_data::FetchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::route::Route;
use crate::step::CheckoutStep;

/// Account check the marketplace demands before it accepts an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Phone,
    Email,
}

impl VerificationKind {
    /// Parse the `verificationType` value of an API error body.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phone" => Some(VerificationKind::Phone),
            "email" => Some(VerificationKind::Email),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerificationKind::Phone => "phone number",
            VerificationKind::Email => "email address",
        }
    }

    /// Page where the shopper completes this verification.
    pub fn route(&self) -> Route {
        match self {
            VerificationKind::Phone => Route::VerifyPhone,
            VerificationKind::Email => Route::VerifyEmail,
        }
    }
}

/// Failure reported by a remote collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// User-facing message.
    pub message: String,
    /// Set when the server refused because the account needs verification.
    pub verification: Option<VerificationKind>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            verification: None,
        }
    }

    /// A failure before any response arrived.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            verification: None,
        }
    }

    pub fn with_verification(mut self, kind: VerificationKind) -> Self {
        self.verification = Some(kind);
        self
    }

    pub fn requires_verification(&self) -> bool {
        self.verification.is_some()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout(_) => {
                ApiError::transport("The server took too long to respond. Please try again.")
            }
            FetchError::Connection(_) => {
                ApiError::transport("Could not reach the server. Check your connection.")
            }
            FetchError::HttpError { status, body } => ApiError::new(status, body),
            other => ApiError::transport(other.to_string()),
        }
    }
}

/// Payment widget failures that are not a payment outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Payment widget failed to load: {0}")]
    LoadFailed(String),

    #[error("A payment is already in progress")]
    Busy,

    #[error("This order has already been paid")]
    AlreadyPaid,

    #[error("No order is waiting for payment")]
    NoOrder,
}

/// Errors surfaced by the checkout controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    /// Form input failed validation; the session is unchanged.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error("Complete the {} step first", .0.as_str())]
    MissingStepData(CheckoutStep),

    #[error("Your order is already being placed")]
    AlreadyProcessing,

    #[error("Cannot move from {} to {}", from.as_str(), to.as_str())]
    InvalidTransition { from: CheckoutStep, to: CheckoutStep },

    #[error("This order has already been placed")]
    OrderAlreadyCreated,

    #[error("{field} is filled from your location and cannot be edited")]
    ReadOnlyField { field: &'static str },

    #[error("Checkout is not available: redirect to {0}")]
    EntryRefused(Route),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The account must be verified; the shopper has been redirected.
    #[error("Please verify your {} to continue", .0.label())]
    Verification(VerificationKind),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Per-field messages when this is a form validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CheckoutError::Commerce(e) => e.field_errors(),
            _ => None,
        }
    }

    /// Failures the shopper can fix on the current step and resubmit.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CheckoutError::EntryRefused(_)
                | CheckoutError::Verification(_)
                | CheckoutError::OrderAlreadyCreated
        )
    }
}
