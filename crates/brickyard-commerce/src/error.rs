//! Commerce error types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field validation messages, keyed by form field name.
///
/// Forms report every failing field at once so the UI can mark them inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field. The first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Get the message for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Check whether a field failed.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise a validation error carrying these fields.
    pub fn into_result(self) -> Result<(), CommerceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// One or more form fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Payment method is listed but cannot be used.
    #[error("Payment method unavailable: {0}")]
    PaymentMethodUnavailable(String),

    /// Unknown payment method code.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Saved address not found.
    #[error("Saved address not found: {0}")]
    AddressNotFound(String),
}

impl CommerceError {
    /// Field errors when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CommerceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
