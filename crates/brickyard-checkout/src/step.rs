//! Wizard steps and their static descriptors.

use serde::{Deserialize, Serialize};

/// Steps in the checkout wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Delivery address.
    Shipping,
    /// Payment method selection.
    Payment,
    /// Order review and placement.
    Review,
    /// Advance payment through the gateway widget.
    PaymentGateway,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
        CheckoutStep::PaymentGateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::PaymentGateway => "payment_gateway",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Review => 3,
            CheckoutStep::PaymentGateway => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn descriptor(&self) -> StepDescriptor {
        let (title, description) = match self {
            CheckoutStep::Shipping => ("Shipping", "Where should we deliver?"),
            CheckoutStep::Payment => ("Payment", "Choose how you want to pay"),
            CheckoutStep::Review => ("Review", "Check your order before placing it"),
            CheckoutStep::PaymentGateway => ("Pay Advance", "Complete the advance payment"),
        };
        StepDescriptor {
            step: *self,
            number: self.number(),
            title,
            description,
        }
    }
}

/// Static progress-indicator entry for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    pub step: CheckoutStep,
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
}

/// The four wizard steps in order.
pub fn steps() -> [StepDescriptor; 4] {
    CheckoutStep::ALL.map(|s| s.descriptor())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_numbered_in_order() {
        let numbers: Vec<u8> = steps().iter().map(|d| d.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(steps()[2].title, "Review");
    }

    #[test]
    fn test_next_and_previous() {
        assert_eq!(CheckoutStep::Shipping.next(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::PaymentGateway.next(), None);
        assert_eq!(CheckoutStep::Shipping.previous(), None);
        assert_eq!(CheckoutStep::Review.previous(), Some(CheckoutStep::Payment));
        assert!(CheckoutStep::Shipping < CheckoutStep::Review);
    }
}
