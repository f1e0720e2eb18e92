//! Payment step: choose a method and fill its sub-form.

use serde::Serialize;

use brickyard_commerce::payment::{CardForm, NetBankingForm, PaymentForm, UpiForm};
use brickyard_commerce::{CommerceError, PaymentMethod, PaymentSelection};

use crate::error::CheckoutError;

/// One row of the method picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodOption {
    pub method: PaymentMethod,
    pub label: &'static str,
    pub available: bool,
}

/// Collects the payment method for the payment step.
#[derive(Debug, Clone, Default)]
pub struct PaymentSelector {
    method: Option<PaymentMethod>,
    form: PaymentForm,
}

impl PaymentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every method in display order, unavailable ones included.
    pub fn options() -> Vec<MethodOption> {
        PaymentMethod::ALL
            .iter()
            .map(|m| MethodOption {
                method: *m,
                label: m.display_name(),
                available: m.is_available(),
            })
            .collect()
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn select(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if !method.is_available() {
            return Err(CommerceError::PaymentMethodUnavailable(method.as_str().to_string()).into());
        }
        self.method = Some(method);
        Ok(())
    }

    pub fn card_mut(&mut self) -> &mut CardForm {
        &mut self.form.card
    }

    pub fn upi_mut(&mut self) -> &mut UpiForm {
        &mut self.form.upi
    }

    pub fn netbanking_mut(&mut self) -> &mut NetBankingForm {
        &mut self.form.netbanking
    }

    /// Validate the selected method's sub-form only.
    pub fn submit(&self) -> Result<PaymentSelection, CheckoutError> {
        let method = self.method.ok_or(CheckoutError::MissingStepData(
            crate::step::CheckoutStep::Payment,
        ))?;
        Ok(self.form.validate(method)?)
    }

    /// Preselect a method chosen earlier, e.g. after going back.
    ///
    /// Sub-form contents are not restored; card details in particular are
    /// never kept after submission.
    pub fn restore(&mut self, selection: &PaymentSelection) {
        self.method = Some(selection.method);
    }
}
