//! Payment methods and their sub-form validation.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, FieldErrors};

static UPI_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{2,256}@[A-Za-z]{2,64}$").expect("valid UPI pattern"));

static CARD_EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("valid expiry pattern"));

/// Banks offered for net banking, as `(code, display name)`.
pub const SUPPORTED_BANKS: &[(&str, &str)] = &[
    ("sbi", "State Bank of India"),
    ("hdfc", "HDFC Bank"),
    ("icici", "ICICI Bank"),
    ("axis", "Axis Bank"),
    ("kotak", "Kotak Mahindra Bank"),
    ("pnb", "Punjab National Bank"),
    ("bob", "Bank of Baroda"),
];

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    Card,
    Upi,
    #[serde(rename = "netbanking")]
    NetBanking,
    /// Listed but not yet accepted.
    Wallet,
}

impl PaymentMethod {
    /// Every method in display order, including unavailable ones.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cod,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::NetBanking,
        PaymentMethod::Wallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::NetBanking => "netbanking",
            PaymentMethod::Wallet => "wallet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery",
            PaymentMethod::Card => "Credit / Debit Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::NetBanking => "Net Banking",
            PaymentMethod::Wallet => "Wallet",
        }
    }

    /// Whether the method can be selected.
    pub fn is_available(&self) -> bool {
        !matches!(self, PaymentMethod::Wallet)
    }

    /// Online methods collect an advance through the payment gateway.
    pub fn is_online(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "netbanking" => Ok(PaymentMethod::NetBanking),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(CommerceError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Raw card sub-form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardForm {
    pub number: String,
    pub holder_name: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
}

impl CardForm {
    /// Validate and reduce to what checkout keeps: last four digits, holder, expiry.
    pub fn validate(&self) -> Result<PaymentDetails, CommerceError> {
        let mut errors = FieldErrors::new();

        let digits: String = self
            .number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.add("card.number", "Card number must be 13 to 19 digits");
        }

        let holder = self.holder_name.trim();
        if holder.is_empty() {
            errors.add("card.holderName", "Cardholder name is required");
        }

        let expiry = self.expiry.trim();
        if !CARD_EXPIRY.is_match(expiry) {
            errors.add("card.expiry", "Expiry must be in MM/YY format");
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.add("card.cvv", "CVV must be 3 or 4 digits");
        }

        errors.into_result()?;

        Ok(PaymentDetails::Card {
            last4: digits[digits.len() - 4..].to_string(),
            holder_name: holder.to_string(),
            expiry: expiry.to_string(),
        })
    }
}

/// Raw UPI sub-form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiForm {
    pub upi_id: String,
}

impl UpiForm {
    pub fn validate(&self) -> Result<PaymentDetails, CommerceError> {
        let vpa = self.upi_id.trim();
        if !UPI_ID.is_match(vpa) {
            let mut errors = FieldErrors::new();
            errors.add("upi.upiId", "Enter a valid UPI ID (e.g. name@bank)");
            return Err(CommerceError::Validation(errors));
        }
        Ok(PaymentDetails::Upi {
            upi_id: vpa.to_string(),
        })
    }
}

/// Raw net banking sub-form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBankingForm {
    /// Bank code from [`SUPPORTED_BANKS`].
    pub bank: String,
}

impl NetBankingForm {
    pub fn validate(&self) -> Result<PaymentDetails, CommerceError> {
        let code = self.bank.trim().to_lowercase();
        match SUPPORTED_BANKS.iter().find(|(c, _)| *c == code) {
            Some((code, _)) => Ok(PaymentDetails::NetBanking {
                bank: code.to_string(),
            }),
            None => {
                let mut errors = FieldErrors::new();
                errors.add("netbanking.bank", "Select your bank");
                Err(CommerceError::Validation(errors))
            }
        }
    }
}

/// All payment sub-forms. Only the selected method's form is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub card: CardForm,
    #[serde(default)]
    pub upi: UpiForm,
    #[serde(default)]
    pub netbanking: NetBankingForm,
}

impl PaymentForm {
    /// Validate the sub-form for `method` and produce the selection.
    ///
    /// Fields of other methods are ignored even when populated.
    pub fn validate(&self, method: PaymentMethod) -> Result<PaymentSelection, CommerceError> {
        let details = match method {
            PaymentMethod::Cod => PaymentDetails::Cod,
            PaymentMethod::Card => self.card.validate()?,
            PaymentMethod::Upi => self.upi.validate()?,
            PaymentMethod::NetBanking => self.netbanking.validate()?,
            PaymentMethod::Wallet => {
                return Err(CommerceError::PaymentMethodUnavailable(
                    method.as_str().to_string(),
                ))
            }
        };

        Ok(PaymentSelection { method, details })
    }
}

/// Validated, method-specific details kept in the checkout session.
///
/// Full card numbers and CVVs are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaymentDetails {
    Cod,
    Card {
        last4: String,
        holder_name: String,
        expiry: String,
    },
    Upi {
        upi_id: String,
    },
    #[serde(rename = "netbanking")]
    NetBanking {
        bank: String,
    },
}

impl PaymentDetails {
    /// Short description for review screens, e.g. "Card ending 4242".
    pub fn summary(&self) -> String {
        match self {
            PaymentDetails::Cod => "Pay in cash on delivery".to_string(),
            PaymentDetails::Card { last4, .. } => format!("Card ending {}", last4),
            PaymentDetails::Upi { upi_id } => format!("UPI {}", upi_id),
            PaymentDetails::NetBanking { bank } => {
                let name = SUPPORTED_BANKS
                    .iter()
                    .find(|(code, _)| code == bank)
                    .map(|(_, name)| *name)
                    .unwrap_or(bank.as_str());
                format!("Net banking via {}", name)
            }
        }
    }
}

/// Output of the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethod,
    pub details: PaymentDetails,
}

impl PaymentSelection {
    pub fn cod() -> Self {
        Self {
            method: PaymentMethod::Cod,
            details: PaymentDetails::Cod,
        }
    }
}
