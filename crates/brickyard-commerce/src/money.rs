//! Money type for representing monetary values.
//!
//! Amounts are stored as integers in the smallest unit of the currency
//! (paise for INR) so pricing never touches floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Number of minor units in one major unit (100 paise per rupee).
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit (paise).
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create an INR amount from whole rupees.
    ///
    /// ```
    /// use brickyard_commerce::money::Money;
    /// assert_eq!(Money::inr(500).amount_minor, 50_000);
    /// ```
    pub fn inr(rupees: i64) -> Self {
        Self::from_major(rupees, Currency::INR)
    }

    /// Create a value from whole major units.
    pub fn from_major(major: i64, currency: Currency) -> Self {
        Self::new(major.saturating_mul(currency.minor_per_major()), currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Whole major units, truncated toward zero.
    pub fn major_units(&self) -> i64 {
        self.amount_minor / self.currency.minor_per_major()
    }

    /// Format as a display string (e.g., "₹6400.00").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format without symbol (e.g., "6400.00").
    pub fn display_amount(&self) -> String {
        let per = self.currency.minor_per_major();
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        let places = self.currency.decimal_places() as usize;
        format!(
            "{}{}.{:0places$}",
            sign,
            abs / per as u64,
            abs % per as u64
        )
    }

    /// Try to add another Money value, returning None on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by an integer factor.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// `percent`% of this amount, rounded half up to a whole major unit.
    ///
    /// Integer arithmetic throughout, so `837 * 18%` is exactly 150.66 and
    /// rounds to 151 while `12.5` style halves always go up.
    ///
    /// ```
    /// use brickyard_commerce::money::Money;
    /// assert_eq!(Money::inr(837).percentage_rounded(18), Some(Money::inr(151)));
    /// ```
    pub fn percentage_rounded(&self, percent: i64) -> Option<Money> {
        // amount_minor * percent is the result in hundredths of a minor unit.
        let scaled = self.amount_minor.checked_mul(percent)?;
        let unit = self.currency.minor_per_major().checked_mul(100)?;
        let half = unit / 2;
        let major = if scaled >= 0 {
            scaled.checked_add(half)? / unit
        } else {
            -(scaled.checked_neg()?.checked_add(half)? / unit)
        };
        Some(Money::from_major(major, self.currency))
    }

    /// Sum an iterator of Money values, returning None on overflow or mismatch.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Clamp negative values to zero.
    pub fn non_negative(&self) -> Money {
        if self.amount_minor < 0 {
            Money::zero(self.currency)
        } else {
            *self
        }
    }
}

/// Saturating addition in the left-hand currency. Use `try_add` when currencies may differ.
impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(
            self.amount_minor.saturating_add(other.amount_minor),
            self.currency,
        )
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(
            self.amount_minor.saturating_sub(other.amount_minor),
            self.currency,
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Serde adapter for REST payloads that carry INR amounts as plain rupee numbers.
///
/// Use with `#[serde(with = "brickyard_commerce::money::rupees")]`.
pub mod rupees {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        let per = money.currency.minor_per_major();
        if money.amount_minor % per == 0 {
            serializer.serialize_i64(money.amount_minor / per)
        } else {
            serializer.serialize_f64(money.amount_minor as f64 / per as f64)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(serde::de::Error::custom("amount must be a finite number"));
        }
        let per = Currency::INR.minor_per_major() as f64;
        Ok(Money::new((value * per).round() as i64, Currency::INR))
    }
}

/// Like [`rupees`] for optional fields.
pub mod rupees_opt {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error> {
        match money {
            Some(m) => super::rupees::serialize(m, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Money>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::rupees")] Money);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(m)| m))
    }
}
