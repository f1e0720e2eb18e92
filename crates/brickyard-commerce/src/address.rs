//! Delivery address types and new-address validation.

use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, FieldErrors};
use crate::ids::AddressId;

/// Kind of delivery location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    /// Construction site.
    Site,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Work => "work",
            AddressType::Site => "site",
            AddressType::Other => "other",
        }
    }
}

/// A validated delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    /// Ten digit mobile number.
    pub phone: String,
    /// Street address, building, landmark.
    pub address: String,
    pub city: String,
    pub state: String,
    /// Six digit PIN code.
    pub pincode: String,
    #[serde(default)]
    pub address_type: AddressType,
}

impl ShippingAddress {
    /// Format as single line.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.address, self.city, self.state, self.pincode
        )
    }

    /// Format as multi-line.
    pub fn multi_line(&self) -> String {
        [
            self.full_name.clone(),
            self.address.clone(),
            format!("{}, {} {}", self.city, self.state, self.pincode),
            format!("Phone: {}", self.phone),
        ]
        .join("\n")
    }
}

/// Raw new-address form input, as typed by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub address_type: AddressType,
}

impl AddressForm {
    /// Validate every field and return the trimmed address.
    ///
    /// All failing fields are reported together.
    pub fn validate(&self) -> Result<ShippingAddress, CommerceError> {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.add("fullName", "Full name is required");
        } else if full_name.chars().count() < 2 {
            errors.add("fullName", "Full name must be at least 2 characters");
        }

        let phone = self.phone.trim();
        if !is_digits(phone, 10) {
            errors.add("phone", "Phone number must be exactly 10 digits");
        }

        let address = self.address.trim();
        if address.chars().count() < 10 {
            errors.add("address", "Address must be at least 10 characters");
        }

        let city = self.city.trim();
        if city.is_empty() {
            errors.add("city", "City is required");
        }

        let state = self.state.trim();
        if state.is_empty() {
            errors.add("state", "State is required");
        }

        let pincode = self.pincode.trim();
        if !is_digits(pincode, 6) {
            errors.add("pincode", "Pincode must be exactly 6 digits");
        }

        errors.into_result()?;

        Ok(ShippingAddress {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            pincode: pincode.to_string(),
            address_type: self.address_type,
        })
    }
}

impl From<&ShippingAddress> for AddressForm {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            address: address.address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            address_type: address.address_type,
        }
    }
}

/// An address the shopper saved earlier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedAddress {
    pub id: AddressId,
    /// Short label, e.g. "Home" or "Whitefield site".
    pub label: String,
    pub address: ShippingAddress,
    #[serde(default)]
    pub is_default: bool,
}

/// Static saved-address list offered on the shipping step.
pub fn sample_saved_addresses() -> Vec<SavedAddress> {
    vec![
        SavedAddress {
            id: AddressId::new("saved-home"),
            label: "Home".to_string(),
            address: ShippingAddress {
                full_name: "Ravi Kumar".to_string(),
                phone: "9876543210".to_string(),
                address: "42, 3rd Cross, Indiranagar 2nd Stage".to_string(),
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560038".to_string(),
                address_type: AddressType::Home,
            },
            is_default: true,
        },
        SavedAddress {
            id: AddressId::new("saved-site"),
            label: "Whitefield site".to_string(),
            address: ShippingAddress {
                full_name: "Ravi Kumar".to_string(),
                phone: "9876543210".to_string(),
                address: "Plot 17, EPIP Zone, near ITPL Main Road".to_string(),
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560066".to_string(),
                address_type: AddressType::Site,
            },
            is_default: false,
        },
    ]
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
