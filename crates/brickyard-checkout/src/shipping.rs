//! Shipping step: pick a saved address or fill in a new one.

use tracing::{debug, info};

use brickyard_commerce::address::{sample_saved_addresses, AddressForm, AddressType, SavedAddress};
use brickyard_commerce::{AddressId, CommerceError, ShippingAddress};

use crate::collaborators::{GeoPoint, Locality, LocationLookup};
use crate::error::CheckoutError;

/// Editable fields of the new-address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    FullName,
    Phone,
    Address,
    City,
    State,
    Pincode,
}

impl AddressField {
    /// Key used in per-field validation errors.
    pub fn key(&self) -> &'static str {
        match self {
            AddressField::FullName => "fullName",
            AddressField::Phone => "phone",
            AddressField::Address => "address",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::Pincode => "pincode",
        }
    }

    /// Fields filled from the shopper's location.
    pub fn is_location_field(&self) -> bool {
        matches!(
            self,
            AddressField::City | AddressField::State | AddressField::Pincode
        )
    }
}

/// Collects the delivery address for the shipping step.
#[derive(Debug, Clone)]
pub struct ShippingCollector {
    saved: Vec<SavedAddress>,
    selected: Option<AddressId>,
    form: AddressForm,
    location_filled: bool,
}

impl ShippingCollector {
    /// Start with `saved` on offer, preselecting the default one.
    pub fn new(saved: Vec<SavedAddress>) -> Self {
        let selected = saved
            .iter()
            .find(|a| a.is_default)
            .or_else(|| saved.first())
            .map(|a| a.id.clone());
        Self {
            saved,
            selected,
            form: AddressForm::default(),
            location_filled: false,
        }
    }

    /// Collector offering the built-in address book.
    pub fn with_sample_addresses() -> Self {
        Self::new(sample_saved_addresses())
    }

    pub fn saved_addresses(&self) -> &[SavedAddress] {
        &self.saved
    }

    /// The saved address currently chosen, if the shopper is not entering a new one.
    pub fn selected(&self) -> Option<&SavedAddress> {
        let id = self.selected.as_ref()?;
        self.saved.iter().find(|a| &a.id == id)
    }

    pub fn is_new_address(&self) -> bool {
        self.selected.is_none()
    }

    pub fn select_saved(&mut self, id: &AddressId) -> Result<(), CheckoutError> {
        if !self.saved.iter().any(|a| &a.id == id) {
            return Err(CommerceError::AddressNotFound(id.to_string()).into());
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Switch to the new-address form.
    pub fn use_new_address(&mut self) {
        self.selected = None;
    }

    pub fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Whether a field currently holds a location-filled value.
    pub fn is_read_only(&self, field: AddressField) -> bool {
        self.location_filled && field.is_location_field()
    }

    /// Set one field of the new-address form.
    pub fn set_field(
        &mut self,
        field: AddressField,
        value: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        if self.is_read_only(field) {
            return Err(CheckoutError::ReadOnlyField { field: field.key() });
        }
        let value = value.into();
        match field {
            AddressField::FullName => self.form.full_name = value,
            AddressField::Phone => self.form.phone = value,
            AddressField::Address => self.form.address = value,
            AddressField::City => self.form.city = value,
            AddressField::State => self.form.state = value,
            AddressField::Pincode => self.form.pincode = value,
        }
        self.selected = None;
        Ok(())
    }

    pub fn set_address_type(&mut self, address_type: AddressType) {
        self.form.address_type = address_type;
    }

    /// Replace the whole form, e.g. from a scripted run.
    ///
    /// Location-filled fields keep their values.
    pub fn fill_form(&mut self, form: AddressForm) {
        let (city, state, pincode) = (
            self.form.city.clone(),
            self.form.state.clone(),
            self.form.pincode.clone(),
        );
        self.form = form;
        if self.location_filled {
            self.form.city = city;
            self.form.state = state;
            self.form.pincode = pincode;
        }
        self.selected = None;
    }

    /// Fill city, state and pincode from a map point and lock them.
    pub async fn autofill_from_location(
        &mut self,
        lookup: &dyn LocationLookup,
        point: GeoPoint,
    ) -> Result<Locality, CheckoutError> {
        debug!(lat = point.latitude, lng = point.longitude, "resolving location");
        let locality = lookup.resolve(point).await?;

        self.form.city = locality.city.clone();
        self.form.state = locality.state.clone();
        self.form.pincode = locality.pincode.clone();
        self.location_filled = true;
        self.selected = None;

        info!(city = %locality.city, pincode = %locality.pincode, "address filled from location");
        Ok(locality)
    }

    /// Unlock location-filled fields and empty them.
    pub fn clear_location(&mut self) {
        if self.location_filled {
            self.form.city.clear();
            self.form.state.clear();
            self.form.pincode.clear();
            self.location_filled = false;
        }
    }

    /// The address to deliver to, validating the form when it is in use.
    pub fn submit(&self) -> Result<ShippingAddress, CheckoutError> {
        match self.selected() {
            Some(saved) => Ok(saved.address.clone()),
            None => Ok(self.form.validate()?),
        }
    }

    /// Load an already-chosen address back into the form for editing.
    pub fn restore(&mut self, address: &ShippingAddress) {
        if let Some(saved) = self.saved.iter().find(|a| &a.address == address) {
            self.selected = Some(saved.id.clone());
        } else {
            self.form = AddressForm::from(address);
            self.location_filled = false;
            self.selected = None;
        }
    }
}

impl Default for ShippingCollector {
    fn default() -> Self {
        Self::with_sample_addresses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;

    struct FixedLookup;

    #[async_trait]
    impl LocationLookup for FixedLookup {
        async fn resolve(&self, _point: GeoPoint) -> Result<Locality, ApiError> {
            Ok(Locality {
                city: "Pune".into(),
                state: "Maharashtra".into(),
                pincode: "411001".into(),
            })
        }
    }

    fn fill_valid(collector: &mut ShippingCollector) {
        collector.set_field(AddressField::FullName, "Asha Patil").unwrap();
        collector.set_field(AddressField::Phone, "9123456780").unwrap();
        collector
            .set_field(AddressField::Address, "Flat 4, Shivaji Nagar Road")
            .unwrap();
    }

    #[test]
    fn test_default_saved_address_preselected() {
        let collector = ShippingCollector::with_sample_addresses();
        let selected = collector.selected().unwrap();
        assert!(selected.is_default);
        assert_eq!(collector.submit().unwrap(), selected.address);
    }

    #[test]
    fn test_select_unknown_saved_address() {
        let mut collector = ShippingCollector::with_sample_addresses();
        let err = collector.select_saved(&AddressId::new("nope")).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Commerce(CommerceError::AddressNotFound(_))
        ));
    }

    #[test]
    fn test_new_address_reports_every_bad_field() {
        let mut collector = ShippingCollector::new(Vec::new());
        collector.set_field(AddressField::FullName, "A").unwrap();
        collector.set_field(AddressField::Phone, "12345").unwrap();
        collector.set_field(AddressField::Pincode, "4110").unwrap();

        let err = collector.submit().unwrap_err();
        let fields = err.field_errors().unwrap();
        for key in ["fullName", "phone", "address", "city", "state", "pincode"] {
            assert!(fields.has(key), "missing error for {key}");
        }
    }

    #[tokio::test]
    async fn test_location_fill_locks_fields() {
        let mut collector = ShippingCollector::new(Vec::new());
        fill_valid(&mut collector);

        collector
            .autofill_from_location(&FixedLookup, GeoPoint::new(18.52, 73.85))
            .await
            .unwrap();

        assert!(collector.is_read_only(AddressField::City));
        assert!(!collector.is_read_only(AddressField::Phone));
        let err = collector.set_field(AddressField::Pincode, "000000").unwrap_err();
        assert_eq!(err, CheckoutError::ReadOnlyField { field: "pincode" });

        let address = collector.submit().unwrap();
        assert_eq!(address.city, "Pune");
        assert_eq!(address.pincode, "411001");

        collector.clear_location();
        assert!(collector.form().city.is_empty());
        collector.set_field(AddressField::City, "Nashik").unwrap();
    }

    #[tokio::test]
    async fn test_fill_form_keeps_location_fields() {
        let mut collector = ShippingCollector::new(Vec::new());
        collector
            .autofill_from_location(&FixedLookup, GeoPoint::new(18.52, 73.85))
            .await
            .unwrap();

        collector.fill_form(AddressForm {
            city: "Mumbai".into(),
            ..AddressForm::default()
        });
        assert_eq!(collector.form().city, "Pune");
    }

    #[test]
    fn test_editing_form_deselects_saved_address() {
        let mut collector = ShippingCollector::with_sample_addresses();
        fill_valid(&mut collector);
        assert!(collector.is_new_address());
    }
}
