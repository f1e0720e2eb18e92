//! Interfaces to the systems checkout coordinates.
//!
//! Checkout owns none of these. Each collaborator is injected behind an
//! `Arc<dyn Trait>` so the controller can run against the live marketplace
//! API, an in-memory stand-in, or a test double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use brickyard_commerce::cart::CartSnapshot;
use brickyard_commerce::{
    AddressId, CreatedOrder, Currency, Money, OrderId, OrderRequest, PaymentMethod,
    ShippingAddress, UserId,
};

use crate::error::{ApiError, GatewayError};
use crate::route::Route;

/// The shopper's cart. Checkout reads it and clears it once an order settles.
#[async_trait]
pub trait CartContext: Send + Sync {
    async fn snapshot(&self) -> CartSnapshot;

    async fn total(&self) -> Money {
        self.snapshot().await.subtotal()
    }

    async fn clear_cart(&self);
}

/// The signed-in shopper, as checkout needs to see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub phone_verified: bool,
    pub is_active: bool,
}

#[async_trait]
pub trait AuthContext: Send + Sync {
    async fn current_user(&self) -> Option<CurrentUser>;
}

/// A delivery address the marketplace has stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddressRecord {
    pub id: AddressId,
    pub address: ShippingAddress,
}

#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Persist a delivery address on the shopper's account.
    async fn add_address(&self, address: &ShippingAddress) -> Result<SavedAddressRecord, ApiError>;
}

#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Create an order. Requests sharing an idempotency key create at most one order.
    async fn checkout(
        &self,
        request: &OrderRequest,
        idempotency_key: &str,
    ) -> Result<CreatedOrder, ApiError>;
}

/// Customer details the widget pre-fills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the payment widget needs to collect the advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub key: String,
    pub order_id: OrderId,
    /// Amount to charge now.
    pub amount: Money,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub merchant_name: String,
    pub description: String,
    pub prefill: Prefill,
}

/// How a widget session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success { payment_id: String },
    Failed { reason: String },
    /// The shopper closed the widget without paying.
    Cancelled,
}

/// Third-party payment widget.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    /// Load the widget SDK. Safe to call more than once.
    async fn load(&self) -> Result<(), GatewayError>;

    /// Show the widget and wait until the shopper finishes with it.
    async fn open(&self, request: PaymentRequest) -> PaymentOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Administrative area a point falls in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn resolve(&self, point: GeoPoint) -> Result<Locality, ApiError>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A toast-style message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
