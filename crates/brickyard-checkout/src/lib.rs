//! Checkout orchestration for the Brickyard construction materials marketplace.
//!
//! Checkout is a four-step wizard:
//!
//! 1. **Shipping**: pick a saved address or fill in a new one ([`ShippingCollector`])
//! 2. **Payment**: choose cash on delivery, card, UPI or net banking ([`PaymentSelector`])
//! 3. **Review**: save the address and create the order ([`OrderSequencer`])
//! 4. **Payment gateway**: collect the online advance ([`GatewayHandoff`])
//!
//! [`CheckoutController`] owns the session and advances it. Everything
//! checkout talks to (cart, auth, the marketplace API, the payment widget,
//! navigation and notices) is a trait in [`collaborators`], bundled into a
//! [`CheckoutContext`].
//!
//! # Example
//!
//! ```rust,ignore
//! use brickyard_checkout::prelude::*;
//!
//! let controller = CheckoutController::enter(ctx, CheckoutSettings::default()).await?;
//!
//! let shipping = ShippingCollector::with_sample_addresses();
//! controller.submit_shipping(&shipping)?;
//!
//! let mut payment = PaymentSelector::new();
//! payment.select(PaymentMethod::Upi)?;
//! payment.upi_mut().upi_id = "ravi@okaxis".into();
//! controller.submit_payment(&payment)?;
//!
//! match controller.place_order().await? {
//!     PlaceOrderOutcome::Confirmed(order) => println!("COD order {}", order.order_id),
//!     PlaceOrderOutcome::AwaitingPayment(_) => {
//!         controller.pay().await?;
//!     }
//! }
//! ```

pub mod api;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod payment;
pub mod route;
pub mod sequencer;
pub mod session;
pub mod shipping;
pub mod step;
pub mod telemetry;

pub use config::{AddressMode, CheckoutConfig};
pub use context::CheckoutContext;
pub use controller::{CheckoutController, CheckoutSettings, OrderReview, PlaceOrderOutcome};
pub use error::{ApiError, CheckoutError, GatewayError, VerificationKind};
pub use gateway::{GatewayHandoff, HandoffState};
pub use payment::PaymentSelector;
pub use route::Route;
pub use sequencer::OrderSequencer;
pub use session::CheckoutSession;
pub use shipping::{AddressField, ShippingCollector};
pub use step::{steps, CheckoutStep, StepDescriptor};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::collaborators::{
        AuthContext, CartContext, CurrentUser, GeoPoint, Locality, LocationLookup, Navigator,
        Notice, NoticeLevel, Notifier, OrdersApi, PaymentOutcome, PaymentRequest, PaymentWidget,
        SavedAddressRecord, UsersApi,
    };
    pub use crate::{
        AddressField, AddressMode, ApiError, CheckoutConfig, CheckoutContext, CheckoutController,
        CheckoutError, CheckoutSettings, CheckoutStep, GatewayError, HandoffState,
        PaymentSelector, PlaceOrderOutcome, Route, ShippingCollector, VerificationKind,
    };
    pub use brickyard_commerce::{CreatedOrder, Money, OrderRequest, PaymentMethod};
}
