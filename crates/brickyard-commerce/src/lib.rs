//! Marketplace domain types for Brickyard checkout.
//!
//! This crate provides the types checkout works with:
//!
//! - **Money**: INR amounts in paise with half-up rupee rounding
//! - **Cart**: the shopper's cart and the read-only snapshot checkout prices
//! - **Address**: delivery addresses and new-address validation
//! - **Payment**: payment methods and per-method sub-form validation
//! - **Pricing**: delivery fee, tax and advance payment rules
//! - **Order**: the order-creation request and the server's order summary
//!
//! # Example
//!
//! ```rust
//! use brickyard_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! cart.add_item(ProductId::new("cement-53"), "OPC 53 Cement", 10, Money::inr(500))
//!     .unwrap();
//!
//! let policy = PricingPolicy::default();
//! let pricing = policy.price_cart(&cart.snapshot()).unwrap();
//! assert_eq!(pricing.total, Money::inr(6400));
//!
//! let advance = policy.advance(&pricing, PaymentMethod::Upi).unwrap();
//! assert_eq!(advance.due_now, Money::inr(1600));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod address;
pub mod cart;
pub mod order;
pub mod payment;
pub mod pricing;

pub use error::{CommerceError, FieldErrors};
pub use ids::*;
pub use money::{Currency, Money};

pub use address::ShippingAddress;
pub use cart::CartSnapshot;
pub use order::{CreatedOrder, OrderRequest};
pub use payment::{PaymentMethod, PaymentSelection};
pub use pricing::PricingPolicy;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, FieldErrors};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::address::{
        sample_saved_addresses, AddressForm, AddressType, SavedAddress, ShippingAddress,
    };
    pub use crate::cart::{Cart, CartItem, CartSnapshot};
    pub use crate::order::{
        CreatedOrder, OrderPayment, OrderPricingSummary, OrderRequest, PaymentStatus,
    };
    pub use crate::payment::{
        CardForm, NetBankingForm, PaymentDetails, PaymentForm, PaymentMethod, PaymentSelection,
        UpiForm, SUPPORTED_BANKS,
    };
    pub use crate::pricing::{AdvanceBreakdown, OrderPricing, PricingPolicy};
}
