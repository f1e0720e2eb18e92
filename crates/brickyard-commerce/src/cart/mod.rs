//! Shopping cart module.
//!
//! Contains the mutable cart and the read-only snapshot checkout works from.

mod cart;
mod snapshot;

pub use cart::{Cart, MAX_QUANTITY_PER_ITEM};
pub use snapshot::{CartItem, CartSnapshot};
