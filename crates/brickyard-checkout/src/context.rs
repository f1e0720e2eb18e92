//! Collaborator bundle handed to the controller.

use std::sync::Arc;

use crate::collaborators::{
    AuthContext, CartContext, LocationLookup, Navigator, Notifier, OrdersApi, PaymentWidget,
    UsersApi,
};

/// Shared handles to everything checkout talks to.
#[derive(Clone)]
pub struct CheckoutContext {
    pub cart: Arc<dyn CartContext>,
    pub auth: Arc<dyn AuthContext>,
    pub users: Arc<dyn UsersApi>,
    pub orders: Arc<dyn OrdersApi>,
    pub widget: Arc<dyn PaymentWidget>,
    pub location: Arc<dyn LocationLookup>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CheckoutContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutContext").finish_non_exhaustive()
    }
}
