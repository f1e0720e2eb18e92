//! In-process collaborators for local runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use brickyard_commerce::cart::{Cart, CartSnapshot};

use crate::collaborators::{
    AuthContext, CartContext, CurrentUser, GeoPoint, Locality, LocationLookup, Navigator, Notice,
    Notifier,
};
use crate::error::ApiError;
use crate::route::Route;

/// A cart held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    cart: RwLock<Cart>,
}

impl InMemoryCart {
    pub fn new(cart: Cart) -> Self {
        Self {
            cart: RwLock::new(cart),
        }
    }

    /// Run `f` against the cart with write access.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.cart.write().await;
        f(&mut cart)
    }
}

#[async_trait]
impl CartContext for InMemoryCart {
    async fn snapshot(&self) -> CartSnapshot {
        self.cart.read().await.snapshot()
    }

    async fn clear_cart(&self) {
        self.cart.write().await.clear();
    }
}

/// Auth context with a fixed signed-in user, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<CurrentUser>,
}

impl StaticAuth {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl AuthContext for StaticAuth {
    async fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}

/// Location lookup for environments without a geocoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationLookup;

#[async_trait]
impl LocationLookup for NoLocationLookup {
    async fn resolve(&self, _point: GeoPoint) -> Result<Locality, ApiError> {
        Err(ApiError::transport(
            "Location lookup is not available. Enter your city, state and pincode.",
        ))
    }
}

/// Navigator that remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

/// Notifier that keeps every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
