use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use brickyard_checkout::collaborators::{
    CurrentUser, NoticeLevel, OrdersApi, PaymentOutcome, PaymentRequest, PaymentWidget,
    SavedAddressRecord, UsersApi,
};
use brickyard_checkout::memory::{
    InMemoryCart, NoLocationLookup, RecordingNavigator, RecordingNotifier, StaticAuth,
};
use brickyard_checkout::prelude::*;
use brickyard_commerce::address::AddressForm;
use brickyard_commerce::order::{OrderPayment, PaymentStatus};
use brickyard_commerce::cart::Cart;
use brickyard_commerce::{AddressId, Money, OrderId, ProductId, ShippingAddress, UserId};

// Test doubles

#[derive(Default)]
struct FakeUsers {
    calls: AtomicUsize,
    failures: Mutex<Vec<ApiError>>,
    delay: Duration,
}

impl FakeUsers {
    fn failing_once(error: ApiError) -> Self {
        Self {
            failures: Mutex::new(vec![error]),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsersApi for FakeUsers {
    async fn add_address(&self, address: &ShippingAddress) -> Result<SavedAddressRecord, ApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.failures.lock().unwrap().pop() {
            return Err(error);
        }
        Ok(SavedAddressRecord {
            id: AddressId::new(format!("addr-{}", n + 1)),
            address: address.clone(),
        })
    }
}

#[derive(Default)]
struct FakeOrders {
    requests: Mutex<Vec<(OrderRequest, String)>>,
    failures: Mutex<Vec<ApiError>>,
}

impl FakeOrders {
    fn failing_once(error: ApiError) -> Self {
        Self {
            failures: Mutex::new(vec![error]),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<(OrderRequest, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrdersApi for FakeOrders {
    async fn checkout(
        &self,
        request: &OrderRequest,
        idempotency_key: &str,
    ) -> Result<CreatedOrder, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), idempotency_key.to_string()));
        if let Some(error) = self.failures.lock().unwrap().pop() {
            return Err(error);
        }
        Ok(CreatedOrder {
            order_id: OrderId::new("BY-1001"),
            payment: OrderPayment {
                method: request.payment_method,
                status: PaymentStatus::Pending,
                advance_percentage: request.advance_percentage,
                advance_amount: None,
                remaining_amount: None,
            },
            pricing: None,
        })
    }
}

struct FakeWidget {
    outcome: PaymentOutcome,
    load_error: Option<GatewayError>,
    opened: Mutex<Vec<PaymentRequest>>,
}

impl FakeWidget {
    fn returning(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            load_error: None,
            opened: Mutex::new(Vec::new()),
        }
    }

    fn broken() -> Self {
        Self {
            outcome: PaymentOutcome::Cancelled,
            load_error: Some(GatewayError::LoadFailed("script blocked".into())),
            opened: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentWidget for FakeWidget {
    async fn load(&self) -> Result<(), GatewayError> {
        match &self.load_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
        self.opened.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

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

// Harness

fn shopper() -> CurrentUser {
    CurrentUser {
        id: UserId::new("u-42"),
        name: "Ravi Kumar".into(),
        email: "ravi@example.com".into(),
        phone: "9876543210".into(),
        phone_verified: true,
        is_active: true,
    }
}

fn cart_worth(rupees: i64) -> Cart {
    let mut cart = Cart::new();
    if rupees > 0 {
        cart.add_item(ProductId::new("cement-53"), "OPC 53 Cement", 1, Money::inr(rupees))
            .unwrap();
    }
    cart
}

struct Harness {
    cart: Arc<InMemoryCart>,
    users: Arc<FakeUsers>,
    orders: Arc<FakeOrders>,
    widget: Arc<FakeWidget>,
    location: Arc<dyn LocationLookup>,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
    auth: StaticAuth,
}

impl Harness {
    fn new(cart_rupees: i64) -> Self {
        Self {
            cart: Arc::new(InMemoryCart::new(cart_worth(cart_rupees))),
            users: Arc::new(FakeUsers::default()),
            orders: Arc::new(FakeOrders::default()),
            widget: Arc::new(FakeWidget::returning(PaymentOutcome::Success {
                payment_id: "pay_1".into(),
            })),
            location: Arc::new(NoLocationLookup),
            navigator: Arc::new(RecordingNavigator::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            auth: StaticAuth::signed_in(shopper()),
        }
    }

    fn with_users(mut self, users: FakeUsers) -> Self {
        self.users = Arc::new(users);
        self
    }

    fn with_orders(mut self, orders: FakeOrders) -> Self {
        self.orders = Arc::new(orders);
        self
    }

    fn with_widget(mut self, widget: FakeWidget) -> Self {
        self.widget = Arc::new(widget);
        self
    }

    fn with_location(mut self, location: impl LocationLookup + 'static) -> Self {
        self.location = Arc::new(location);
        self
    }

    fn with_auth(mut self, auth: StaticAuth) -> Self {
        self.auth = auth;
        self
    }

    fn context(&self) -> CheckoutContext {
        CheckoutContext {
            cart: self.cart.clone(),
            auth: Arc::new(self.auth.clone()),
            users: self.users.clone(),
            orders: self.orders.clone(),
            widget: self.widget.clone(),
            location: self.location.clone(),
            navigator: self.navigator.clone(),
            notifier: self.notifier.clone(),
        }
    }

    async fn enter(&self) -> CheckoutController {
        self.enter_with(CheckoutSettings::default()).await
    }

    async fn enter_with(&self, settings: CheckoutSettings) -> CheckoutController {
        CheckoutController::enter(self.context(), settings)
            .await
            .expect("checkout should open")
    }

    fn error_notices(&self) -> usize {
        self.notifier
            .notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count()
    }
}

fn new_address_collector() -> ShippingCollector {
    let mut collector = ShippingCollector::new(Vec::new());
    collector.fill_form(AddressForm {
        full_name: "Ravi Kumar".into(),
        phone: "9876543210".into(),
        address: "Plot 17, EPIP Zone, Whitefield".into(),
        city: "Bengaluru".into(),
        state: "Karnataka".into(),
        pincode: "560066".into(),
        ..AddressForm::default()
    });
    collector
}

fn selector_for(method: PaymentMethod) -> PaymentSelector {
    let mut selector = PaymentSelector::new();
    selector.select(method).unwrap();
    selector.upi_mut().upi_id = "ravi@okaxis".into();
    selector.netbanking_mut().bank = "hdfc".into();
    let card = selector.card_mut();
    card.number = "4111 1111 1111 4242".into();
    card.holder_name = "Ravi Kumar".into();
    card.expiry = "12/29".into();
    card.cvv = "123".into();
    selector
}

async fn at_review(harness: &Harness, method: PaymentMethod) -> CheckoutController {
    let controller = harness.enter().await;
    controller.submit_shipping(&new_address_collector()).unwrap();
    controller.submit_payment(&selector_for(method)).unwrap();
    controller
}

// Entry gate

#[tokio::test]
async fn test_entry_requires_sign_in() {
    let harness = Harness::new(1000).with_auth(StaticAuth::anonymous());
    let err = CheckoutController::enter(harness.context(), CheckoutSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err, CheckoutError::EntryRefused(Route::Login));
    assert_eq!(harness.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_entry_requires_verified_account() {
    let mut user = shopper();
    user.phone_verified = false;
    let harness = Harness::new(1000).with_auth(StaticAuth::signed_in(user));
    let err = CheckoutController::enter(harness.context(), CheckoutSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err, CheckoutError::EntryRefused(Route::VerifyPhone));

    let mut user = shopper();
    user.is_active = false;
    let harness = Harness::new(1000).with_auth(StaticAuth::signed_in(user));
    let err = CheckoutController::enter(harness.context(), CheckoutSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err, CheckoutError::EntryRefused(Route::VerifyEmail));
    assert_eq!(harness.navigator.last().unwrap().path(), "/auth/verify-email");
}

#[tokio::test]
async fn test_entry_requires_items() {
    let harness = Harness::new(0);
    let err = CheckoutController::enter(harness.context(), CheckoutSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err, CheckoutError::EntryRefused(Route::Cart));
}

// Step controller

#[tokio::test]
async fn test_each_valid_submission_advances_one_step() {
    let harness = Harness::new(5000);
    let controller = harness.enter().await;
    assert_eq!(controller.current_step(), CheckoutStep::Shipping);
    assert_eq!(controller.steps().len(), 4);

    let step = controller
        .submit_shipping(&ShippingCollector::with_sample_addresses())
        .unwrap();
    assert_eq!(step, CheckoutStep::Payment);
    assert_eq!(step.number(), 2);

    let step = controller
        .submit_payment(&selector_for(PaymentMethod::Cod))
        .unwrap();
    assert_eq!(step, CheckoutStep::Review);
    assert_eq!(controller.session().progress_percent(), 50);

    // Resubmitting an earlier step without going back is not a transition.
    let err = controller
        .submit_shipping(&ShippingCollector::with_sample_addresses())
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
    assert_eq!(controller.current_step(), CheckoutStep::Review);
}

#[tokio::test]
async fn test_invalid_address_keeps_step() {
    let harness = Harness::new(5000);
    let controller = harness.enter().await;

    let mut collector = ShippingCollector::new(Vec::new());
    collector
        .set_field(AddressField::Phone, "98765")
        .unwrap();
    let err = controller.submit_shipping(&collector).unwrap_err();

    let fields = err.field_errors().unwrap();
    assert!(fields.has("phone"));
    assert!(fields.has("fullName"));
    assert_eq!(controller.current_step(), CheckoutStep::Shipping);
    assert!(controller.session().shipping_data.is_none());
}

#[tokio::test]
async fn test_wallet_cannot_be_submitted() {
    let harness = Harness::new(5000);
    let controller = harness.enter().await;
    controller
        .submit_shipping(&ShippingCollector::with_sample_addresses())
        .unwrap();

    let mut selector = PaymentSelector::new();
    assert!(selector.select(PaymentMethod::Wallet).is_err());
    assert!(controller.submit_payment(&selector).is_err());
    assert_eq!(controller.current_step(), CheckoutStep::Payment);
}

#[tokio::test]
async fn test_going_back_invalidates_downstream_data() {
    let harness = Harness::new(5000);
    let controller = at_review(&harness, PaymentMethod::Upi).await;

    assert_eq!(controller.go_back().unwrap(), CheckoutStep::Payment);
    let session = controller.session();
    assert!(session.shipping_data.is_some());
    assert!(session.payment_data.is_some());

    controller.edit_step(CheckoutStep::Shipping).unwrap();
    let session = controller.session();
    assert_eq!(session.current_step, CheckoutStep::Shipping);
    assert!(session.shipping_data.is_some());
    assert!(session.payment_data.is_none());

    let mut collector = ShippingCollector::with_sample_addresses();
    let mut selector = PaymentSelector::new();
    controller.restore_components(&mut collector, &mut selector);
    assert!(collector.is_new_address());
    assert_eq!(collector.form().pincode, "560066");
    assert_eq!(selector.method(), None);

    assert!(controller.go_back().is_err());
    assert!(controller.edit_step(CheckoutStep::Review).is_err());
}

// Location

#[tokio::test]
async fn test_location_fills_and_locks_address_fields() {
    let harness = Harness::new(5000).with_location(FixedLookup);
    let controller = harness.enter().await;

    let mut collector = new_address_collector();
    let locality = controller
        .autofill_location(&mut collector, GeoPoint::new(18.52, 73.85))
        .await
        .unwrap();
    assert_eq!(locality.city, "Pune");
    assert!(collector.is_read_only(AddressField::Pincode));
    assert_eq!(
        collector.set_field(AddressField::City, "Nashik").unwrap_err(),
        CheckoutError::ReadOnlyField { field: "city" }
    );

    controller.submit_shipping(&collector).unwrap();
    let address = controller.session().shipping_data.unwrap();
    assert_eq!(address.city, "Pune");
    assert_eq!(address.pincode, "411001");

    // Past the shipping step the form is no longer editable.
    let mut late = new_address_collector();
    assert!(matches!(
        controller
            .autofill_location(&mut late, GeoPoint::new(18.52, 73.85))
            .await,
        Err(CheckoutError::InvalidTransition { .. })
    ));
    assert_eq!(late.form().city, "Bengaluru");
}

#[tokio::test]
async fn test_location_unavailable_keeps_form_editable() {
    let harness = Harness::new(5000);
    let controller = harness.enter().await;

    let mut collector = new_address_collector();
    let err = controller
        .autofill_location(&mut collector, GeoPoint::new(12.97, 77.59))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Api(_)));
    assert!(!collector.is_read_only(AddressField::City));
    assert_eq!(collector.form().city, "Bengaluru");
    assert_eq!(harness.error_notices(), 1);
}

// Pricing

#[tokio::test]
async fn test_cod_review_for_twelve_thousand() {
    let harness = Harness::new(12_000);
    let controller = at_review(&harness, PaymentMethod::Cod).await;

    let review = controller.review().await.unwrap();
    assert_eq!(review.pricing.delivery_fee, Money::inr(0));
    assert_eq!(review.pricing.tax, Money::inr(2160));
    assert_eq!(review.pricing.total, Money::inr(14_160));
    assert_eq!(review.advance.percentage, 100);
    assert_eq!(review.advance.due_on_delivery, Money::inr(14_160));
}

#[tokio::test]
async fn test_upi_review_for_five_thousand() {
    let harness = Harness::new(5000);
    let controller = at_review(&harness, PaymentMethod::Upi).await;

    let review = controller.review().await.unwrap();
    assert_eq!(review.pricing.delivery_fee, Money::inr(500));
    assert_eq!(review.pricing.tax, Money::inr(900));
    assert_eq!(review.pricing.total, Money::inr(6400));
    assert_eq!(review.advance.percentage, 25);
    assert_eq!(review.advance.due_now, Money::inr(1600));
}

#[tokio::test]
async fn test_delivery_threshold_boundary() {
    let at = Harness::new(10_000).enter().await.pricing().await.unwrap();
    assert_eq!(at.delivery_fee, Money::inr(500));

    let above = Harness::new(10_001).enter().await.pricing().await.unwrap();
    assert_eq!(above.delivery_fee, Money::inr(0));
}

// Order submission

#[tokio::test]
async fn test_cod_order_clears_cart_and_confirms() {
    let harness = Harness::new(12_000);
    let controller = at_review(&harness, PaymentMethod::Cod).await;
    let key = controller.session().idempotency_key;

    let outcome = controller.place_order().await.unwrap();
    assert!(matches!(outcome, PlaceOrderOutcome::Confirmed(_)));

    assert!(harness.cart.snapshot().await.is_empty());
    assert_eq!(
        harness.navigator.last(),
        Some(Route::OrderConfirmation(OrderId::new("BY-1001")))
    );

    let requests = harness.orders.requests();
    assert_eq!(requests.len(), 1);
    let (request, sent_key) = &requests[0];
    assert_eq!(request.advance_percentage, 100);
    assert_eq!(request.payment_method, PaymentMethod::Cod);
    assert_eq!(request.delivery_address_id, Some(AddressId::new("addr-1")));
    assert!(request.delivery_address.is_none());
    assert_eq!(sent_key, &key);
    assert_eq!(harness.users.calls(), 1);

    let session = controller.session();
    assert!(!session.is_processing);
    assert!(session.order_created.is_some());
    assert!(matches!(
        controller.place_order().await,
        Err(CheckoutError::OrderAlreadyCreated)
    ));
}

#[tokio::test]
async fn test_online_order_keeps_cart_until_paid() {
    let harness = Harness::new(5000);
    let controller = at_review(&harness, PaymentMethod::Upi).await;

    let outcome = controller.place_order().await.unwrap();
    assert!(matches!(outcome, PlaceOrderOutcome::AwaitingPayment(_)));
    assert_eq!(controller.current_step(), CheckoutStep::PaymentGateway);
    assert_eq!(harness.cart.total().await, Money::inr(5000));
    assert_eq!(harness.orders.requests()[0].0.advance_percentage, 25);
    assert!(harness.navigator.routes().is_empty());

    // The order exists now; the wizard cannot be rewound.
    assert_eq!(controller.go_back(), Err(CheckoutError::OrderAlreadyCreated));

    let request = controller.payment_request().await.unwrap();
    assert_eq!(request.amount, Money::inr(1600));
    assert_eq!(request.order_id, OrderId::new("BY-1001"));
    assert_eq!(request.prefill.contact, "9876543210");

    let outcome = controller.pay().await.unwrap();
    assert!(matches!(outcome, PaymentOutcome::Success { .. }));
    assert_eq!(controller.handoff_state(), HandoffState::Success);
    assert!(harness.cart.snapshot().await.is_empty());
    assert_eq!(
        harness.navigator.last(),
        Some(Route::PaymentSuccess(OrderId::new("BY-1001")))
    );

    assert!(matches!(
        controller.pay().await,
        Err(CheckoutError::Gateway(GatewayError::AlreadyPaid))
    ));
}

#[tokio::test]
async fn test_missing_payment_blocks_without_network() {
    let harness = Harness::new(5000);
    let controller = harness.enter().await;
    controller
        .submit_shipping(&ShippingCollector::with_sample_addresses())
        .unwrap();

    let err = controller.place_order().await.unwrap_err();
    assert_eq!(err, CheckoutError::MissingStepData(CheckoutStep::Payment));
    assert_eq!(harness.users.calls(), 0);
    assert!(harness.orders.requests().is_empty());

    let session = controller.session();
    assert!(session.last_error.is_some());
    assert!(!session.is_processing);
    assert_eq!(harness.error_notices(), 1);
}

#[tokio::test]
async fn test_failed_address_save_stays_on_review() {
    let harness = Harness::new(5000)
        .with_users(FakeUsers::failing_once(ApiError::new(500, "Could not save address")));
    let controller = at_review(&harness, PaymentMethod::Cod).await;

    let err = controller.place_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Api(_)));

    let session = controller.session();
    assert_eq!(session.current_step, CheckoutStep::Review);
    assert!(!session.is_processing);
    assert_eq!(session.last_error.as_deref(), Some("Could not save address"));
    assert!(harness.orders.requests().is_empty());
    assert!(!harness.cart.snapshot().await.is_empty());

    // Manual retry goes through.
    controller.place_order().await.unwrap();
    assert_eq!(harness.users.calls(), 2);
    assert!(controller.session().last_error.is_none());
}

#[tokio::test]
async fn test_failed_order_reuses_idempotency_key() {
    let harness =
        Harness::new(5000).with_orders(FakeOrders::failing_once(ApiError::transport("timeout")));
    let controller = at_review(&harness, PaymentMethod::Cod).await;

    assert!(controller.place_order().await.is_err());
    assert_eq!(controller.current_step(), CheckoutStep::Review);
    controller.place_order().await.unwrap();

    let requests = harness.orders.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1, requests[1].1);
}

#[tokio::test]
async fn test_verification_required_redirects() {
    for (kind, route) in [
        (VerificationKind::Phone, Route::VerifyPhone),
        (VerificationKind::Email, Route::VerifyEmail),
    ] {
        let harness = Harness::new(5000).with_orders(FakeOrders::failing_once(
            ApiError::new(403, "Verification required").with_verification(kind),
        ));
        let controller = at_review(&harness, PaymentMethod::Upi).await;

        let err = controller.place_order().await.unwrap_err();
        assert_eq!(err, CheckoutError::Verification(kind));
        assert_eq!(harness.navigator.last(), Some(route));
        assert_eq!(harness.error_notices(), 0);

        let session = controller.session();
        assert!(session.last_error.is_none());
        assert!(!session.is_processing);
        assert!(session.order_created.is_none());
    }
}

#[tokio::test]
async fn test_inline_address_mode_skips_address_save() {
    let harness = Harness::new(5000);
    let mut config = CheckoutConfig::default();
    config.checkout.address_mode = AddressMode::Inline;
    config.checkout.notes = Some("Unload at gate 2".into());

    let controller = harness.enter_with(CheckoutSettings::from(&config)).await;
    controller.submit_shipping(&new_address_collector()).unwrap();
    controller
        .submit_payment(&selector_for(PaymentMethod::Cod))
        .unwrap();
    controller.place_order().await.unwrap();

    assert_eq!(harness.users.calls(), 0);
    let (request, _) = &harness.orders.requests()[0];
    assert!(request.delivery_address_id.is_none());
    assert_eq!(request.delivery_address.as_ref().unwrap().pincode, "560066");
    assert_eq!(request.notes.as_deref(), Some("Unload at gate 2"));
}

#[tokio::test]
async fn test_concurrent_place_order_is_refused() {
    let harness =
        Harness::new(5000).with_users(FakeUsers::slow(Duration::from_millis(50)));
    let controller = at_review(&harness, PaymentMethod::Cod).await;

    let (first, second) = futures::join!(controller.place_order(), controller.place_order());

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), CheckoutError::AlreadyProcessing);
    assert_eq!(harness.users.calls(), 1);
    assert_eq!(harness.orders.requests().len(), 1);
}

#[tokio::test]
async fn test_abandoned_place_order_can_be_retried() {
    let harness =
        Harness::new(5000).with_users(FakeUsers::slow(Duration::from_millis(200)));
    let controller = at_review(&harness, PaymentMethod::Cod).await;

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), controller.place_order()).await;
    assert!(abandoned.is_err());
    assert!(!controller.session().is_processing);
    assert_eq!(controller.go_back().unwrap(), CheckoutStep::Payment);
    controller.submit_payment(&selector_for(PaymentMethod::Cod)).unwrap();

    let outcome = controller.place_order().await.unwrap();
    assert!(matches!(outcome, PlaceOrderOutcome::Confirmed(_)));
    assert_eq!(harness.users.calls(), 2);
    assert!(!controller.session().is_processing);
}

// Payment gateway

#[tokio::test]
async fn test_advance_fixed_when_order_placed() {
    let harness = Harness::new(5000);
    let controller = at_review(&harness, PaymentMethod::Upi).await;
    controller.place_order().await.unwrap();

    let session = controller.session();
    assert_eq!(session.order_advance.unwrap().due_now, Money::inr(1600));
    assert_eq!(session.order_pricing.unwrap().subtotal, Money::inr(5000));

    // The cart stays live until payment; a late addition must not change the charge.
    harness
        .cart
        .update(|cart| {
            cart.add_item(ProductId::new("tmt-16"), "TMT bar 16mm", 1, Money::inr(20_000))
        })
        .await
        .unwrap();

    let request = controller.payment_request().await.unwrap();
    assert_eq!(request.amount, Money::inr(1600));

    controller.pay().await.unwrap();
    let opened = harness.widget.opened.lock().unwrap();
    assert_eq!(opened[0].amount, Money::inr(1600));
}

#[tokio::test]
async fn test_failed_payment_keeps_cart() {
    let harness = Harness::new(5000).with_widget(FakeWidget::returning(PaymentOutcome::Failed {
        reason: "Card declined".into(),
    }));
    let controller = at_review(&harness, PaymentMethod::Card).await;
    controller.place_order().await.unwrap();

    let outcome = controller.pay().await.unwrap();
    assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
    assert_eq!(controller.handoff_state(), HandoffState::Failed);
    assert!(!harness.cart.snapshot().await.is_empty());
    assert_eq!(
        harness.navigator.last(),
        Some(Route::PaymentFailure(OrderId::new("BY-1001")))
    );
}

#[tokio::test]
async fn test_cancelled_payment_returns_to_order() {
    let harness = Harness::new(5000).with_widget(FakeWidget::returning(PaymentOutcome::Cancelled));
    let controller = at_review(&harness, PaymentMethod::NetBanking).await;
    controller.place_order().await.unwrap();

    controller.pay().await.unwrap();
    assert_eq!(controller.handoff_state(), HandoffState::Idle);
    assert!(!harness.cart.snapshot().await.is_empty());
    assert_eq!(
        harness.navigator.last(),
        Some(Route::OrderDetails(OrderId::new("BY-1001")))
    );
    let last = harness.notifier.notices().pop().unwrap();
    assert_eq!(last.level, NoticeLevel::Info);
    assert!(!harness
        .navigator
        .routes()
        .iter()
        .any(|r| matches!(r, Route::PaymentFailure(_))));

    // The shopper may try again after cancelling.
    assert!(controller.pay().await.is_ok());
    assert_eq!(harness.widget.opened.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_widget_load_failure() {
    let harness = Harness::new(5000).with_widget(FakeWidget::broken());
    let controller = at_review(&harness, PaymentMethod::Upi).await;
    controller.place_order().await.unwrap();

    let err = controller.pay().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Gateway(GatewayError::LoadFailed(_))));
    assert_eq!(controller.handoff_state(), HandoffState::Idle);
    assert!(harness.widget.opened.lock().unwrap().is_empty());
    assert!(!harness.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_pay_without_order() {
    let harness = Harness::new(5000);
    let controller = at_review(&harness, PaymentMethod::Upi).await;
    assert!(matches!(
        controller.pay().await,
        Err(CheckoutError::Gateway(GatewayError::NoOrder))
    ));
}
