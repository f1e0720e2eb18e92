//! The checkout wizard controller.
//!
//! Owns the [`CheckoutSession`] and moves it through the four steps. Each
//! step component validates its own input; the controller only stores what
//! it is handed and advances by one step. The session sits behind a mutex
//! that is never held across an await, so a shared controller can refuse a
//! second "Place Order" while the first is in flight.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use brickyard_commerce::pricing::{AdvanceBreakdown, OrderPricing};
use brickyard_commerce::{
    CheckoutId, CreatedOrder, PaymentSelection, PricingPolicy, ShippingAddress,
};

use crate::collaborators::{
    CurrentUser, GeoPoint, Locality, Notice, PaymentOutcome, PaymentRequest, Prefill,
};
use crate::config::{AddressMode, CheckoutConfig, GatewayConfig};
use crate::context::CheckoutContext;
use crate::error::{CheckoutError, GatewayError};
use crate::gateway::{GatewayHandoff, HandoffState};
use crate::payment::PaymentSelector;
use crate::route::Route;
use crate::sequencer::OrderSequencer;
use crate::session::CheckoutSession;
use crate::shipping::ShippingCollector;
use crate::step::{steps, CheckoutStep, StepDescriptor};

/// Settings the controller takes from [`CheckoutConfig`].
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub pricing: PricingPolicy,
    pub address_mode: AddressMode,
    pub notes: Option<String>,
    pub gateway: GatewayConfig,
}

impl From<&CheckoutConfig> for CheckoutSettings {
    fn from(config: &CheckoutConfig) -> Self {
        Self {
            pricing: config.pricing_policy(),
            address_mode: config.checkout.address_mode,
            notes: config.checkout.notes.clone(),
            gateway: config.gateway.clone(),
        }
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self::from(&CheckoutConfig::default())
    }
}

/// What the review step shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReview {
    pub shipping: ShippingAddress,
    pub payment: PaymentSelection,
    pub pricing: OrderPricing,
    pub advance: AdvanceBreakdown,
}

/// Result of a successful "Place Order".
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceOrderOutcome {
    /// Cash on delivery: the order is final and the cart is empty.
    Confirmed(CreatedOrder),
    /// Online payment: the advance is due through the payment widget.
    AwaitingPayment(CreatedOrder),
}

impl PlaceOrderOutcome {
    pub fn order(&self) -> &CreatedOrder {
        match self {
            PlaceOrderOutcome::Confirmed(order) | PlaceOrderOutcome::AwaitingPayment(order) => {
                order
            }
        }
    }
}

/// Drives one shopper through checkout.
#[derive(Debug)]
pub struct CheckoutController {
    ctx: CheckoutContext,
    settings: CheckoutSettings,
    user: CurrentUser,
    session: Mutex<CheckoutSession>,
    handoff: GatewayHandoff,
}

impl CheckoutController {
    /// Open checkout for the signed-in shopper.
    ///
    /// Refuses, after navigating away, when nobody is signed in, the phone
    /// or account is unverified, or the cart is empty.
    #[instrument(skip_all)]
    pub async fn enter(
        ctx: CheckoutContext,
        settings: CheckoutSettings,
    ) -> Result<Self, CheckoutError> {
        let user = match ctx.auth.current_user().await {
            Some(user) => user,
            None => return Err(refuse(&ctx, Route::Login, "Please sign in to check out")),
        };
        if !user.phone_verified {
            return Err(refuse(
                &ctx,
                Route::VerifyPhone,
                "Please verify your phone number to check out",
            ));
        }
        if !user.is_active {
            return Err(refuse(
                &ctx,
                Route::VerifyEmail,
                "Please verify your email address to check out",
            ));
        }
        if ctx.cart.snapshot().await.is_empty() {
            return Err(refuse(&ctx, Route::Cart, "Your cart is empty"));
        }

        let session = CheckoutSession::new();
        info!(checkout_id = %session.id, user_id = %user.id, "checkout started");

        Ok(Self {
            ctx,
            settings,
            user,
            session: Mutex::new(session),
            handoff: GatewayHandoff::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, CheckoutSession> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A copy of the session as it stands.
    pub fn session(&self) -> CheckoutSession {
        self.lock().clone()
    }

    pub fn id(&self) -> CheckoutId {
        self.lock().id.clone()
    }

    pub fn current_step(&self) -> CheckoutStep {
        self.lock().current_step
    }

    pub fn steps(&self) -> [StepDescriptor; 4] {
        steps()
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    pub fn handoff_state(&self) -> HandoffState {
        self.handoff.state()
    }

    /// Price the cart as it is now.
    pub async fn pricing(&self) -> Result<OrderPricing, CheckoutError> {
        let snapshot = self.ctx.cart.snapshot().await;
        Ok(self.settings.pricing.price_cart(&snapshot)?)
    }

    /// Price the cart and split off the advance for `method`.
    async fn quote(
        &self,
        method: brickyard_commerce::PaymentMethod,
    ) -> Result<(OrderPricing, AdvanceBreakdown), CheckoutError> {
        let pricing = self.pricing().await?;
        let advance = self.settings.pricing.advance(&pricing, method)?;
        Ok((pricing, advance))
    }

    /// Everything the review step shows.
    pub async fn review(&self) -> Result<OrderReview, CheckoutError> {
        let (shipping, payment) = {
            let session = self.lock();
            let shipping = session
                .shipping_data
                .clone()
                .ok_or(CheckoutError::MissingStepData(CheckoutStep::Shipping))?;
            let payment = session
                .payment_data
                .clone()
                .ok_or(CheckoutError::MissingStepData(CheckoutStep::Payment))?;
            (shipping, payment)
        };

        let (pricing, advance) = self.quote(payment.method).await?;
        Ok(OrderReview {
            shipping,
            payment,
            pricing,
            advance,
        })
    }

    /// Store the shipping step's address and move to payment.
    pub fn submit_shipping(
        &self,
        collector: &ShippingCollector,
    ) -> Result<CheckoutStep, CheckoutError> {
        let address = collector.submit()?;
        self.store_and_advance(CheckoutStep::Shipping, |session| {
            session.shipping_data = Some(address);
        })
    }

    /// Store the payment step's selection and move to review.
    pub fn submit_payment(&self, selector: &PaymentSelector) -> Result<CheckoutStep, CheckoutError> {
        let selection = selector.submit()?;
        self.store_and_advance(CheckoutStep::Payment, |session| {
            session.payment_data = Some(selection);
        })
    }

    fn store_and_advance(
        &self,
        expected: CheckoutStep,
        store: impl FnOnce(&mut CheckoutSession),
    ) -> Result<CheckoutStep, CheckoutError> {
        let mut session = self.lock();
        let next = expected.next().ok_or(CheckoutError::InvalidTransition {
            from: expected,
            to: expected,
        })?;
        if session.current_step != expected {
            return Err(CheckoutError::InvalidTransition {
                from: session.current_step,
                to: next,
            });
        }
        if session.order_created.is_some() {
            return Err(CheckoutError::OrderAlreadyCreated);
        }

        store(&mut session);
        session.current_step = next;
        session.last_error = None;
        info!(checkout_id = %session.id, step = next.as_str(), "step advanced");
        Ok(next)
    }

    /// Step back once.
    pub fn go_back(&self) -> Result<CheckoutStep, CheckoutError> {
        let current = self.current_step();
        let previous = current.previous().ok_or(CheckoutError::InvalidTransition {
            from: current,
            to: current,
        })?;
        self.edit_step(previous)
    }

    /// Jump back to an earlier step to change it.
    ///
    /// Returning to shipping discards the payment selection. Refused once the
    /// order exists or while it is being placed.
    pub fn edit_step(&self, step: CheckoutStep) -> Result<CheckoutStep, CheckoutError> {
        let mut session = self.lock();
        if session.order_created.is_some() {
            return Err(CheckoutError::OrderAlreadyCreated);
        }
        if session.is_processing {
            return Err(CheckoutError::AlreadyProcessing);
        }
        if step >= session.current_step || step == CheckoutStep::PaymentGateway {
            return Err(CheckoutError::InvalidTransition {
                from: session.current_step,
                to: step,
            });
        }

        session.rewind_to(step);
        info!(checkout_id = %session.id, step = step.as_str(), "stepped back");
        Ok(step)
    }

    /// Fill the shipping form's city, state and pincode from a map point.
    ///
    /// Only allowed on the shipping step. The filled fields stay read-only
    /// until the collector's location is cleared.
    pub async fn autofill_location(
        &self,
        collector: &mut ShippingCollector,
        point: GeoPoint,
    ) -> Result<Locality, CheckoutError> {
        let current = self.current_step();
        if current != CheckoutStep::Shipping {
            return Err(CheckoutError::InvalidTransition {
                from: current,
                to: CheckoutStep::Shipping,
            });
        }
        match collector
            .autofill_from_location(self.ctx.location.as_ref(), point)
            .await
        {
            Ok(locality) => Ok(locality),
            Err(e) => {
                warn!(error = %e, "location lookup failed");
                self.ctx.notifier.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Restore the step components from what the session already holds.
    pub fn restore_components(&self, shipping: &mut ShippingCollector, payment: &mut PaymentSelector) {
        let session = self.lock();
        if let Some(address) = &session.shipping_data {
            shipping.restore(address);
        }
        if let Some(selection) = &session.payment_data {
            payment.restore(selection);
        }
    }

    /// Save the address and create the order.
    ///
    /// Cash on delivery clears the cart and navigates to the confirmation
    /// page. Online methods keep the cart and move to the payment gateway
    /// step. On failure the wizard stays on review with its data intact.
    #[instrument(skip_all, fields(checkout_id = tracing::field::Empty))]
    pub async fn place_order(&self) -> Result<PlaceOrderOutcome, CheckoutError> {
        let (shipping, payment, key) = {
            let mut session = self.lock();
            tracing::Span::current().record("checkout_id", tracing::field::display(&session.id));

            let (shipping, payment) = match ready_to_place(&session) {
                Ok(ready) => ready,
                Err(e) => {
                    if !matches!(e, CheckoutError::AlreadyProcessing) {
                        session.fail(e.to_string());
                        self.ctx.notifier.notify(Notice::error(e.to_string()));
                    }
                    warn!(error = %e, "order placement refused");
                    return Err(e);
                }
            };

            session.is_processing = true;
            session.last_error = None;
            (shipping, payment, session.idempotency_key.clone())
        };
        // Clears `is_processing` however this future ends, including when it is dropped.
        let _processing = ProcessingGuard {
            session: &self.session,
        };

        debug!(method = %payment.method, "placing order");
        let sequencer = OrderSequencer::new(
            &self.ctx,
            &self.settings.pricing,
            self.settings.address_mode,
            self.settings.notes.as_deref(),
        );
        let result = match self.quote(payment.method).await {
            Ok(quote) => sequencer
                .submit(&shipping, &payment, &key)
                .await
                .map(|order| (order, quote)),
            Err(e) => Err(e),
        };

        let (order, (pricing, advance)) = match result {
            Ok(placed) => placed,
            Err(e) => {
                let mut session = self.lock();
                if !matches!(e, CheckoutError::Verification(_)) {
                    session.fail(e.to_string());
                    self.ctx.notifier.notify(Notice::error(e.to_string()));
                }
                return Err(e);
            }
        };

        if payment.method.is_online() {
            let mut session = self.lock();
            session.order_created = Some(order.clone());
            session.order_pricing = Some(pricing);
            session.order_advance = Some(advance);
            session.current_step = CheckoutStep::PaymentGateway;
            info!(order_id = %order.order_id, "awaiting advance payment");
            return Ok(PlaceOrderOutcome::AwaitingPayment(order));
        }

        self.ctx.cart.clear_cart().await;
        {
            let mut session = self.lock();
            session.order_created = Some(order.clone());
            session.order_pricing = Some(pricing);
            session.order_advance = Some(advance);
        }
        self.ctx
            .notifier
            .notify(Notice::success("Order placed successfully!"));
        self.ctx
            .navigator
            .navigate(Route::OrderConfirmation(order.order_id.clone()));
        info!(order_id = %order.order_id, "cash on delivery order confirmed");
        Ok(PlaceOrderOutcome::Confirmed(order))
    }

    /// The widget request for the created order's advance.
    ///
    /// The amount is the one fixed when the order was placed; later cart
    /// changes do not affect it.
    pub async fn payment_request(&self) -> Result<PaymentRequest, CheckoutError> {
        let (order, method, advance) = {
            let session = self.lock();
            let order = session
                .order_created
                .clone()
                .ok_or(GatewayError::NoOrder)?;
            if session.current_step != CheckoutStep::PaymentGateway {
                return Err(GatewayError::NoOrder.into());
            }
            let advance = session.order_advance.ok_or(GatewayError::NoOrder)?;
            (order, order_method(&session), advance)
        };

        let amount = order.amount_due_now(advance.due_now);

        Ok(PaymentRequest {
            key: self.settings.gateway.key.clone(),
            description: format!("Advance payment for order {}", order.order_id),
            order_id: order.order_id,
            amount,
            currency: amount.currency,
            method,
            merchant_name: self.settings.gateway.merchant_name.clone(),
            prefill: Prefill {
                name: self.user.name.clone(),
                email: self.user.email.clone(),
                contact: self.user.phone.clone(),
            },
        })
    }

    /// Open the payment widget for the advance and act on the outcome.
    pub async fn pay(&self) -> Result<PaymentOutcome, CheckoutError> {
        let request = self.payment_request().await?;
        self.handoff.run(&self.ctx, request).await
    }
}

/// Resets the in-flight flag when `place_order` finishes or is abandoned.
struct ProcessingGuard<'a> {
    session: &'a Mutex<CheckoutSession>,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        session.is_processing = false;
    }
}

fn order_method(session: &CheckoutSession) -> brickyard_commerce::PaymentMethod {
    session
        .order_created
        .as_ref()
        .map(|o| o.payment.method)
        .or_else(|| session.payment_data.as_ref().map(|p| p.method))
        .unwrap_or(brickyard_commerce::PaymentMethod::Cod)
}

/// The address and payment to submit, if "Place Order" may start.
fn ready_to_place(
    session: &CheckoutSession,
) -> Result<(ShippingAddress, PaymentSelection), CheckoutError> {
    if session.is_processing {
        return Err(CheckoutError::AlreadyProcessing);
    }
    if session.order_created.is_some() {
        return Err(CheckoutError::OrderAlreadyCreated);
    }
    let shipping = session
        .shipping_data
        .clone()
        .ok_or(CheckoutError::MissingStepData(CheckoutStep::Shipping))?;
    let payment = session
        .payment_data
        .clone()
        .ok_or(CheckoutError::MissingStepData(CheckoutStep::Payment))?;
    if session.current_step != CheckoutStep::Review {
        return Err(CheckoutError::InvalidTransition {
            from: session.current_step,
            to: CheckoutStep::PaymentGateway,
        });
    }
    Ok((shipping, payment))
}

fn refuse(ctx: &CheckoutContext, route: Route, message: &str) -> CheckoutError {
    warn!(redirect = %route, "checkout entry refused");
    ctx.notifier.notify(Notice::info(message));
    ctx.navigator.navigate(route.clone());
    CheckoutError::EntryRefused(route)
}
