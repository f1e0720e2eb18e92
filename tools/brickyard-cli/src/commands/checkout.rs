//! Drive the checkout wizard against the marketplace API.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use dialoguer::Confirm;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use brickyard_checkout::api::{client_from_config, RestOrdersApi, RestUsersApi};
use brickyard_checkout::collaborators::{CurrentUser, PaymentOutcome};
use brickyard_checkout::memory::{InMemoryCart, NoLocationLookup, StaticAuth};
use brickyard_checkout::{
    CheckoutContext, CheckoutController, CheckoutError, CheckoutSettings, CheckoutStep,
    PaymentSelector, PlaceOrderOutcome, ShippingCollector,
};
use brickyard_commerce::cart::Cart;
use brickyard_commerce::{AddressId, Money, PaymentMethod, ProductId, UserId};

use super::{quote, rupees, CheckoutArgs};
use crate::console_io::{ConsoleNavigator, ConsoleNotifier, ConsoleWidget};
use crate::context::Context;

/// Cart file with prices in rupees.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartFile {
    items: Vec<CartFileItem>,
    #[serde(default)]
    discount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartFileItem {
    product_id: String,
    name: String,
    quantity: i64,
    price: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSummary {
    checkout_id: String,
    order_id: String,
    method: PaymentMethod,
    total: Money,
    due_now: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment: Option<PaymentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(notes) = &args.notes {
        config.checkout.notes = Some(notes.clone());
    }
    config.validate()?;

    let cart = load_cart(&ctx.resolve_path(&args.cart))?;

    let mut shipping = ShippingCollector::with_sample_addresses();
    if let Some(path) = &args.address {
        shipping.fill_form(load_json(&ctx.resolve_path(path))?);
    } else if let Some(id) = &args.saved_address {
        shipping.select_saved(&AddressId::new(id.as_str()))?;
    }

    let mut payment = PaymentSelector::new();
    payment.select(args.method)?;
    fill_payment(&mut payment, &args);

    // The marketplace enforces phone and email verification on its side.
    let contact = shipping.submit().ok();
    let user = CurrentUser {
        id: UserId::new("cli"),
        name: contact.as_ref().map(|a| a.full_name.clone()).unwrap_or_default(),
        email: args.email.clone(),
        phone: contact.map(|a| a.phone).unwrap_or_default(),
        phone_verified: true,
        is_active: true,
    };

    let client = client_from_config(&config)?;
    let navigator = Arc::new(ConsoleNavigator::new(ctx.output.clone()));
    let checkout_ctx = CheckoutContext {
        cart: Arc::new(InMemoryCart::new(cart)),
        auth: Arc::new(StaticAuth::signed_in(user)),
        users: Arc::new(RestUsersApi::new(client.clone())),
        orders: Arc::new(RestOrdersApi::new(client)),
        widget: Arc::new(ConsoleWidget::new(
            ctx.output.clone(),
            config.gateway.key.clone(),
            args.assume_paid,
        )),
        location: Arc::new(NoLocationLookup),
        navigator: navigator.clone(),
        notifier: Arc::new(ConsoleNotifier::new(ctx.output.clone())),
    };

    let controller = CheckoutController::enter(checkout_ctx, CheckoutSettings::from(&config))
        .await?;
    ctx.output.header("Checkout");
    ctx.output.debug(&format!("Checkout {}", controller.id()));

    announce(ctx, &controller);
    controller
        .submit_shipping(&shipping)
        .map_err(|e| report(ctx, e))?;

    announce(ctx, &controller);
    controller
        .submit_payment(&payment)
        .map_err(|e| report(ctx, e))?;

    announce(ctx, &controller);
    let review = controller.review().await?;
    ctx.output.kv("Deliver to", &review.shipping.one_line());
    ctx.output.kv("Payment", &review.payment.details.summary());
    quote::print_breakdown(
        ctx,
        &review.pricing,
        &review.advance,
        controller.settings().pricing.tax_percent,
    );

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", review.pricing.total.display()))
            .default(true)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let placed = controller.place_order().await;
    spinner.finish_and_clear();

    let outcome = match placed {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(error = %e, "place order failed");
            return Err(redirected(e, &navigator).context("Order was not placed"));
        }
    };

    let order = outcome.order().clone();
    ctx.output.kv("Order", order.order_id.as_str());

    let payment_outcome = match outcome {
        PlaceOrderOutcome::Confirmed(_) => None,
        PlaceOrderOutcome::AwaitingPayment(_) => {
            announce(ctx, &controller);
            Some(controller.pay().await?)
        }
    };

    let next = navigator.last().map(|route| route.path());
    if ctx.output.is_json() {
        ctx.output.json(&CheckoutSummary {
            checkout_id: controller.id().to_string(),
            order_id: order.order_id.to_string(),
            method: order.payment.method,
            total: order.total(review.pricing.total),
            due_now: order.amount_due_now(review.advance.due_now),
            payment: payment_outcome,
            next,
        });
    } else if let Some(path) = next {
        ctx.output.kv("Next", &path);
    }

    Ok(())
}

fn announce(ctx: &Context, controller: &CheckoutController) {
    let step = controller.current_step().descriptor();
    ctx.output.step(step.number, CheckoutStep::ALL.len(), step.title);
}

/// Print per-field validation messages and turn the error into a CLI failure.
fn report(ctx: &Context, error: CheckoutError) -> anyhow::Error {
    if let Some(fields) = error.field_errors() {
        for (field, message) in fields.iter() {
            ctx.output.list_item(&format!("{}: {}", field, message));
        }
        return anyhow!("Please fix the highlighted fields");
    }
    error.into()
}

/// Attach the redirect the controller issued, if any.
fn redirected(error: CheckoutError, navigator: &ConsoleNavigator) -> anyhow::Error {
    match navigator.last() {
        Some(route) => anyhow!(error).context(format!("Continue at {}", route)),
        None => error.into(),
    }
}

fn fill_payment(payment: &mut PaymentSelector, args: &CheckoutArgs) {
    if let Some(upi) = &args.upi {
        payment.upi_mut().upi_id = upi.clone();
    }
    if let Some(bank) = &args.bank {
        payment.netbanking_mut().bank = bank.clone();
    }

    let card = payment.card_mut();
    if let Some(number) = &args.card_number {
        card.number = number.clone();
    }
    if let Some(name) = &args.card_name {
        card.holder_name = name.clone();
    }
    if let Some(expiry) = &args.card_expiry {
        card.expiry = expiry.clone();
    }
    if let Some(cvv) = &args.card_cvv {
        card.cvv = cvv.clone();
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_cart(path: &Path) -> Result<Cart> {
    let file: CartFile = load_json(path)?;
    if file.items.is_empty() {
        bail!("{} has no items", path.display());
    }

    let mut cart = Cart::for_user(UserId::new("cli"));
    for item in file.items {
        let price = rupees(item.price, &format!("price of {}", item.name))?;
        cart.add_item(ProductId::new(item.product_id), item.name, item.quantity, price)?;
    }
    if let Some(discount) = file.discount {
        cart.set_discount(rupees(discount, "discount")?)?;
    }
    Ok(cart)
}
