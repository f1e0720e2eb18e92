//! Price a subtotal the way checkout will.

use anyhow::{bail, Result};
use serde::Serialize;

use brickyard_commerce::pricing::{AdvanceBreakdown, OrderPricing};
use brickyard_commerce::PaymentMethod;

use super::{rupees, QuoteArgs};
use crate::context::Context;

#[derive(Serialize)]
struct QuoteView {
    method: PaymentMethod,
    pricing: OrderPricing,
    advance: AdvanceBreakdown,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    if !args.method.is_available() {
        bail!("{} is not available yet", args.method.display_name());
    }

    let policy = ctx.config.pricing_policy();
    let pricing = policy.price(
        rupees(args.subtotal, "subtotal")?,
        rupees(args.discount, "discount")?,
    )?;
    let advance = policy.advance(&pricing, args.method)?;

    if ctx.output.is_json() {
        ctx.output.json(&QuoteView {
            method: args.method,
            pricing,
            advance,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Quote ({})", args.method.display_name()));
    print_breakdown(ctx, &pricing, &advance, policy.tax_percent);
    Ok(())
}

/// Print the pricing table shared with the checkout review.
pub(crate) fn print_breakdown(
    ctx: &Context,
    pricing: &OrderPricing,
    advance: &AdvanceBreakdown,
    tax_percent: u8,
) {
    ctx.output.amount("Subtotal", pricing.subtotal);
    if pricing.discount.is_positive() {
        ctx.output.amount("Discount", pricing.discount);
    }
    if pricing.has_free_delivery() {
        ctx.output.figure("Delivery", "FREE");
    } else {
        ctx.output.amount("Delivery", pricing.delivery_fee);
    }
    ctx.output.amount(&format!("GST ({}%)", tax_percent), pricing.tax);
    ctx.output.amount("Total", pricing.total);

    if advance.due_now.is_positive() {
        ctx.output.amount(&format!("Due now ({}%)", advance.percentage), advance.due_now);
    }
    ctx.output.amount("Due on delivery", advance.due_on_delivery);
}
