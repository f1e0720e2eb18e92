//! CLI command implementations.

pub mod checkout;
pub mod config;
pub mod quote;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use brickyard_commerce::{Currency, Money, PaymentMethod};

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart subtotal in rupees.
    #[arg(short, long)]
    pub subtotal: f64,

    /// Cart discount in rupees.
    #[arg(short, long, default_value = "0")]
    pub discount: f64,

    /// Payment method (cod, card, upi, netbanking).
    #[arg(short, long, default_value = "cod")]
    pub method: PaymentMethod,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Cart JSON file: `{"items": [{"productId", "name", "quantity", "price"}], "discount"}`.
    #[arg(long)]
    pub cart: String,

    /// New delivery address as a JSON file.
    #[arg(short, long, conflicts_with = "saved_address")]
    pub address: Option<String>,

    /// Deliver to a saved address instead (default: the default saved address).
    #[arg(long)]
    pub saved_address: Option<String>,

    /// Payment method (cod, card, upi, netbanking).
    #[arg(short, long, default_value = "cod")]
    pub method: PaymentMethod,

    /// UPI id, for `--method upi`.
    #[arg(long)]
    pub upi: Option<String>,

    /// Card number, for `--method card`.
    #[arg(long)]
    pub card_number: Option<String>,

    #[arg(long)]
    pub card_name: Option<String>,

    /// Card expiry as MM/YY.
    #[arg(long)]
    pub card_expiry: Option<String>,

    #[arg(long)]
    pub card_cvv: Option<String>,

    /// Bank code, for `--method netbanking`.
    #[arg(long)]
    pub bank: Option<String>,

    /// Delivery notes for this order.
    #[arg(long)]
    pub notes: Option<String>,

    /// Shopper email used to pre-fill the payment widget.
    #[arg(long, default_value = "")]
    pub email: String,

    /// Treat the advance payment as completed instead of cancelled.
    #[arg(long)]
    pub assume_paid: bool,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Write a default config file.
    Init {
        /// Where to write it (default: ./brickyard.toml).
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

/// Convert a rupee amount from the command line.
pub(crate) fn rupees(value: f64, what: &str) -> Result<Money> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a non-negative amount, got {}", what, value);
    }
    Ok(Money::new(
        (value * Currency::INR.minor_per_major() as f64).round() as i64,
        Currency::INR,
    ))
}
