//! Brickyard CLI - checkout from the command line.
//!
//! Commands:
//! - `brickyard quote` - Price a cart subtotal for a payment method
//! - `brickyard checkout` - Place an order against the marketplace API
//! - `brickyard config` - Manage configuration

mod commands;
mod console_io;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use brickyard_checkout::telemetry::{self, LogFormat};
use commands::{CheckoutArgs, ConfigArgs, QuoteArgs};

/// Brickyard CLI - Quote and place marketplace orders
#[derive(Parser)]
#[command(name = "brickyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output and JSON log lines
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the price breakdown for a subtotal
    Quote(QuoteArgs),

    /// Run the checkout wizard and place an order
    Checkout(CheckoutArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    telemetry::init(format, cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
