//! Configuration management commands.

use anyhow::{bail, Context as _, Result};

use brickyard_checkout::CheckoutConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { path, force } => init_config(path.as_deref(), force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "built-in defaults"),
    }

    // Never echo the session token.
    let mut shown = ctx.config.clone();
    if shown.api.token.is_some() {
        shown.api.token = Some("********".to_string());
    }
    println!("\n{}", toml::to_string_pretty(&shown)?);

    Ok(())
}

fn init_config(path: Option<&str>, force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(path.unwrap_or(CONFIG_NAMES[0]));

    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    CheckoutConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ctx.output.success(&format!("Created: {}", path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    ctx.config.validate()?;

    if ctx.config.api.token.is_none() {
        ctx.output
            .warn("api.token is not set; order calls will be rejected as unauthenticated");
    }
    if ctx.config.gateway.key.is_empty() {
        ctx.output
            .warn("gateway.key is empty; online payments cannot open the payment widget");
    }

    ctx.output.success("Configuration is valid");
    Ok(())
}
