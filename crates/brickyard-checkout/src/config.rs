//! Checkout configuration.
//!
//! Loaded from TOML or JSON (picked by file extension), with a couple of
//! environment overrides for the API endpoint and token.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use brickyard_commerce::{Money, PricingPolicy};
use brickyard_data::{FetchPolicy, RetryPolicy, TimeoutConfig};

use crate::error::CheckoutError;

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "BRICKYARD_API_URL";
/// Overrides `api.token`.
pub const ENV_API_TOKEN: &str = "BRICKYARD_API_TOKEN";

/// Checkout configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub checkout: FlowConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl CheckoutConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckoutError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CheckoutError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                CheckoutError::Config(format!("failed to parse JSON config {}: {}", path.display(), e))
            })
        } else {
            toml::from_str(&content).map_err(|e| {
                CheckoutError::Config(format!("failed to parse TOML config {}: {}", path.display(), e))
            })
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckoutError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| CheckoutError::Config(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| CheckoutError::Config(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|e| {
            CheckoutError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// Apply `BRICKYARD_API_URL` and `BRICKYARD_API_TOKEN` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
        self
    }

    /// Reject settings checkout cannot run with.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(CheckoutError::Config("api.base_url must not be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CheckoutError::Config(format!(
                "api.base_url must be an http(s) URL, got {}",
                base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(CheckoutError::Config("api.timeout_secs must be positive".into()));
        }
        if self.pricing.tax_percent > 100 {
            return Err(CheckoutError::Config("pricing.tax_percent must be 0-100".into()));
        }
        if self.pricing.advance_percent > 100 {
            return Err(CheckoutError::Config("pricing.advance_percent must be 0-100".into()));
        }
        if self.pricing.free_delivery_threshold < 0 || self.pricing.delivery_fee < 0 {
            return Err(CheckoutError::Config("pricing amounts must not be negative".into()));
        }
        Ok(())
    }

    /// Pricing rules in effect.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            free_delivery_threshold: Money::inr(self.pricing.free_delivery_threshold),
            delivery_fee: Money::inr(self.pricing.delivery_fee),
            tax_percent: self.pricing.tax_percent,
            advance_percent: self.pricing.advance_percent,
        }
    }

    /// HTTP timeout and retry policy for the REST collaborators.
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::new(
            TimeoutConfig::from_total(Duration::from_secs(self.api.timeout_secs)),
            RetryPolicy::new(self.api.max_retries),
        )
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Marketplace API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a timeout, connection failure or 5xx.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Bearer token for the shopper's session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            token: None,
        }
    }
}

/// Pricing settings, in whole rupees and percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Delivery is free when the subtotal is above this.
    #[serde(default = "default_free_delivery_threshold")]
    pub free_delivery_threshold: i64,

    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: i64,

    #[serde(default = "default_tax_percent")]
    pub tax_percent: u8,

    /// Share of the total collected upfront for online payments.
    #[serde(default = "default_advance_percent")]
    pub advance_percent: u8,
}

fn default_free_delivery_threshold() -> i64 {
    10_000
}

fn default_delivery_fee() -> i64 {
    500
}

fn default_tax_percent() -> u8 {
    18
}

fn default_advance_percent() -> u8 {
    25
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_delivery_threshold: default_free_delivery_threshold(),
            delivery_fee: default_delivery_fee(),
            tax_percent: default_tax_percent(),
            advance_percent: default_advance_percent(),
        }
    }
}

/// How the delivery address reaches the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressMode {
    /// Save the address to the account first, then reference it by id.
    #[default]
    Separate,
    /// Send the address inside the order request.
    Inline,
}

/// Wizard behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub address_mode: AddressMode,

    /// Delivery notes attached to every order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payment widget settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Publishable widget key.
    #[serde(default)]
    pub key: String,

    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
}

fn default_merchant_name() -> String {
    "Brickyard".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            merchant_name: default_merchant_name(),
        }
    }
}
