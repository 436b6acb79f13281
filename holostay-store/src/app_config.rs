use serde::Deserialize;
use std::env;
use std::time::Duration;
use holostay_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared secret of the hosted auth service that signs access tokens
    pub jwt_secret: Masked<String>,
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    Stripe,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    pub provider: PaymentProviderKind,
    pub secret_key: Masked<String>,
    pub webhook_secret: Masked<String>,
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_seconds: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Upper bound on a single call to the provider API
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl PaymentsConfig {
    /// Signature replay window. Values that do not fit an `i64` are rejected
    /// rather than wrapped, since a non-positive window disables the check.
    pub fn webhook_tolerance(&self) -> Result<i64, config::ConfigError> {
        i64::try_from(self.webhook_tolerance_seconds).map_err(|_| {
            config::ConfigError::Message(format!(
                "payments.webhook_tolerance_seconds out of range: {}",
                self.webhook_tolerance_seconds
            ))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_webhook_tolerance() -> u64 { 300 }
fn default_currency() -> String { "usd".to_string() }
fn default_api_base() -> String { "https://api.stripe.com".to_string() }
fn default_request_timeout() -> u64 { 15 }

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    /// Storefront origin used for redirect targets when the caller sends no Origin header
    pub public_url: String,
    /// Reject checkouts whose total disagrees with nightly price × nights
    #[serde(default)]
    pub enforce_server_pricing: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `HOLOSTAY__PAYMENTS__SECRET_KEY=sk_live_...`
            .add_source(config::Environment::with_prefix("HOLOSTAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
