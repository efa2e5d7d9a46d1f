use serde::Deserialize;
use std::collections::BTreeSet;

use crate::models::offer::DEFAULT_SPECIAL_OFFER_TAG;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub billing: BillingConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Product identifiers queried from the provider
    pub product_ids: BTreeSet<String>,
    /// JSON file of provider offer records served by the fixture provider
    pub fixture_path: String,
    /// Reconnects attempted when the service drops mid-query
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_special_offer_tag")]
    pub special_offer_tag: String,
    pub classifier: ClassifierConfig,
}

/// How offers are mapped to product families
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierConfig {
    /// Match product id prefixes, in declaration order
    Prefix { rules: Vec<FamilyRule> },
    /// Trust the family reported by the provider
    Explicit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyRule {
    pub prefix: String,
    pub family: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_attempts() -> u8 {
    3
}

fn default_special_offer_tag() -> String {
    DEFAULT_SPECIAL_OFFER_TAG.to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(true))
            // PAYWALL__BILLING__FIXTURE_PATH=... overrides billing.fixture_path
            .add_source(
                config::Environment::with_prefix("PAYWALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
