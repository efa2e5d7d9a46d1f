use crate::{
    config::Config,
    services::{classifier, BillingProvider, CatalogBuilder, FixtureBillingProvider, PaywallService},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub paywall_service: Arc<PaywallService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let provider = Arc::new(FixtureBillingProvider::from_file(
            &config.billing.fixture_path,
        )?);

        Ok(Self::with_provider(config, provider))
    }

    /// Build state around an already constructed billing provider
    pub fn with_provider(config: Config, provider: Arc<dyn BillingProvider>) -> Self {
        let builder = CatalogBuilder::new(classifier::from_config(&config.catalog.classifier))
            .with_special_offer_tag(config.catalog.special_offer_tag.clone());
        let paywall_service = Arc::new(PaywallService::new(provider, builder, &config.billing));

        Self {
            paywall_service,
            config: Arc::new(config),
        }
    }
}
