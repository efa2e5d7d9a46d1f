use std::{
    collections::{BTreeSet, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use super::{billing_provider::BillingProvider, catalog_service::CatalogBuilder};
use crate::{
    config::BillingConfig,
    error::{ApiError, BillingError, Result},
    models::{
        billing::{
            AckFailure, AckReport, AckStatus, BillingResponseCode, Purchase, PurchaseOutcome,
        },
        catalog::Catalog,
        offer::RawOffer,
    },
};

/// Result of a refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// A new catalog was built and published
    Published { items: usize },
    /// The provider answered with no offers; nothing was published
    NoOffers,
}

/// Owns the current catalog and mediates between presentation and the billing provider.
///
/// The catalog is only ever replaced wholesale; readers get `Arc` snapshots
/// and subscribers are notified on every swap.
pub struct PaywallService {
    provider: Arc<dyn BillingProvider>,
    builder: CatalogBuilder,
    product_ids: BTreeSet<String>,
    reconnect_attempts: u8,
    connected: AtomicBool,
    current: watch::Sender<Option<Arc<Catalog>>>,
    refresh_lock: Mutex<()>,
    acknowledged: Mutex<HashSet<String>>,
}

impl PaywallService {
    pub fn new(
        provider: Arc<dyn BillingProvider>,
        builder: CatalogBuilder,
        config: &BillingConfig,
    ) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            provider,
            builder,
            product_ids: config.product_ids.clone(),
            reconnect_attempts: config.reconnect_attempts,
            connected: AtomicBool::new(false),
            current,
            refresh_lock: Mutex::new(()),
            acknowledged: Mutex::new(HashSet::new()),
        }
    }

    /// Latest published catalog, `None` until the first successful query
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.current.borrow().clone()
    }

    /// Receiver notified each time a new catalog replaces the previous one
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Catalog>>> {
        self.current.subscribe()
    }

    /// Query the provider and publish a freshly built catalog.
    ///
    /// Connects on first use. A connection lost mid-query is retried from
    /// scratch after reconnecting, up to `reconnect_attempts` times. Provider
    /// failures and classification errors leave the previous snapshot in place.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<RefreshStatus> {
        let _guard = self.refresh_lock.lock().await;

        let offers = self.query_with_reconnect().await?;
        if offers.is_empty() {
            warn!("Billing provider returned no offers, keeping previous catalog");
            return Ok(RefreshStatus::NoOffers);
        }

        let catalog = self.builder.build(&offers)?;
        let items = catalog.len();
        info!(
            items,
            families = catalog.items_by_family.len(),
            special_offer = catalog.special_offer.is_some(),
            "Publishing catalog"
        );
        self.current.send_replace(Some(Arc::new(catalog)));

        Ok(RefreshStatus::Published { items })
    }

    async fn query_with_reconnect(&self) -> std::result::Result<Vec<RawOffer>, BillingError> {
        if !self.connected.load(Ordering::SeqCst) {
            self.connect().await?;
        }

        let mut attempt = 0u8;
        loop {
            match self.provider.query_offers(&self.product_ids).await {
                Err(BillingError::ServiceDisconnected) => {
                    self.connected.store(false, Ordering::SeqCst);
                    if attempt >= self.reconnect_attempts {
                        warn!(attempt, "Billing service disconnected, giving up");
                        return Err(BillingError::ServiceDisconnected);
                    }
                    attempt += 1;
                    debug!(attempt, "Billing service disconnected, reconnecting");
                    self.connect().await?;
                }
                result => return result,
            }
        }
    }

    async fn connect(&self) -> std::result::Result<(), BillingError> {
        self.provider.connect().await?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Start the purchase flow for an offer of the current catalog
    #[instrument(skip(self, offer_token))]
    pub async fn purchase(&self, offer_token: &str) -> Result<PurchaseOutcome> {
        let catalog = self.current().ok_or(ApiError::CatalogUnavailable)?;
        if !catalog.contains_token(offer_token) {
            return Err(ApiError::NotFound(
                "Offer is not part of the current catalog".to_string(),
            ));
        }

        self.launch(offer_token).await
    }

    /// Purchase the offer tagged as special, if the catalog has one
    #[instrument(skip(self))]
    pub async fn purchase_special_offer(&self) -> Result<PurchaseOutcome> {
        let catalog = self.current().ok_or(ApiError::CatalogUnavailable)?;
        let special = catalog
            .special_offer
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("No special offer available".to_string()))?;

        self.launch(&special.offer.offer_token).await
    }

    async fn launch(&self, offer_token: &str) -> Result<PurchaseOutcome> {
        let outcome = match self.provider.launch_purchase(offer_token).await {
            Err(BillingError::PurchaseFailed(BillingResponseCode::UserCanceled)) => {
                PurchaseOutcome::Cancelled
            }
            other => other?,
        };

        match &outcome {
            PurchaseOutcome::Purchased(purchase) => {
                self.acknowledge_once(purchase).await?;
            }
            PurchaseOutcome::Pending(purchase) => {
                info!(
                    product_id = %purchase.product_id,
                    "Purchase pending, acknowledgement deferred to purchase updates"
                );
            }
            PurchaseOutcome::Cancelled => debug!("Purchase cancelled by user"),
        }
        Ok(outcome)
    }

    /// Purchase updates pushed by the provider outside of `purchase`.
    ///
    /// Every purchase is acknowledged on its own: a failure is recorded in the
    /// report and the rest of the batch still goes through.
    #[instrument(skip_all, fields(purchases = purchases.len()))]
    pub async fn handle_purchases_updated(&self, purchases: &[Purchase]) -> AckReport {
        let mut report = AckReport::default();
        for purchase in purchases {
            match self.acknowledge_once(purchase).await {
                Ok(Some(AckStatus::Acknowledged)) => report.acknowledged += 1,
                Ok(_) => {}
                Err(error) => report.failed.push(Self::ack_failure(purchase, error)),
            }
        }
        report
    }

    /// Restore previous purchases and acknowledge any left hanging.
    ///
    /// Purchases whose acknowledgement fails are returned unacknowledged.
    #[instrument(skip(self))]
    pub async fn restore_purchases(&self) -> Result<Vec<Purchase>> {
        let mut purchases = self.provider.restore_purchases().await?;
        for purchase in purchases.iter_mut() {
            match self.acknowledge_once(purchase).await {
                Ok(Some(_)) => purchase.acknowledged = true,
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        product_id = %purchase.product_id,
                        %error,
                        "Failed to acknowledge restored purchase"
                    );
                }
            }
        }
        Ok(purchases)
    }

    fn ack_failure(purchase: &Purchase, error: BillingError) -> AckFailure {
        warn!(product_id = %purchase.product_id, %error, "Failed to acknowledge purchase");
        AckFailure {
            purchase_token: purchase.purchase_token.clone(),
            error,
        }
    }

    /// Acknowledge a purchase unless it is pending, already acknowledged, or
    /// was acknowledged through this service before.
    async fn acknowledge_once(
        &self,
        purchase: &Purchase,
    ) -> std::result::Result<Option<AckStatus>, BillingError> {
        if !purchase.needs_acknowledgement() {
            return Ok(None);
        }

        // Held across the provider call so concurrent updates cannot double-acknowledge
        let mut acknowledged = self.acknowledged.lock().await;
        if acknowledged.contains(&purchase.purchase_token) {
            return Ok(None);
        }

        let status = self
            .provider
            .acknowledge_purchase(&purchase.purchase_token)
            .await?;
        acknowledged.insert(purchase.purchase_token.clone());
        info!(product_id = %purchase.product_id, ?status, "Purchase acknowledged");

        Ok(Some(status))
    }
}
