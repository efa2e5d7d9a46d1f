use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    error::BillingError,
    models::{
        billing::{AckStatus, BillingResponseCode, Purchase, PurchaseOutcome, PurchaseState},
        offer::RawOffer,
    },
};

/// Asynchronous contract of a platform billing client
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Establish the connection to the billing service
    async fn connect(&self) -> Result<(), BillingError>;

    /// Look up every offer of the given products
    async fn query_offers(&self, product_ids: &BTreeSet<String>)
        -> Result<Vec<RawOffer>, BillingError>;

    /// Start the platform purchase flow for one offer
    async fn launch_purchase(&self, offer_token: &str) -> Result<PurchaseOutcome, BillingError>;

    /// Must follow every successful purchase, or the provider refunds it
    async fn acknowledge_purchase(&self, purchase_token: &str) -> Result<AckStatus, BillingError>;

    async fn restore_purchases(&self) -> Result<Vec<Purchase>, BillingError>;
}

/// Billing provider serving offers from a JSON fixture and simulating purchases in memory
pub struct FixtureBillingProvider {
    offers: Vec<RawOffer>,
    connected: AtomicBool,
    defer_payments: AtomicBool,
    purchases: Mutex<HashMap<String, Purchase>>,
}

impl FixtureBillingProvider {
    pub fn new(offers: Vec<RawOffer>) -> Self {
        Self {
            offers,
            connected: AtomicBool::new(false),
            defer_payments: AtomicBool::new(false),
            purchases: Mutex::new(HashMap::new()),
        }
    }

    /// Load offers from a JSON array of provider records
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading offer fixture {}", path.display()))?;
        let offers: Vec<RawOffer> = serde_json::from_str(&data)
            .with_context(|| format!("parsing offer fixture {}", path.display()))?;
        info!(offers = offers.len(), path = %path.display(), "Loaded offer fixture");
        Ok(Self::new(offers))
    }

    /// Drop the connection, as the platform does when the billing service goes away
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Simulate a slow payment method: new purchases stay pending until completed
    pub fn set_deferred_payments(&self, deferred: bool) {
        self.defer_payments.store(deferred, Ordering::SeqCst);
    }

    /// Settle a pending purchase, returning the update the platform would push
    pub async fn complete_pending_purchase(
        &self,
        purchase_token: &str,
    ) -> Result<Purchase, BillingError> {
        let mut purchases = self.purchases.lock().await;
        let purchase = purchases
            .get_mut(purchase_token)
            .ok_or_else(|| BillingError::UnknownPurchase(purchase_token.to_string()))?;

        purchase.state = PurchaseState::Purchased;
        Ok(purchase.clone())
    }

    fn ensure_connected(&self) -> Result<(), BillingError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(BillingError::NotReady)
        }
    }
}

#[async_trait]
impl BillingProvider for FixtureBillingProvider {
    async fn connect(&self) -> Result<(), BillingError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_offers(
        &self,
        product_ids: &BTreeSet<String>,
    ) -> Result<Vec<RawOffer>, BillingError> {
        if !self.is_connected() {
            return Err(BillingError::ServiceDisconnected);
        }

        Ok(self
            .offers
            .iter()
            .filter(|offer| product_ids.contains(&offer.product_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, offer_token))]
    async fn launch_purchase(&self, offer_token: &str) -> Result<PurchaseOutcome, BillingError> {
        self.ensure_connected()?;

        let offer = self
            .offers
            .iter()
            .find(|offer| offer.offer_token == offer_token)
            .ok_or(BillingError::PurchaseFailed(
                BillingResponseCode::ItemUnavailable,
            ))?;

        let mut purchases = self.purchases.lock().await;
        if purchases.values().any(|p| p.product_id == offer.product_id) {
            return Err(BillingError::PurchaseFailed(
                BillingResponseCode::ItemAlreadyOwned,
            ));
        }

        let deferred = self.defer_payments.load(Ordering::SeqCst);
        let purchase = Purchase {
            purchase_token: uuid::Uuid::new_v4().to_string(),
            product_id: offer.product_id.clone(),
            offer_token: offer.offer_token.clone(),
            state: if deferred {
                PurchaseState::Pending
            } else {
                PurchaseState::Purchased
            },
            acknowledged: false,
            purchase_time: time::OffsetDateTime::now_utc(),
        };
        purchases.insert(purchase.purchase_token.clone(), purchase.clone());

        if deferred {
            info!(product_id = %purchase.product_id, "Simulated purchase pending");
            Ok(PurchaseOutcome::Pending(purchase))
        } else {
            info!(product_id = %purchase.product_id, "Simulated purchase completed");
            Ok(PurchaseOutcome::Purchased(purchase))
        }
    }

    async fn acknowledge_purchase(&self, purchase_token: &str) -> Result<AckStatus, BillingError> {
        self.ensure_connected()?;

        let mut purchases = self.purchases.lock().await;
        let purchase = purchases
            .get_mut(purchase_token)
            .ok_or_else(|| BillingError::UnknownPurchase(purchase_token.to_string()))?;

        if purchase.acknowledged {
            warn!(product_id = %purchase.product_id, "Purchase acknowledged twice");
            return Ok(AckStatus::AlreadyAcknowledged);
        }
        purchase.acknowledged = true;
        Ok(AckStatus::Acknowledged)
    }

    async fn restore_purchases(&self) -> Result<Vec<Purchase>, BillingError> {
        self.ensure_connected()?;

        let purchases = self.purchases.lock().await;
        let mut restored: Vec<Purchase> = purchases.values().cloned().collect();
        restored.sort_by_key(|p| p.purchase_time);
        Ok(restored)
    }
}
