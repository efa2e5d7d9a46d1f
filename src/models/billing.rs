use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Response codes reported by the platform billing client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingResponseCode {
    Ok,
    UserCanceled,
    ServiceDisconnected,
    ServiceUnavailable,
    BillingUnavailable,
    ItemUnavailable,
    DeveloperError,
    Error,
    ItemAlreadyOwned,
}

impl BillingResponseCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::UserCanceled => "USER_CANCELED",
            Self::ServiceDisconnected => "SERVICE_DISCONNECTED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::BillingUnavailable => "BILLING_UNAVAILABLE",
            Self::ItemUnavailable => "ITEM_UNAVAILABLE",
            Self::DeveloperError => "DEVELOPER_ERROR",
            Self::Error => "ERROR",
            Self::ItemAlreadyOwned => "ITEM_ALREADY_OWNED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseState {
    Pending,
    Purchased,
}

/// A purchase as reported back by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub purchase_token: String,
    pub product_id: String,
    pub offer_token: String,
    pub state: PurchaseState,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub purchase_time: time::OffsetDateTime,
}

impl Purchase {
    /// Purchased but not yet acknowledged: the provider refunds these if left alone
    pub fn needs_acknowledgement(&self) -> bool {
        self.state == PurchaseState::Purchased && !self.acknowledged
    }
}

/// Outcome of the platform purchase flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "purchase", rename_all = "lowercase")]
pub enum PurchaseOutcome {
    Purchased(Purchase),
    Pending(Purchase),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AckStatus {
    Acknowledged,
    AlreadyAcknowledged,
}

/// Acknowledgement results for a batch of purchase updates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckReport {
    pub acknowledged: usize,
    pub failed: Vec<AckFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckFailure {
    pub purchase_token: String,
    pub error: BillingError,
}
