use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    billing::{AckReport, Purchase, PurchaseOutcome},
    catalog::{Catalog, CatalogItem, SpecialOffer},
    common::SuccessResponse,
};
use crate::services::RefreshStatus;

/// GET /api/v1/paywall
pub type PaywallResponse = SuccessResponse<PaywallData>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallData {
    /// `None` while no provider response has been received
    pub catalog: Option<CatalogView>,
}

/// GET /api/v1/paywall/families/{family}
pub type FamilyResponse = SuccessResponse<Option<FamilyView>>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub families: Vec<FamilyView>,
    pub special_offer: Option<SpecialOfferView>,
}

impl From<&Catalog> for CatalogView {
    fn from(catalog: &Catalog) -> Self {
        Self {
            families: catalog
                .families()
                .filter_map(|family| FamilyView::from_catalog(catalog, family))
                .collect(),
            special_offer: catalog.special_offer.as_ref().map(SpecialOfferView::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyView {
    pub name: String,
    pub items: Vec<CatalogItemView>,
    /// Base plan selected when the family is first shown
    pub default_selection: Option<String>,
}

impl FamilyView {
    pub fn from_catalog(catalog: &Catalog, family: &str) -> Option<Self> {
        let items = catalog.items(family)?;
        Some(Self {
            name: family.to_string(),
            items: items.iter().map(CatalogItemView::from).collect(),
            default_selection: catalog
                .default_selection(family)
                .map(|item| item.base_plan_id.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemView {
    pub product_family: String,
    pub base_plan_id: String,
    pub title: Option<String>,
    pub subtitle: String,
    pub period_days: u32,
    pub is_special: bool,
    /// Token to send back when this row is selected
    pub purchase_token: String,
    pub base_plan_offer_token: String,
    pub trial_offer_token: Option<String>,
}

impl From<&CatalogItem> for CatalogItemView {
    fn from(item: &CatalogItem) -> Self {
        Self {
            product_family: item.product_family.clone(),
            base_plan_id: item.base_plan_id.clone(),
            title: item.title(),
            subtitle: item.subtitle(),
            period_days: item.period_days(),
            is_special: item.is_special,
            purchase_token: item.purchase_token().to_string(),
            base_plan_offer_token: item.base_plan_offer.offer_token.clone(),
            trial_offer_token: item.trial_offer.as_ref().map(|o| o.offer_token.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOfferView {
    pub item: CatalogItemView,
    pub offer_token: String,
}

impl From<&SpecialOffer> for SpecialOfferView {
    fn from(special: &SpecialOffer) -> Self {
        Self {
            item: CatalogItemView::from(&special.item),
            offer_token: special.offer.offer_token.clone(),
        }
    }
}

/// POST /api/v1/paywall/refresh
pub type RefreshResponse = SuccessResponse<RefreshData>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub published: bool,
    pub items: usize,
}

impl From<RefreshStatus> for RefreshData {
    fn from(status: RefreshStatus) -> Self {
        match status {
            RefreshStatus::Published { items } => Self {
                published: true,
                items,
            },
            RefreshStatus::NoOffers => Self {
                published: false,
                items: 0,
            },
        }
    }
}

/// POST /api/v1/purchases
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[validate(length(min = 1, max = 4096))]
    pub offer_token: String,
}

pub type PurchaseResponse = SuccessResponse<PurchaseOutcome>;

/// POST /api/v1/purchases/updates
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesUpdatedRequest {
    #[validate(length(max = 100))]
    pub purchases: Vec<Purchase>,
}

pub type PurchasesUpdatedResponse = SuccessResponse<PurchasesUpdatedData>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesUpdatedData {
    pub acknowledged: usize,
    /// Purchases whose acknowledgement failed; the client should resend them
    pub failed: usize,
}

impl From<AckReport> for PurchasesUpdatedData {
    fn from(report: AckReport) -> Self {
        Self {
            acknowledged: report.acknowledged,
            failed: report.failed.len(),
        }
    }
}

/// POST /api/v1/purchases/restore
pub type RestoreResponse = SuccessResponse<Vec<Purchase>>;
