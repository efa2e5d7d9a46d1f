use std::collections::BTreeMap;

use super::offer::RawOffer;
use crate::utils::{billing_period_days, format_billing_period};

/// One user-selectable row: every offer sharing a `(product_family, base_plan_id)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub product_family: String,
    pub base_plan_id: String,
    pub base_plan_offer: RawOffer,
    pub trial_offer: Option<RawOffer>,
    pub is_special: bool,
}

impl CatalogItem {
    /// Sort key: approximate length of the recurring period in days
    pub fn period_days(&self) -> u32 {
        self.base_plan_offer
            .recurring_phase()
            .map(|phase| billing_period_days(&phase.billing_period))
            .unwrap_or(0)
    }

    /// "7 days free trial, then" when the plan comes with a trial
    pub fn title(&self) -> Option<String> {
        let trial = self.trial_offer.as_ref()?;
        let first = trial.pricing_phases.first()?;
        Some(format!(
            "{} free trial, then",
            format_billing_period(&first.billing_period)
        ))
    }

    /// "$9.99 per 1 month"
    pub fn subtitle(&self) -> String {
        match self.base_plan_offer.recurring_phase() {
            Some(phase) => format!(
                "{} per {}",
                phase.formatted_price,
                format_billing_period(&phase.billing_period)
            ),
            None => String::new(),
        }
    }

    /// Token the presentation layer should purchase: the trial when offered, the base plan otherwise
    pub fn purchase_token(&self) -> &str {
        self.trial_offer
            .as_ref()
            .map(|o| o.offer_token.as_str())
            .unwrap_or(&self.base_plan_offer.offer_token)
    }

    pub fn owns_token(&self, offer_token: &str) -> bool {
        self.base_plan_offer.offer_token == offer_token
            || self
                .trial_offer
                .as_ref()
                .is_some_and(|o| o.offer_token == offer_token)
    }
}

/// The promotional offer plus the catalog row it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialOffer {
    pub item: CatalogItem,
    /// The tagged offer, kept for the purchase flow
    pub offer: RawOffer,
}

/// Immutable snapshot handed to the presentation layer.
/// Rebuilt from scratch for each provider response, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub items_by_family: BTreeMap<String, Vec<CatalogItem>>,
    pub special_offer: Option<SpecialOffer>,
}

impl Catalog {
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.items_by_family.keys().map(String::as_str)
    }

    pub fn items(&self, family: &str) -> Option<&[CatalogItem]> {
        self.items_by_family.get(family).map(Vec::as_slice)
    }

    /// Initially selected row for a family: the shortest billing period
    pub fn default_selection(&self, family: &str) -> Option<&CatalogItem> {
        self.items(family).and_then(|items| items.first())
    }

    pub fn find_by_offer_token(&self, offer_token: &str) -> Option<&CatalogItem> {
        self.items_by_family
            .values()
            .flatten()
            .find(|item| item.owns_token(offer_token))
    }

    /// True when the token can be purchased from this snapshot
    pub fn contains_token(&self, offer_token: &str) -> bool {
        self.find_by_offer_token(offer_token).is_some()
            || self
                .special_offer
                .as_ref()
                .is_some_and(|s| s.offer.offer_token == offer_token)
    }

    pub fn len(&self) -> usize {
        self.items_by_family.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
