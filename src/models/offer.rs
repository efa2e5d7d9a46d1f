use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tag providers attach to the promotional offer surfaced outside the listing
pub const DEFAULT_SPECIAL_OFFER_TAG: &str = "specialoffer";

/// One pricing phase of a subscription offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPhase {
    /// Duration code of the form `P<n><unit>`
    pub billing_period: String,
    /// Price in micro-units, `0` for a free phase
    pub price_amount_micros: u64,
    pub formatted_price: String,
}

impl PricingPhase {
    pub fn is_free(&self) -> bool {
        self.price_amount_micros == 0
    }
}

/// One purchasable unit as reported by the billing provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    pub product_id: String,
    /// Family reported by the provider itself (product name on newer billing APIs)
    #[serde(default)]
    pub product_family: Option<String>,
    pub base_plan_id: String,
    pub pricing_phases: Vec<PricingPhase>,
    #[serde(default)]
    pub offer_tags: BTreeSet<String>,
    pub offer_token: String,
}

impl RawOffer {
    /// A base plan offer is a pure recurring price with no trial or intro phase
    pub fn is_base_plan(&self) -> bool {
        self.pricing_phases.len() == 1
    }

    /// True when any phase before the recurring one is free
    pub fn has_free_trial(&self) -> bool {
        match self.pricing_phases.split_last() {
            Some((_, leading)) => leading.iter().any(PricingPhase::is_free),
            None => false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.offer_tags.contains(tag)
    }

    /// The recurring phase, which providers always report last
    pub fn recurring_phase(&self) -> Option<&PricingPhase> {
        self.pricing_phases.last()
    }
}
