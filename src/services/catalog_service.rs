use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument, warn};

use super::classifier::FamilyClassifier;
use crate::{
    error::CatalogError,
    models::{
        catalog::{Catalog, CatalogItem, SpecialOffer},
        offer::{RawOffer, DEFAULT_SPECIAL_OFFER_TAG},
    },
};

type GroupKey = (String, String);

/// Turns provider offer lists into catalogs using an injected family classifier
pub struct CatalogBuilder {
    classifier: Box<dyn FamilyClassifier>,
    special_offer_tag: String,
}

impl CatalogBuilder {
    pub fn new(classifier: Box<dyn FamilyClassifier>) -> Self {
        Self {
            classifier,
            special_offer_tag: DEFAULT_SPECIAL_OFFER_TAG.to_string(),
        }
    }

    pub fn with_special_offer_tag(mut self, tag: impl Into<String>) -> Self {
        self.special_offer_tag = tag.into();
        self
    }

    pub fn build(&self, raw_offers: &[RawOffer]) -> Result<Catalog, CatalogError> {
        build_catalog(raw_offers, self.classifier.as_ref(), &self.special_offer_tag)
    }
}

/// Build a catalog from a flat, unordered list of provider offers.
///
/// Offers are bucketed by `(family, base_plan_id)`. A bucket without a
/// single-phase offer has no recurring price to show and is dropped. When
/// several offers carry the special tag, the last one in input order wins.
#[instrument(skip_all, fields(offers = raw_offers.len()))]
pub fn build_catalog(
    raw_offers: &[RawOffer],
    classifier: &dyn FamilyClassifier,
    special_offer_tag: &str,
) -> Result<Catalog, CatalogError> {
    // Classify everything up front so a bad product aborts before any grouping
    let mut classified = Vec::with_capacity(raw_offers.len());
    for offer in raw_offers {
        let family = classifier
            .classify(offer)
            .ok_or_else(|| CatalogError::UnknownProductFamily {
                product_id: offer.product_id.clone(),
            })?;
        classified.push((family, offer));
    }

    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, Vec<&RawOffer>> = HashMap::new();
    for (family, offer) in &classified {
        let key = (family.clone(), offer.base_plan_id.clone());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(*offer);
    }

    let mut items: HashMap<GroupKey, CatalogItem> = HashMap::new();
    for key in &order {
        let offers = &groups[key];
        match assign_roles(key, offers, special_offer_tag) {
            Some(item) => {
                items.insert(key.clone(), item);
            }
            None => debug!(
                family = %key.0,
                base_plan_id = %key.1,
                "Dropping plan without a single-phase base offer"
            ),
        }
    }

    let mut tagged = classified
        .iter()
        .filter(|(_, offer)| offer.has_tag(special_offer_tag))
        .filter_map(|(family, offer)| {
            items
                .get(&(family.clone(), offer.base_plan_id.clone()))
                .map(|item| (item, *offer))
        })
        .peekable();
    let mut special_offer = None;
    let mut tagged_count = 0usize;
    while let Some((item, offer)) = tagged.next() {
        tagged_count += 1;
        if tagged.peek().is_none() {
            special_offer = Some(SpecialOffer {
                item: item.clone(),
                offer: offer.clone(),
            });
        }
    }
    if tagged_count > 1 {
        warn!(
            tagged = tagged_count,
            "Multiple offers carry the special offer tag, keeping the last one"
        );
    }

    let mut items_by_family: BTreeMap<String, Vec<CatalogItem>> = BTreeMap::new();
    for key in &order {
        if let Some(item) = items.remove(key) {
            items_by_family.entry(key.0.clone()).or_default().push(item);
        }
    }
    for family_items in items_by_family.values_mut() {
        // sort_by_key is stable, equal periods keep provider order
        family_items.sort_by_key(CatalogItem::period_days);
    }

    Ok(Catalog {
        items_by_family,
        special_offer,
    })
}

fn assign_roles(
    (family, base_plan_id): &GroupKey,
    offers: &[&RawOffer],
    special_offer_tag: &str,
) -> Option<CatalogItem> {
    let mut base_plans = offers.iter().filter(|o| o.is_base_plan());
    let base_plan_offer = (*base_plans.next()?).clone();
    if base_plans.next().is_some() {
        debug!(
            family = %family,
            base_plan_id = %base_plan_id,
            "Several single-phase offers in one plan, using the first"
        );
    }

    let trial_offer = offers
        .iter()
        .find(|o| o.has_free_trial())
        .map(|o| (*o).clone());

    Some(CatalogItem {
        product_family: family.clone(),
        base_plan_id: base_plan_id.clone(),
        base_plan_offer,
        trial_offer,
        is_special: offers.iter().any(|o| o.has_tag(special_offer_tag)),
    })
}
