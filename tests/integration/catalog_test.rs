use paywall::{
    build_catalog, format_billing_period,
    services::{ExplicitFamilyClassifier, PrefixClassifier},
    CatalogError, RawOffer,
};

use super::{offer, phase, sample_offers, with_tag};

fn classifier() -> PrefixClassifier {
    PrefixClassifier::default()
        .with_rule("bc6.premium", "Premium")
        .with_rule("bc6.standard", "Standard")
}

#[test]
fn test_every_item_owns_only_its_group() {
    let offers = sample_offers();
    let catalog = build_catalog(&offers, &classifier(), "specialoffer").unwrap();

    for (family, items) in &catalog.items_by_family {
        for item in items {
            assert_eq!(&item.product_family, family);
            assert_eq!(item.base_plan_offer.base_plan_id, item.base_plan_id);
            if let Some(trial) = &item.trial_offer {
                assert_eq!(trial.base_plan_id, item.base_plan_id);
                assert_eq!(trial.product_id, item.base_plan_offer.product_id);
            }
        }

        // (family, base plan) is unique within the catalog
        let mut plans: Vec<_> = items.iter().map(|i| i.base_plan_id.as_str()).collect();
        plans.sort();
        plans.dedup();
        assert_eq!(plans.len(), items.len());
    }
}

#[test]
fn test_period_days_non_decreasing() {
    let mut offers = sample_offers();
    offers.push(offer("bc6.premium", "weekly", vec![phase("P1W", 1, "$1")], "w"));
    offers.push(offer("bc6.premium", "quarterly", vec![phase("P3M", 1, "$20")], "q"));
    offers.push(offer("bc6.premium", "daily", vec![phase("P1D", 1, "$0.10")], "d"));

    let catalog = build_catalog(&offers, &classifier(), "specialoffer").unwrap();
    let days: Vec<u32> = catalog
        .items("Premium")
        .unwrap()
        .iter()
        .map(|i| i.period_days())
        .collect();

    assert_eq!(days, vec![1, 7, 30, 90, 365]);
}

#[test]
fn test_special_offer_cardinality() {
    let offers: Vec<RawOffer> = sample_offers()
        .into_iter()
        .map(|o| with_tag(o, "specialoffer"))
        .collect();

    let catalog = build_catalog(&offers, &classifier(), "specialoffer").unwrap();
    let special = catalog.special_offer.as_ref().unwrap();
    assert_eq!(special.offer.offer_token, "standard-monthly");
    assert!(catalog.items_by_family.values().flatten().all(|i| i.is_special));
}

#[test]
fn test_sample_scenario() {
    let catalog = build_catalog(&sample_offers(), &classifier(), "specialoffer").unwrap();

    let premium = catalog.items("Premium").unwrap();
    assert_eq!(premium.len(), 2);
    let monthly = &premium[0];
    assert_eq!(monthly.base_plan_id, "monthly");
    assert_eq!(monthly.base_plan_offer.offer_token, "premium-monthly");
    assert_eq!(
        monthly.trial_offer.as_ref().map(|o| o.offer_token.as_str()),
        Some("premium-monthly-trial")
    );
    assert!(monthly.is_special);
    assert_eq!(catalog.special_offer.as_ref().unwrap().item, *monthly);
    assert_eq!(monthly.purchase_token(), "premium-monthly-trial");

    let yearly = &premium[1];
    assert!(!yearly.is_special);
    assert_eq!(yearly.title(), None);
    assert_eq!(yearly.subtitle(), "$79.99 per 1 year");

    assert!(catalog.contains_token("premium-monthly"));
    assert!(catalog.contains_token("standard-monthly"));
    assert!(!catalog.contains_token("gold-monthly"));
}

#[test]
fn test_unknown_product_aborts_build() {
    let mut offers = sample_offers();
    offers.insert(1, offer("bc6.gold", "monthly", vec![phase("P1M", 1, "$1")], "gold"));

    let result = build_catalog(&offers, &classifier(), "specialoffer");
    assert_eq!(
        result,
        Err(CatalogError::UnknownProductFamily {
            product_id: "bc6.gold".to_string()
        })
    );
}

#[test]
fn test_rebuild_is_idempotent() {
    let offers = sample_offers();
    let classifier = classifier();
    assert_eq!(
        build_catalog(&offers, &classifier, "specialoffer"),
        build_catalog(&offers, &classifier, "specialoffer")
    );
}

#[test]
fn test_explicit_family_groups_by_reported_name() {
    let mut premium = offer("bc5.premium", "monthly", vec![phase("P1M", 1, "$5")], "p");
    premium.product_family = Some("Premium".to_string());
    let standard = offer("bc5.standard", "monthly", vec![phase("P1M", 1, "$3")], "s");

    let catalog = build_catalog(&[premium, standard], &ExplicitFamilyClassifier, "specialoffer")
        .unwrap();
    assert_eq!(
        catalog.families().collect::<Vec<_>>(),
        vec!["Premium", "bc5.standard"]
    );
}

#[test]
fn test_format_examples() {
    assert_eq!(format_billing_period("P1D"), "1 day");
    assert_eq!(format_billing_period("P7D"), "7 days");
    assert_eq!(format_billing_period("P1Y"), "1 year");
    assert_eq!(paywall::billing_period_days("P1Y"), 365);
    assert_eq!(format_billing_period("P3X"), "Unknown");
}
