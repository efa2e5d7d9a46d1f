use paywall::{
    error::{ApiError, BillingError},
    models::billing::{PurchaseOutcome, PurchaseState},
    services::{BillingProvider, FixtureBillingProvider, RefreshStatus},
    AppState,
};
use std::sync::Arc;

use super::{purchased, sample_offers, test_config};

const OFFERS_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/offers.json");

fn state_with(provider: Arc<FixtureBillingProvider>, reconnect_attempts: u8) -> AppState {
    let mut config = test_config();
    config.billing.reconnect_attempts = reconnect_attempts;
    AppState::with_provider(config, provider)
}

#[tokio::test]
async fn test_fixture_file_survives_lost_connection() {
    let provider = Arc::new(FixtureBillingProvider::from_file(OFFERS_FIXTURE).unwrap());
    let state = state_with(provider.clone(), 2);

    let status = state.paywall_service.refresh().await.unwrap();
    assert_eq!(status, RefreshStatus::Published { items: 5 });
    assert!(provider.is_connected());

    let catalog = state.paywall_service.current().unwrap();
    assert_eq!(catalog.families().collect::<Vec<_>>(), vec!["Premium", "Standard"]);
    assert_eq!(
        catalog.special_offer.as_ref().unwrap().offer.offer_token,
        "premium-yearly-special"
    );

    provider.disconnect();
    let status = state.paywall_service.refresh().await.unwrap();
    assert_eq!(status, RefreshStatus::Published { items: 5 });
    assert!(provider.is_connected());
}

#[tokio::test]
async fn test_first_refresh_connects_without_reconnect_budget() {
    let provider = Arc::new(FixtureBillingProvider::new(sample_offers()));
    let state = state_with(provider.clone(), 0);

    let status = state.paywall_service.refresh().await.unwrap();
    assert_eq!(status, RefreshStatus::Published { items: 3 });
    let before = state.paywall_service.current().unwrap();

    // With no reconnect budget a lost connection fails the refresh once
    provider.disconnect();
    assert!(matches!(
        state.paywall_service.refresh().await,
        Err(ApiError::Billing(BillingError::ServiceDisconnected))
    ));
    assert!(Arc::ptr_eq(&before, &state.paywall_service.current().unwrap()));

    // and the next refresh connects again
    state.paywall_service.refresh().await.unwrap();
    assert!(provider.is_connected());
}

#[tokio::test]
async fn test_failed_acknowledgement_does_not_stop_the_batch() {
    let provider = Arc::new(FixtureBillingProvider::new(sample_offers()));
    let state = state_with(provider.clone(), 2);
    state.paywall_service.refresh().await.unwrap();

    // Bought outside the service, so still waiting for acknowledgement
    let real = match provider.launch_purchase("standard-monthly").await.unwrap() {
        PurchaseOutcome::Purchased(p) => p,
        other => panic!("unexpected outcome {:?}", other),
    };
    let unknown = purchased("not-a-purchase", false);

    let report = state
        .paywall_service
        .handle_purchases_updated(&[unknown, real.clone()])
        .await;

    assert_eq!(report.acknowledged, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].purchase_token, "not-a-purchase");
    assert!(matches!(report.failed[0].error, BillingError::UnknownPurchase(_)));

    let restored = provider.restore_purchases().await.unwrap();
    assert_eq!(restored.len(), 1);
    assert!(restored[0].acknowledged);
}

#[tokio::test]
async fn test_pending_purchase_is_acknowledged_once_settled() {
    let provider = Arc::new(FixtureBillingProvider::new(sample_offers()));
    let state = state_with(provider.clone(), 2);
    state.paywall_service.refresh().await.unwrap();
    provider.set_deferred_payments(true);

    let pending = match state.paywall_service.purchase("premium-monthly").await.unwrap() {
        PurchaseOutcome::Pending(p) => p,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(pending.state, PurchaseState::Pending);

    let restored = state.paywall_service.restore_purchases().await.unwrap();
    assert!(!restored[0].acknowledged);

    let settled = provider
        .complete_pending_purchase(&pending.purchase_token)
        .await
        .unwrap();
    let report = state
        .paywall_service
        .handle_purchases_updated(&[settled.clone()])
        .await;
    assert_eq!(report.acknowledged, 1);

    let report = state.paywall_service.handle_purchases_updated(&[settled]).await;
    assert_eq!(report.acknowledged, 0);
    assert!(report.failed.is_empty());
}
