use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use paywall::{routes::create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::{sample_offers, test_config, ScriptedProvider};

fn app() -> (Router, AppState) {
    let provider = Arc::new(ScriptedProvider::with_offers(sample_offers()));
    let state = AppState::with_provider(test_config(), provider);
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn test_paywall_is_null_while_loading() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/v1/paywall")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["catalog"].is_null());

    let (status, body) = send(&app, get("/api/v1/paywall/families/Premium")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_refresh_then_read_catalog() {
    let (app, _) = app();
    let (status, body) = send(&app, post_json("/api/v1/paywall/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["published"], true);
    assert_eq!(body["data"]["items"], 3);

    let (status, body) = send(&app, get("/api/v1/paywall")).await;
    assert_eq!(status, StatusCode::OK);
    let catalog = &body["data"]["catalog"];
    assert_eq!(catalog["families"][0]["name"], "Premium");
    assert_eq!(catalog["families"][0]["defaultSelection"], "monthly");

    let monthly = &catalog["families"][0]["items"][0];
    assert_eq!(monthly["title"], "7 days free trial, then");
    assert_eq!(monthly["subtitle"], "$9.99 per 1 month");
    assert_eq!(monthly["periodDays"], 30);
    assert_eq!(monthly["purchaseToken"], "premium-monthly-trial");
    assert_eq!(catalog["specialOffer"]["offerToken"], "premium-monthly-trial");

    let (status, body) = send(&app, get("/api/v1/paywall/families/Standard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["basePlanId"], "monthly");

    let (status, body) = send(&app, get("/api/v1/paywall/families/Gold")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_purchase_flow() {
    let (app, state) = app();
    state.paywall_service.refresh().await.unwrap();

    let (status, body) = send(
        &app,
        post_json("/api/v1/purchases", json!({ "offerToken": "standard-monthly" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "purchased");
    assert_eq!(body["data"]["purchase"]["offerToken"], "standard-monthly");

    let (status, body) = send(&app, post_json("/api/v1/purchases/special-offer", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purchase"]["offerToken"], "premium-monthly-trial");

    let (status, body) = send(&app, post_json("/api/v1/purchases/restore", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_purchase_validation_and_unavailable() {
    let (app, state) = app();

    let (status, body) = send(
        &app,
        post_json("/api/v1/purchases", json!({ "offerToken": "standard-monthly" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "CATALOG_UNAVAILABLE");

    state.paywall_service.refresh().await.unwrap();
    let (status, body) = send(&app, post_json("/api/v1/purchases", json!({ "offerToken": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_purchase_updates_endpoint() {
    let (app, _) = app();
    let body = json!({
        "purchases": [{
            "purchaseToken": "p-1",
            "productId": "bc6.premium",
            "offerToken": "premium-monthly",
            "state": "purchased",
            "acknowledged": false,
            "purchaseTime": "1970-01-01T00:00:00Z",
        }]
    });

    let (status, body) = send(&app, post_json("/api/v1/purchases/updates", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["acknowledged"], 1);
    assert_eq!(body["data"]["failed"], 0);
}
