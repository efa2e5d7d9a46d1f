// Route modules
pub mod paywall;
pub mod purchases;

use crate::{app_state::AppState, middleware::logging_middleware, models::common::MessageResponse};
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_millis(state.config.server.request_timeout_ms);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(CorsLayer::permissive())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    let paywall_routes = Router::new()
        .route("/paywall", get(paywall::get_paywall))
        .route("/paywall/families/{family}", get(paywall::get_family))
        .route("/paywall/refresh", post(paywall::refresh_paywall));

    let purchase_routes = Router::new()
        .route("/purchases", post(purchases::purchase))
        .route(
            "/purchases/special-offer",
            post(purchases::purchase_special_offer),
        )
        .route("/purchases/updates", post(purchases::purchases_updated))
        .route("/purchases/restore", post(purchases::restore_purchases));

    // Request/response logging with token redaction
    Router::new()
        .merge(paywall_routes)
        .merge(purchase_routes)
        .layer(middleware::from_fn(logging_middleware))
}

/// GET /health
async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new("ok"))
}
