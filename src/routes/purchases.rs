use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::{
        common::SuccessResponse,
        paywall::{
            PurchaseRequest, PurchaseResponse, PurchasesUpdatedData, PurchasesUpdatedRequest,
            PurchasesUpdatedResponse, RestoreResponse,
        },
    },
};

/// POST /api/v1/purchases
#[instrument(skip(state, request))]
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let outcome = state.paywall_service.purchase(&request.offer_token).await?;

    Ok(Json(SuccessResponse::new(outcome)))
}

/// POST /api/v1/purchases/special-offer
#[instrument(skip(state))]
pub async fn purchase_special_offer(
    State(state): State<AppState>,
) -> Result<Json<PurchaseResponse>> {
    let outcome = state.paywall_service.purchase_special_offer().await?;

    Ok(Json(SuccessResponse::new(outcome)))
}

/// POST /api/v1/purchases/updates
#[instrument(skip(state, request))]
pub async fn purchases_updated(
    State(state): State<AppState>,
    Json(request): Json<PurchasesUpdatedRequest>,
) -> Result<Json<PurchasesUpdatedResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let report = state
        .paywall_service
        .handle_purchases_updated(&request.purchases)
        .await;

    Ok(Json(SuccessResponse::new(PurchasesUpdatedData::from(report))))
}

/// POST /api/v1/purchases/restore
#[instrument(skip(state))]
pub async fn restore_purchases(State(state): State<AppState>) -> Result<Json<RestoreResponse>> {
    let purchases = state.paywall_service.restore_purchases().await?;

    Ok(Json(SuccessResponse::new(purchases)))
}
