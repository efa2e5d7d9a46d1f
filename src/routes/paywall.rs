use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::{
        common::SuccessResponse,
        paywall::{
            CatalogView, FamilyResponse, FamilyView, PaywallData, PaywallResponse, RefreshData,
            RefreshResponse,
        },
    },
};

/// GET /api/v1/paywall
#[instrument(skip(state))]
pub async fn get_paywall(State(state): State<AppState>) -> Result<Json<PaywallResponse>> {
    let catalog = state.paywall_service.current();

    Ok(Json(SuccessResponse::new(PaywallData {
        catalog: catalog.as_deref().map(CatalogView::from),
    })))
}

/// GET /api/v1/paywall/families/{family}
#[instrument(skip(state))]
pub async fn get_family(
    State(state): State<AppState>,
    Path(family): Path<String>,
) -> Result<Json<FamilyResponse>> {
    // Still loading: nothing to show yet, which is not an error
    let Some(catalog) = state.paywall_service.current() else {
        return Ok(Json(SuccessResponse::new(None)));
    };

    let view = FamilyView::from_catalog(&catalog, &family)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown product family: {}", family)))?;

    Ok(Json(SuccessResponse::new(Some(view))))
}

/// POST /api/v1/paywall/refresh
#[instrument(skip(state))]
pub async fn refresh_paywall(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let status = state.paywall_service.refresh().await?;

    Ok(Json(SuccessResponse::new(RefreshData::from(status))))
}
