use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::billing::BillingResponseCode;

/// Failures while turning provider records into a catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The classifier has no rule for this product; the declared product
    /// catalog and the provider response have drifted apart.
    #[error("Unknown product family for product {product_id}")]
    UnknownProductFamily { product_id: String },
}

/// Failures reported by a billing provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    #[error("Billing service disconnected")]
    ServiceDisconnected,

    #[error("Billing client not ready")]
    NotReady,

    #[error("Purchase failed: {}", .0.as_str())]
    PurchaseFailed(BillingResponseCode),

    #[error("Unknown purchase token: {0}")]
    UnknownPurchase(String),
}

impl BillingError {
    pub fn response_code(&self) -> BillingResponseCode {
        match self {
            BillingError::ServiceDisconnected => BillingResponseCode::ServiceDisconnected,
            BillingError::NotReady => BillingResponseCode::ServiceUnavailable,
            BillingError::PurchaseFailed(code) => *code,
            BillingError::UnknownPurchase(_) => BillingResponseCode::DeveloperError,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Catalog configuration error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog not available yet")]
    CatalogUnavailable,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Catalog(ref e) => {
                tracing::error!("Catalog configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_CONFIGURATION_ERROR",
                    e.to_string(),
                )
            }
            ApiError::Billing(ref e) => {
                let (status, code) = match e.response_code() {
                    BillingResponseCode::UserCanceled => (StatusCode::CONFLICT, "PURCHASE_CANCELLED"),
                    BillingResponseCode::ItemAlreadyOwned => {
                        (StatusCode::CONFLICT, "ITEM_ALREADY_OWNED")
                    }
                    BillingResponseCode::ItemUnavailable => {
                        (StatusCode::NOT_FOUND, "ITEM_UNAVAILABLE")
                    }
                    BillingResponseCode::ServiceDisconnected
                    | BillingResponseCode::ServiceUnavailable
                    | BillingResponseCode::BillingUnavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "BILLING_UNAVAILABLE")
                    }
                    _ => {
                        tracing::error!("Billing provider error: {}", e);
                        (StatusCode::BAD_GATEWAY, "BILLING_ERROR")
                    }
                };
                (status, code, e.to_string())
            }
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::CatalogUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CATALOG_UNAVAILABLE",
                "No offers have been loaded yet".to_string(),
            ),
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;
