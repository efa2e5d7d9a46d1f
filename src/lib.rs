// Library exports for testing and reuse
pub mod app_state;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app_state::AppState;
pub use config::Config;
pub use error::{ApiError, BillingError, CatalogError, Result};
pub use models::{
    catalog::{Catalog, CatalogItem, SpecialOffer},
    offer::{PricingPhase, RawOffer},
};
pub use services::build_catalog;
pub use utils::{billing_period_days, format_billing_period};
