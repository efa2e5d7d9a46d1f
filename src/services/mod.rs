// Service modules
pub mod billing_provider;
pub mod catalog_service;
pub mod classifier;
pub mod paywall_service;

pub use billing_provider::{BillingProvider, FixtureBillingProvider};
pub use catalog_service::{build_catalog, CatalogBuilder};
pub use classifier::{ExplicitFamilyClassifier, FamilyClassifier, PrefixClassifier};
pub use paywall_service::{PaywallService, RefreshStatus};
