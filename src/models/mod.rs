// Domain and request/response models
pub mod billing;
pub mod catalog;
pub mod common;
pub mod offer;
pub mod paywall;
