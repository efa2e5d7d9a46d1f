pub mod billing_period;

pub use billing_period::{billing_period_days, format_billing_period, BillingPeriod};
