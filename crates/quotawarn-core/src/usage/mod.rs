//! Usage classification: turn a snapshot into account and member warnings.
//!
//! [`UsageAlerter`] is stateless per evaluation: it knows nothing about
//! previous cycles or about who gets notified.

pub mod alerter;
pub mod cycle;
pub mod thresholds;
pub mod types;

pub use alerter::UsageAlerter;
pub use cycle::{billing_fraction, days_in_month};
pub use types::{Estimate, MemberUsage, UsageSnapshot, UserStatus};
