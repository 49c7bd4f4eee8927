//! Error types for the warning engine.

use std::path::PathBuf;

use thiserror::Error;

/// A usage snapshot that cannot be evaluated.
///
/// These indicate a misconfigured account upstream, not a usage event, so
/// they are raised once at construction and never during evaluation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// Every member has a quota and together they exceed the account quota
    #[error("individual quotas ({individual_sum}) are larger than the account quota ({global_quota})")]
    QuotaSumExceedsGlobal {
        individual_sum: f64,
        global_quota: f64,
    },

    /// Billing fraction outside [0, 1] or not a number
    #[error("billing fraction {value} is outside [0, 1]")]
    BillingFractionOutOfRange { value: f64 },

    /// A quota or usage amount is negative or not finite
    #[error("invalid {field} for {owner}: {value}")]
    InvalidAmount {
        owner: String,
        field: &'static str,
        value: f64,
    },
}

/// Error type for per-cycle alerter queries
#[derive(Debug, Error, PartialEq)]
pub enum AlerterError {
    /// The requested member is not part of the snapshot
    #[error("member not found: {member}")]
    UnknownMember { member: String },
}

/// Error type for notification state persistence
#[derive(Debug, Error)]
pub enum StoreError {
    /// Account or resource id contains characters unsafe for a file name
    #[error("invalid state id '{id}': only alphanumeric, '-' and '_' are allowed")]
    InvalidId { id: String },

    /// Reading or writing the state file failed
    #[error("state file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file exists but does not decode
    #[error("failed to parse state file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The state could not be encoded
    #[error("failed to serialize notification state: {0}")]
    Serialize(#[from] serde_json::Error),
}
