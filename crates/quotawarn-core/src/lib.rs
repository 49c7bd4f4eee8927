//! Core library for quotawarn.
//!
//! Classifies usage of a shared, quota-bound resource (voice, SMS, data) into
//! account-level and member-level warnings, and deduplicates those warnings
//! across evaluation cycles so a human only hears about changes.

pub mod cycle;
pub mod error;
pub mod notify;
pub mod usage;
pub mod warning;

pub use cycle::{run_cycle, CodeNames, CycleReport, MessageText, SharingMode};
pub use error::{AlerterError, ConfigurationError, StoreError};
pub use notify::{
    FileStateStore, GlobalRepeat, MemoryStateStore, Notification, NotificationDeduplicator,
    NotificationOutbox, NotificationState, RecipientKind, StateStore, Transition,
};
pub use usage::{Estimate, MemberUsage, UsageAlerter, UsageSnapshot, UserStatus};
pub use warning::{GlobalWarning, LocalWarning, WarningCode, WarningLevel};
