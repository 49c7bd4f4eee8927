//! Notification records handed to the external notifier.

use serde::{Deserialize, Serialize};

use crate::warning::WarningCode;

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// The member whose usage triggered it
    Member,
    /// The account administrator, about one member
    AdminAboutMember,
    /// The account administrator, about the whole account
    AdminGlobal,
}

/// A warning that survived deduplication and should be delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient_kind: RecipientKind,
    /// Member id for member-scoped notifications, `None` for global ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub resource: String,
    pub code: WarningCode,
    pub message: String,
}

/// How a single dedup call moved a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Unset -> warned (emitted)
    Raised,
    /// Warned -> warned with a different code (emitted)
    Changed,
    /// Same warning emitted again (global channel under `EveryCycle`)
    Repeated,
    /// Warned -> same code (silent)
    Unchanged,
    /// Warned -> unset (silent)
    Cleared,
    /// Unset -> unset (silent)
    Quiet,
}

impl Transition {
    /// Whether this transition produces a notification
    pub fn emits(&self) -> bool {
        matches!(
            self,
            Transition::Raised | Transition::Changed | Transition::Repeated
        )
    }
}
