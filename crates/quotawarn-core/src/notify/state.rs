//! Dedup memory persisted between evaluation cycles.
//!
//! An absent entry means the last known state was Ok. Ok itself is never
//! stored, so "absent" and "stored Ok" cannot both occur after a cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::Transition;
use crate::warning::{GlobalWarning, LocalWarning, WarningLevel};

/// Last emitted member warning, keyed by member id then resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberChannel(BTreeMap<String, BTreeMap<String, LocalWarning>>);

impl MemberChannel {
    /// Remembered code for `(member, resource)`, `None` meaning Ok
    pub fn get(&self, member: &str, resource: &str) -> Option<LocalWarning> {
        self.0.get(member).and_then(|r| r.get(resource)).copied()
    }

    /// Number of remembered warnings across all members
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply one observation and return the transition it caused
    pub(crate) fn observe(&mut self, member: &str, resource: &str, code: LocalWarning) -> Transition {
        let transition = classify(self.get(member, resource), code);
        match transition {
            Transition::Raised | Transition::Changed => {
                self.0
                    .entry(member.to_string())
                    .or_default()
                    .insert(resource.to_string(), code);
            }
            Transition::Cleared => {
                if let Some(resources) = self.0.get_mut(member) {
                    resources.remove(resource);
                    if resources.is_empty() {
                        self.0.remove(member);
                    }
                }
            }
            Transition::Repeated | Transition::Unchanged | Transition::Quiet => {}
        }
        transition
    }

    /// Drop explicitly stored Ok entries (only possible in hand-edited files)
    fn prune_ok(&mut self) {
        for resources in self.0.values_mut() {
            resources.retain(|_, code| !code.is_ok());
        }
        self.0.retain(|_, resources| !resources.is_empty());
    }
}

/// Complete dedup memory for one account and resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    /// What each member was last told
    #[serde(default)]
    pub member: MemberChannel,
    /// What the administrator was last told about each member
    #[serde(default)]
    pub admin_about_member: MemberChannel,
    /// What the administrator was last told about the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalWarning>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when every channel is back to Ok
    pub fn is_clear(&self) -> bool {
        self.member.is_empty() && self.admin_about_member.is_empty() && self.global.is_none()
    }

    /// Restore the absence-means-Ok invariant on freshly loaded state
    pub fn normalize(&mut self) {
        self.member.prune_ok();
        self.admin_about_member.prune_ok();
        if self.global.is_some_and(|g| g.is_ok()) {
            self.global = None;
        }
    }
}

/// Decide the transition for a per-key channel.
pub(crate) fn classify<W: WarningLevel>(previous: Option<W>, next: W) -> Transition {
    match previous {
        None if next.is_ok() => Transition::Quiet,
        None => Transition::Raised,
        Some(prev) if prev == next => Transition::Unchanged,
        Some(_) if next.is_ok() => Transition::Cleared,
        Some(_) => Transition::Changed,
    }
}
