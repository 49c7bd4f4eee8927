//! Change detection over the three notification channels.
//!
//! The evaluator runs periodically (typically daily), and nobody wants the
//! same warning every day. A notification is produced only when a channel's
//! code changes to a non-Ok value. Returning to Ok clears the memory without
//! an all-clear message, so the next warning of the same kind is fresh news.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::state::NotificationState;
use super::types::{Notification, RecipientKind, Transition};
use crate::warning::{GlobalWarning, LocalWarning, WarningCode, WarningLevel};

/// How the account-wide channel treats a warning that persists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRepeat {
    /// Report a sustained account warning once, like the member channels
    #[default]
    OnChange,
    /// Report every non-Ok account warning on every cycle
    EveryCycle,
}

/// Stateful deduplicator for one account and resource family.
///
/// Owns its [`NotificationState`]; load it from a
/// [`StateStore`](super::store::StateStore) before a cycle and save
/// [`state`](Self::state) afterwards.
#[derive(Debug, Clone, Default)]
pub struct NotificationDeduplicator {
    state: NotificationState,
    global_repeat: GlobalRepeat,
}

impl NotificationDeduplicator {
    pub fn new(state: NotificationState) -> Self {
        Self {
            state,
            global_repeat: GlobalRepeat::default(),
        }
    }

    pub fn with_global_repeat(mut self, policy: GlobalRepeat) -> Self {
        self.global_repeat = policy;
        self
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn into_state(self) -> NotificationState {
        self.state
    }

    /// Warn a member about their own usage of `resource`
    pub fn notify_member(
        &mut self,
        member: &str,
        resource: &str,
        code: LocalWarning,
        text: &str,
    ) -> Option<Notification> {
        let transition = self.state.member.observe(member, resource, code);
        log_transition("member", Some(member), resource, code, transition);
        emit(
            transition,
            RecipientKind::Member,
            Some(member),
            resource,
            code.into(),
            text,
        )
    }

    /// Tell the administrator about one member. Tracked separately from the
    /// member's own channel.
    pub fn notify_admin_about_member(
        &mut self,
        member: &str,
        resource: &str,
        code: LocalWarning,
        text: &str,
    ) -> Option<Notification> {
        let transition = self.state.admin_about_member.observe(member, resource, code);
        log_transition("admin_about_member", Some(member), resource, code, transition);
        emit(
            transition,
            RecipientKind::AdminAboutMember,
            Some(member),
            resource,
            code.into(),
            text,
        )
    }

    /// Tell the administrator about the account as a whole.
    ///
    /// A single value is remembered regardless of `resource`; keep one
    /// deduplicator per resource. `None` and Ok both clear silently.
    pub fn notify_admin_globally(
        &mut self,
        resource: &str,
        code: Option<GlobalWarning>,
        text: &str,
    ) -> Option<Notification> {
        let code = code.filter(|c| !c.is_ok());
        let previous = self.state.global;

        let transition = match code {
            None => {
                self.state.global = None;
                if previous.is_some() {
                    Transition::Cleared
                } else {
                    Transition::Quiet
                }
            }
            Some(c) => {
                let transition = match previous {
                    None => Transition::Raised,
                    Some(p) if p != c => Transition::Changed,
                    Some(_) => match self.global_repeat {
                        GlobalRepeat::OnChange => Transition::Unchanged,
                        GlobalRepeat::EveryCycle => Transition::Repeated,
                    },
                };
                self.state.global = Some(c);
                transition
            }
        };

        let logged = code.unwrap_or_default();
        log_transition("admin_global", None, resource, logged, transition);
        emit(
            transition,
            RecipientKind::AdminGlobal,
            None,
            resource,
            logged.into(),
            text,
        )
    }
}

fn emit(
    transition: Transition,
    recipient_kind: RecipientKind,
    recipient_id: Option<&str>,
    resource: &str,
    code: WarningCode,
    text: &str,
) -> Option<Notification> {
    if !transition.emits() {
        return None;
    }
    Some(Notification {
        recipient_kind,
        recipient_id: recipient_id.map(str::to_string),
        resource: resource.to_string(),
        code,
        message: text.to_string(),
    })
}

fn log_transition<W: WarningLevel>(
    channel: &str,
    member: Option<&str>,
    resource: &str,
    code: W,
    transition: Transition,
) {
    if transition.emits() {
        info!(
            channel,
            member = member.unwrap_or("-"),
            resource,
            code = code.name(),
            ?transition,
            "notification issued"
        );
    } else {
        debug!(
            channel,
            member = member.unwrap_or("-"),
            resource,
            code = code.name(),
            ?transition,
            "notification suppressed"
        );
    }
}
