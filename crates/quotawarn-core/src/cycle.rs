//! One evaluation cycle: classify, then deduplicate.
//!
//! The alerter and the deduplicator only meet here, through warning codes.
//! Message text comes from a [`MessageText`] collaborator supplied by the
//! caller; the engine never renders text itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::notify::{Notification, NotificationDeduplicator};
use crate::usage::{Estimate, UsageAlerter, UserStatus};
use crate::warning::{GlobalWarning, LocalWarning, WarningLevel};

/// How members share the account cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingMode {
    /// Members are told about account-level trouble they may be helping cause.
    /// Meant for families without per-member quotas.
    Cooperative,
    /// Members only hear about their own usage. Meant for accounts shared by
    /// relative strangers, each with an individual quota.
    #[default]
    Independent,
}

/// Renders warning codes into human-readable text
pub trait MessageText {
    /// Text for the administrator about the account
    fn global(&self, resource: &str, code: GlobalWarning) -> String;

    /// Text for a member about their own usage
    fn member(&self, resource: &str, code: LocalWarning) -> String;

    /// Text for the administrator about one member
    fn admin_about_member(&self, _resource: &str, _member: &str, code: LocalWarning) -> String {
        code.name().to_string()
    }
}

/// Renders every code as its bare name
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeNames;

impl MessageText for CodeNames {
    fn global(&self, _resource: &str, code: GlobalWarning) -> String {
        code.name().to_string()
    }

    fn member(&self, _resource: &str, code: LocalWarning) -> String {
        code.name().to_string()
    }
}

/// Everything computed during one cycle for one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub resource: String,
    pub billing_fraction: f64,
    pub global_quota: Option<f64>,
    pub global_used: f64,
    pub global_prediction: Estimate,
    pub account_health: GlobalWarning,
    pub members: BTreeMap<String, UserStatus>,
    /// Notifications that survived deduplication, in emission order
    pub notifications: Vec<Notification>,
}

/// Classify the snapshot held by `alerter` and feed every classification
/// through `dedup`.
///
/// Order: the account-wide admin channel first, then per member (sorted by
/// id) the admin-about-member channel followed by the member channel.
pub fn run_cycle(
    alerter: &UsageAlerter,
    dedup: &mut NotificationDeduplicator,
    resource: &str,
    mode: SharingMode,
    text: &dyn MessageText,
) -> CycleReport {
    let account_health = alerter.account_health();
    let members = alerter.statuses();
    let mut notifications = Vec::new();

    notifications.extend(dedup.notify_admin_globally(
        resource,
        Some(account_health),
        &text.global(resource, account_health),
    ));

    for (member, status) in &members {
        let code = status.warning;
        notifications.extend(dedup.notify_admin_about_member(
            member,
            resource,
            code,
            &text.admin_about_member(resource, member, code),
        ));

        let message = member_message(text, resource, mode, code, account_health);
        notifications.extend(dedup.notify_member(member, resource, code, &message));
    }

    info!(
        resource,
        account = account_health.name(),
        members = members.len(),
        notifications = notifications.len(),
        "cycle evaluated"
    );

    CycleReport {
        resource: resource.to_string(),
        billing_fraction: alerter.billing_fraction(),
        global_quota: alerter.global_quota(),
        global_used: alerter.global_used(),
        global_prediction: alerter.global_usage_prediction(),
        account_health,
        members,
        notifications,
    }
}

/// Member-facing text. In cooperative mode an account heading over its cap
/// outranks the member's own code.
fn member_message(
    text: &dyn MessageText,
    resource: &str,
    mode: SharingMode,
    code: LocalWarning,
    account: GlobalWarning,
) -> String {
    match (mode, account) {
        (SharingMode::Cooperative, GlobalWarning::Overage | GlobalWarning::Overuse) => {
            text.global(resource, account)
        }
        _ => text.member(resource, code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecipientKind;
    use crate::usage::UsageSnapshot;
    use crate::warning::WarningCode;
    use pretty_assertions::assert_eq;

    struct Tagged;

    impl MessageText for Tagged {
        fn global(&self, resource: &str, code: GlobalWarning) -> String {
            format!("global:{resource}:{code}")
        }

        fn member(&self, resource: &str, code: LocalWarning) -> String {
            format!("member:{resource}:{code}")
        }
    }

    fn scenario() -> UsageAlerter {
        UsageAlerter::new(
            UsageSnapshot::new(0.8, Some(6.0))
                .with_member("john", Some(2.0), 0.1)
                .with_member("david", Some(4.0), 7.1),
        )
        .unwrap()
    }

    #[test]
    fn test_emission_order() {
        let mut dedup = NotificationDeduplicator::default();
        let report = run_cycle(&scenario(), &mut dedup, "data", SharingMode::Independent, &Tagged);

        let order: Vec<(RecipientKind, Option<&str>)> = report
            .notifications
            .iter()
            .map(|n| (n.recipient_kind, n.recipient_id.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                (RecipientKind::AdminGlobal, None),
                (RecipientKind::AdminAboutMember, Some("david")),
                (RecipientKind::Member, Some("david")),
                (RecipientKind::AdminAboutMember, Some("john")),
                (RecipientKind::Member, Some("john")),
            ]
        );
        assert_eq!(report.account_health, GlobalWarning::Overage);
        assert_eq!(report.notifications[2].message, "member:data:Overage");
        assert_eq!(report.notifications[1].message, "Overage");
    }

    #[test]
    fn test_second_cycle_is_quiet() {
        let mut dedup = NotificationDeduplicator::default();
        let alerter = scenario();
        run_cycle(&alerter, &mut dedup, "data", SharingMode::Independent, &CodeNames);
        let report = run_cycle(&alerter, &mut dedup, "data", SharingMode::Independent, &CodeNames);
        assert!(report.notifications.is_empty());
        assert_eq!(report.members.len(), 2);
    }

    #[test]
    fn test_cooperative_mode_uses_account_text() {
        let mut dedup = NotificationDeduplicator::default();
        let report = run_cycle(&scenario(), &mut dedup, "data", SharingMode::Cooperative, &Tagged);
        let john = report
            .notifications
            .iter()
            .find(|n| n.recipient_kind == RecipientKind::Member && n.recipient_id.as_deref() == Some("john"))
            .expect("john is notified");
        assert_eq!(john.message, "global:data:Overage");
        // The code stays the member's own
        assert_eq!(john.code, WarningCode::Local(LocalWarning::Underuse));
    }

    #[test]
    fn test_cooperative_mode_text_follows_account_health() {
        let alerter =
            UsageAlerter::new(UsageSnapshot::new(0.2, Some(6.0)).with_member("yuri", None, 4.0))
                .unwrap();
        let mut dedup = NotificationDeduplicator::default();
        let report = run_cycle(&alerter, &mut dedup, "SMS", SharingMode::Cooperative, &Tagged);
        // 4/6 is above the 0.6 allowance at 0.2, so the account is in overuse too
        assert_eq!(report.account_health, GlobalWarning::Overuse);

        let alerter =
            UsageAlerter::new(UsageSnapshot::new(0.2, None).with_member("yuri", Some(1.0), 0.9))
                .unwrap();
        let mut dedup = NotificationDeduplicator::default();
        let report = run_cycle(&alerter, &mut dedup, "SMS", SharingMode::Cooperative, &Tagged);
        let yuri = report
            .notifications
            .iter()
            .find(|n| n.recipient_kind == RecipientKind::Member)
            .expect("yuri is notified");
        assert_eq!(yuri.message, "member:SMS:Overuse");
    }
}
