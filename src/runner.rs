//! One scheduled run: evaluate every resource of an account once.

use anyhow::{Context, Result};
use quotawarn_core::{
    run_cycle, CycleReport, FileStateStore, MemoryStateStore, MessageText,
    NotificationDeduplicator, NotificationOutbox, StateStore, UsageAlerter,
};
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::input::AccountUsage;

/// Result of evaluating every resource in an input file
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Reports for resources that were evaluated
    pub reports: Vec<CycleReport>,
    /// Resources skipped because their snapshot was misconfigured
    pub rejected: Vec<(String, String)>,
}

/// Evaluate each resource, persisting dedup state per account and resource.
///
/// A misconfigured resource is logged and skipped; the others still run.
/// A resource's state is saved only after all of its notifications reached
/// the outbox. With `dry_run`, nothing is written.
pub fn run(
    settings: &Settings,
    usage: &AccountUsage,
    text: &dyn MessageText,
    dry_run: bool,
) -> Result<RunOutcome> {
    let bf = usage.billing_fraction()?;
    info!(
        account = %usage.account,
        billing_fraction = bf,
        "You are {:.0}% of the way into the billing cycle",
        bf * 100.0
    );

    let mut outbox = NotificationOutbox::new(
        settings.outbox.enabled && !dry_run,
        &settings.outbox_dir(),
        settings.outbox.max_size_bytes,
    );
    let mut outcome = RunOutcome::default();

    for (resource, resource_usage) in &usage.resources {
        let alerter = match UsageAlerter::new(usage.snapshot(resource_usage, bf)) {
            Ok(alerter) => alerter,
            Err(e) => {
                error!(resource = %resource, "Skipping misconfigured resource: {}", e);
                outcome.rejected.push((resource.clone(), e.to_string()));
                continue;
            }
        };

        let file_store = FileStateStore::new(&settings.state_dir, &usage.account, resource)
            .with_context(|| format!("Invalid state location for {}/{}", usage.account, resource))?;
        let store: Box<dyn StateStore> = if dry_run {
            debug!(resource = %resource, "dry run, state kept in memory");
            let saved = file_store
                .load()
                .with_context(|| format!("Failed to load notification state for {}", resource))?;
            Box::new(MemoryStateStore::with_state(saved))
        } else {
            Box::new(file_store)
        };
        let state = store
            .load()
            .with_context(|| format!("Failed to load notification state for {}", resource))?;

        let mut dedup = NotificationDeduplicator::new(state).with_global_repeat(settings.global_repeat);
        let report = run_cycle(&alerter, &mut dedup, resource, settings.mode, text);

        for notification in &report.notifications {
            outbox.record(notification).with_context(|| {
                format!(
                    "Failed to write {} notification to {:?}; state not saved",
                    resource,
                    outbox.path()
                )
            })?;
        }

        store
            .save(dedup.state())
            .with_context(|| format!("Failed to save notification state for {}", resource))?;

        outcome.reports.push(report);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::PlainText;
    use pretty_assertions::assert_eq;
    use quotawarn_core::{LocalWarning, RecipientKind};

    const USAGE: &str = r#"
        account = "family"
        billing_fraction = 0.8

        [resources.data]
        global_quota = 6.0
        members.john = { quota = 2.0, used = 0.1 }
        members.david = { quota = 4.0, used = 7.1 }

        [resources.voice]
        global_quota = 1.0
        members.philip = { quota = 2.0, used = 0.5 }
    "#;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            state_dir: dir.join("state"),
            ..Settings::default()
        }
    }

    #[test]
    fn test_run_persists_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let usage = AccountUsage::parse(USAGE, None).unwrap();

        let first = run(&settings, &usage, &PlainText, false).unwrap();
        assert_eq!(first.reports.len(), 1);
        assert_eq!(first.rejected.len(), 1);
        assert_eq!(first.rejected[0].0, "voice");

        let data = &first.reports[0];
        assert_eq!(data.members["john"].warning, LocalWarning::Underuse);
        assert_eq!(data.notifications.len(), 5);
        assert_eq!(data.notifications[0].recipient_kind, RecipientKind::AdminGlobal);

        let outbox = std::fs::read_to_string(dir.path().join("state/notifications.ndjson")).unwrap();
        assert_eq!(outbox.lines().count(), 5);
        assert!(dir.path().join("state/family/data.json").exists());

        let second = run(&settings, &usage, &PlainText, false).unwrap();
        assert!(second.reports[0].notifications.is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let usage = AccountUsage::parse(USAGE, None).unwrap();

        let first = run(&settings, &usage, &PlainText, true).unwrap();
        assert_eq!(first.reports[0].notifications.len(), 5);
        assert!(!dir.path().join("state").exists());

        let second = run(&settings, &usage, &PlainText, true).unwrap();
        assert_eq!(second.reports[0].notifications.len(), 5);
    }

    #[test]
    fn test_outbox_failure_keeps_warnings_pending() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut settings = settings(dir.path());
        settings.outbox.dir = Some(blocker.join("outbox"));
        let usage = AccountUsage::parse(
            r#"
                account = "family"
                billing_fraction = 0.8

                [resources.data]
                global_quota = 6.0
                members.david = { quota = 4.0, used = 7.1 }
            "#,
            None,
        )
        .unwrap();

        let err = run(&settings, &usage, &PlainText, false).unwrap_err();
        assert!(format!("{:#}", err).contains("state not saved"));
        assert!(!dir.path().join("state/family/data.json").exists());

        settings.outbox.dir = Some(dir.path().join("outbox"));
        let retry = run(&settings, &usage, &PlainText, false).unwrap();
        assert_eq!(retry.reports[0].notifications.len(), 3);

        let outbox = std::fs::read_to_string(dir.path().join("outbox/notifications.ndjson")).unwrap();
        assert_eq!(outbox.lines().count(), 3);
    }

    #[test]
    fn test_invalid_account_id() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let usage = AccountUsage::parse(
            "account = \"../escape\"\nbilling_fraction = 0.5\n[resources.data]\nglobal_quota = 1.0\n",
            None,
        )
        .unwrap();
        assert!(run(&settings, &usage, &PlainText, false).is_err());
    }
}
