//! Terminal output for an evaluated cycle

use std::io::{self, Write};

use quotawarn_core::{
    CycleReport, Estimate, GlobalWarning, LocalWarning, MessageText, Notification, RecipientKind,
};

/// Whether color output is enabled (TTY + NO_COLOR not set)
fn use_color() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// ANSI color codes container (empty strings when color is disabled)
pub struct Colors {
    bold: &'static str,
    dim: &'static str,
    reset: &'static str,
    green: &'static str,
    yellow: &'static str,
    red: &'static str,
    cyan: &'static str,
}

impl Colors {
    /// Colors when `enabled` and stdout supports them
    pub fn new(enabled: bool) -> Self {
        if enabled && use_color() {
            Self {
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
                green: "\x1b[32m",
                yellow: "\x1b[33m",
                red: "\x1b[31m",
                cyan: "\x1b[36m",
            }
        } else {
            Self::plain()
        }
    }

    pub fn plain() -> Self {
        Self {
            bold: "",
            dim: "",
            reset: "",
            green: "",
            yellow: "",
            red: "",
            cyan: "",
        }
    }

    fn global(&self, code: GlobalWarning) -> &str {
        match code {
            GlobalWarning::Ok => self.green,
            GlobalWarning::Underuse => self.cyan,
            GlobalWarning::Overuse => self.yellow,
            GlobalWarning::Overage => self.red,
        }
    }

    fn local(&self, code: LocalWarning) -> &str {
        match code {
            LocalWarning::Ok => self.green,
            LocalWarning::Underuse => self.cyan,
            LocalWarning::Overuse => self.yellow,
            LocalWarning::Overage => self.red,
        }
    }
}

/// Write the summary of one resource's cycle
pub fn write_report(
    out: &mut impl Write,
    c: &Colors,
    report: &CycleReport,
    text: &dyn MessageText,
) -> io::Result<()> {
    let health = report.account_health;
    writeln!(
        out,
        "{}== {} ALERTS =={}",
        c.bold,
        report.resource.to_uppercase(),
        c.reset
    )?;
    writeln!(
        out,
        "  Global status ({:.1} / {}) is {}{}{}. Estimated usage by end of cycle: {}.",
        report.global_used,
        format_quota(report.global_quota),
        c.global(health),
        health,
        c.reset,
        format_estimate(report.global_prediction),
    )?;
    writeln!(
        out,
        "  {}Message to admin:{} {}",
        c.dim,
        c.reset,
        text.global(&report.resource, health)
    )?;

    for (member, status) in &report.members {
        writeln!(
            out,
            "  {}{}{}: {}{}{}. Est. use by end of cycle: {}.",
            c.bold,
            member,
            c.reset,
            c.local(status.warning),
            status.warning,
            c.reset,
            format_estimate(status.projected_end_of_cycle_usage),
        )?;
        if let Some(Estimate::Available(daily)) = status.max_daily_allowance_remaining {
            if daily > 0.0 {
                writeln!(
                    out,
                    "    {}can use up to {:.2}/day until the end of the billing cycle{}",
                    c.dim, daily, c.reset
                )?;
            }
        }
    }

    if report.notifications.is_empty() {
        writeln!(out, "  {}No new notifications.{}", c.dim, c.reset)?;
    } else {
        writeln!(
            out,
            "  {}Notifications ({}):{}",
            c.bold,
            report.notifications.len(),
            c.reset
        )?;
        for notification in &report.notifications {
            writeln!(out, "    {} {}", recipient(notification), notification.message)?;
        }
    }
    Ok(())
}

fn recipient(n: &Notification) -> String {
    let who = n.recipient_id.as_deref().unwrap_or("-");
    match n.recipient_kind {
        RecipientKind::Member => format!("to {}:", who),
        RecipientKind::AdminAboutMember => format!("to admin about {}:", who),
        RecipientKind::AdminGlobal => "to admin:".to_string(),
    }
}

fn format_quota(quota: Option<f64>) -> String {
    quota
        .map(|q| format!("{:.1}", q))
        .unwrap_or_else(|| "inf".to_string())
}

fn format_estimate(estimate: Estimate) -> String {
    match estimate {
        Estimate::Available(v) => format!("{:.1}", v),
        Estimate::Unavailable => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::PlainText;
    use quotawarn_core::{
        run_cycle, NotificationDeduplicator, SharingMode, UsageAlerter, UsageSnapshot,
    };

    #[test]
    fn test_plain_report() {
        let alerter = UsageAlerter::new(
            UsageSnapshot::new(0.5, Some(6.0))
                .with_member("philip", Some(2.0), 0.5)
                .with_member("yuri", Some(1.0), 1.2),
        )
        .unwrap();
        let mut dedup = NotificationDeduplicator::default();
        let report = run_cycle(
            &alerter,
            &mut dedup,
            "data",
            SharingMode::Independent,
            &PlainText,
        );

        let mut out = Vec::new();
        write_report(&mut out, &Colors::plain(), &report, &PlainText).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("== DATA ALERTS ==\n"));
        assert!(text.contains("Global status (1.7 / 6.0) is Ok. Estimated usage by end of cycle: 3.4."));
        assert!(text.contains("philip: Ok. Est. use by end of cycle: 1.0."));
        assert!(text.contains("can use up to 0.10/day"));
        assert!(text.contains("yuri: Overage."));
        assert!(text.contains("to yuri: Please stop using data; you're over your data quota!"));
        assert!(text.contains("to admin about yuri: yuri is over their data quota."));
    }

    #[test]
    fn test_unavailable_estimates() {
        assert_eq!(format_estimate(Estimate::Unavailable), "n/a");
        assert_eq!(format_quota(None), "inf");
    }
}
