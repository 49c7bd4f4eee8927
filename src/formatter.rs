//! Plain-text rendering of warning codes, keyed by resource and code.

use quotawarn_core::{GlobalWarning, LocalWarning, MessageText};

/// Verb forms used to talk about a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResourceForms {
    infinitive: &'static str,
    gerund: &'static str,
}

fn forms(resource: &str) -> ResourceForms {
    match resource.to_ascii_lowercase().as_str() {
        "voice" => ResourceForms {
            infinitive: "to call",
            gerund: "calling",
        },
        "sms" => ResourceForms {
            infinitive: "to text",
            gerund: "texting",
        },
        "data" => ResourceForms {
            infinitive: "to use data",
            gerund: "using data",
        },
        _ => ResourceForms {
            infinitive: "to use it",
            gerund: "using it",
        },
    }
}

/// English messages for members and the account administrator
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl MessageText for PlainText {
    fn global(&self, resource: &str, code: GlobalWarning) -> String {
        match code {
            GlobalWarning::Overage => format!("An account overage for {} has occurred!", resource),
            GlobalWarning::Overuse => {
                format!("An account overage for {} is predicted. Be careful.", resource)
            }
            GlobalWarning::Underuse => format!("An underuse for {} is predicted. Rock on.", resource),
            GlobalWarning::Ok => format!("All is ok for {}.", resource),
        }
    }

    fn member(&self, resource: &str, code: LocalWarning) -> String {
        let f = forms(resource);
        match code {
            LocalWarning::Overage => format!(
                "Please stop {}; you're over your {} quota!",
                f.gerund, resource
            ),
            LocalWarning::Overuse => format!(
                "If you keep {} at your rate, you may exceed the quota.",
                f.gerund
            ),
            LocalWarning::Underuse => format!(
                "You're way under your {} quota. Feel free {} more. Use it or lose it.",
                resource, f.infinitive
            ),
            LocalWarning::Ok => "All is ok.".to_string(),
        }
    }

    fn admin_about_member(&self, resource: &str, member: &str, code: LocalWarning) -> String {
        match code {
            LocalWarning::Overage => format!("{} is over their {} quota.", member, resource),
            LocalWarning::Overuse => {
                format!("{} may exceed their {} quota at the current rate.", member, resource)
            }
            LocalWarning::Underuse => format!("{} is well under their {} quota.", member, resource),
            LocalWarning::Ok => format!("{} is ok for {}.", member, resource),
        }
    }
}
