//! Warning codes for the account as a whole and for individual members.
//!
//! The two families share names but never share a value: a code always
//! carries its scope, so a single lookup over [`WarningCode`] stays
//! unambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Behaviour shared by both warning families.
pub trait WarningLevel: Copy + Eq + fmt::Debug {
    /// `true` for the all-clear code
    fn is_ok(&self) -> bool;

    /// Canonical code name ("Ok", "Overage", "Overuse", "Underuse")
    fn name(&self) -> &'static str;
}

/// Warning applicable to the account cap shared by every member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalWarning {
    /// Nothing to report
    #[default]
    Ok,
    /// The account has already gone over its quota
    Overage,
    /// At the current rate the account is headed over its quota
    Overuse,
    /// Late in the cycle and well under quota
    Underuse,
}

/// Warning applicable to one member's allocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalWarning {
    /// Nothing to report
    #[default]
    Ok,
    /// The member exceeded their own quota, or alone exceeded the account
    /// quota when they have none. Another member's overage never sets this.
    Overage,
    /// The member may exceed their quota (or the account quota) if the
    /// current pattern keeps up
    Overuse,
    /// The member has a quota and is significantly underusing it. Never
    /// raised for members without an individual quota.
    Underuse,
}

impl WarningLevel for GlobalWarning {
    fn is_ok(&self) -> bool {
        matches!(self, GlobalWarning::Ok)
    }

    fn name(&self) -> &'static str {
        match self {
            GlobalWarning::Ok => "Ok",
            GlobalWarning::Overage => "Overage",
            GlobalWarning::Overuse => "Overuse",
            GlobalWarning::Underuse => "Underuse",
        }
    }
}

impl WarningLevel for LocalWarning {
    fn is_ok(&self) -> bool {
        matches!(self, LocalWarning::Ok)
    }

    fn name(&self) -> &'static str {
        match self {
            LocalWarning::Ok => "Ok",
            LocalWarning::Overage => "Overage",
            LocalWarning::Overuse => "Overuse",
            LocalWarning::Underuse => "Underuse",
        }
    }
}

impl fmt::Display for GlobalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LocalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A warning code tagged with its scope, as carried by notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "code", rename_all = "snake_case")]
pub enum WarningCode {
    Global(GlobalWarning),
    Local(LocalWarning),
}

impl WarningCode {
    pub fn name(&self) -> &'static str {
        match self {
            WarningCode::Global(code) => code.name(),
            WarningCode::Local(code) => code.name(),
        }
    }
}

impl From<GlobalWarning> for WarningCode {
    fn from(code: GlobalWarning) -> Self {
        WarningCode::Global(code)
    }
}

impl From<LocalWarning> for WarningCode {
    fn from(code: LocalWarning) -> Self {
        WarningCode::Local(code)
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCode::Global(code) => write!(f, "global {}", code),
            WarningCode::Local(code) => write!(f, "local {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_codes_stay_distinct() {
        let global: WarningCode = GlobalWarning::Overuse.into();
        let local: WarningCode = LocalWarning::Overuse.into();
        assert_ne!(global, local);
        assert_eq!(global.name(), local.name());
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_string(&WarningCode::Local(LocalWarning::Underuse)).unwrap();
        assert_eq!(json, r#"{"scope":"local","code":"underuse"}"#);

        let parsed: WarningCode = serde_json::from_str(r#"{"scope":"global","code":"overage"}"#)
            .expect("Should parse scoped code");
        assert_eq!(parsed, WarningCode::Global(GlobalWarning::Overage));
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let parsed = serde_json::from_str::<LocalWarning>(r#""meltdown""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_is_ok() {
        assert!(GlobalWarning::Ok.is_ok());
        assert!(!GlobalWarning::Underuse.is_ok());
        assert!(LocalWarning::default().is_ok());
        assert_eq!(LocalWarning::Overage.to_string(), "Overage");
    }
}
