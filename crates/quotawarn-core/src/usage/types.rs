//! Usage snapshot and per-member status types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::warning::LocalWarning;

/// Usage of one member of the account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberUsage {
    /// Individual allowance (`None` when only the account cap applies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<f64>,
    /// Amount used so far this cycle
    pub used: f64,
}

impl MemberUsage {
    pub fn new(quota: Option<f64>, used: f64) -> Self {
        Self { quota, used }
    }
}

/// One evaluation cycle's worth of usage for a single resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Fraction of the billing cycle elapsed, 0 on the first day
    pub billing_fraction: f64,
    /// Allowance shared by every member (`None` means unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_quota: Option<f64>,
    /// Usage keyed by a unique member id
    #[serde(default)]
    pub members: BTreeMap<String, MemberUsage>,
}

impl UsageSnapshot {
    pub fn new(billing_fraction: f64, global_quota: Option<f64>) -> Self {
        Self {
            billing_fraction,
            global_quota,
            members: BTreeMap::new(),
        }
    }

    /// Add a member (builder style)
    pub fn with_member(mut self, id: impl Into<String>, quota: Option<f64>, used: f64) -> Self {
        self.members.insert(id.into(), MemberUsage::new(quota, used));
        self
    }

    /// Sum of every member's usage
    pub fn global_used(&self) -> f64 {
        self.members.values().map(|m| m.used).sum()
    }
}

/// A projection that may be undefined at a billing-cycle boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimate {
    Available(f64),
    /// The divisor was zero (first instant or last instant of the cycle)
    Unavailable,
}

impl Estimate {
    /// Divide, yielding `Unavailable` instead of infinity/NaN on a zero divisor
    pub(crate) fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Estimate::Unavailable
        } else {
            Estimate::Available(numerator / denominator)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Available(v) => Some(*v),
            Estimate::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Estimate::Available(_))
    }
}

/// Evaluation result for one member
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserStatus {
    /// Usage at end of billing cycle if the current rate continues
    pub projected_end_of_cycle_usage: Estimate,
    /// Member-level warning
    pub warning: LocalWarning,
    /// Largest daily use that keeps the member within quota; only present
    /// when the member has an individual quota
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_daily_allowance_remaining: Option<Estimate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_used_sums_members() {
        let snapshot = UsageSnapshot::new(0.8, Some(6.0))
            .with_member("philip", Some(2.0), 1.0)
            .with_member("john", Some(2.0), 0.25)
            .with_member("yuri", None, 1.25);
        assert_eq!(snapshot.global_used(), 2.5);
        assert_eq!(UsageSnapshot::new(0.5, Some(1.0)).global_used(), 0.0);
    }

    #[test]
    fn test_estimate_ratio_guards_zero() {
        assert_eq!(Estimate::ratio(3.0, 0.0), Estimate::Unavailable);
        assert_eq!(Estimate::ratio(3.0, 2.0).value(), Some(1.5));
    }

    #[test]
    fn test_parse_snapshot_json() {
        let json = r#"{
            "billing_fraction": 0.8,
            "global_quota": 6,
            "members": {
                "john": { "quota": 2, "used": 0.1 },
                "yuri": { "used": 1.2 }
            }
        }"#;
        let snapshot: UsageSnapshot = serde_json::from_str(json).expect("Should parse snapshot");
        assert_eq!(snapshot.global_quota, Some(6.0));
        assert_eq!(snapshot.members["john"].quota, Some(2.0));
        assert!(snapshot.members["yuri"].quota.is_none());
    }
}
