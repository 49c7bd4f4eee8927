//! Classification of one usage snapshot into account and member warnings.

use std::collections::BTreeMap;

use tracing::debug;

use super::thresholds::{
    max_allowable_pct, min_underuse_pct, underuse_window_open, DAYS_PER_CYCLE,
};
use super::types::{Estimate, MemberUsage, UsageSnapshot, UserStatus};
use crate::error::{AlerterError, ConfigurationError};
use crate::warning::{GlobalWarning, LocalWarning};

/// Evaluates a validated [`UsageSnapshot`].
///
/// Construction is the only fallible step; every query afterwards is a pure
/// function of the snapshot.
#[derive(Debug, Clone)]
pub struct UsageAlerter {
    snapshot: UsageSnapshot,
    global_used: f64,
}

impl UsageAlerter {
    /// Validate the snapshot and cache the account-wide usage.
    ///
    /// Fails when every member has an individual quota and their sum exceeds
    /// the account quota, or when an amount is out of range.
    pub fn new(snapshot: UsageSnapshot) -> Result<Self, ConfigurationError> {
        let bf = snapshot.billing_fraction;
        if !(0.0..=1.0).contains(&bf) {
            return Err(ConfigurationError::BillingFractionOutOfRange { value: bf });
        }
        if let Some(gq) = snapshot.global_quota {
            check_amount("account", "quota", gq)?;
        }
        for (id, member) in &snapshot.members {
            check_amount(id, "used", member.used)?;
            if let Some(q) = member.quota {
                check_amount(id, "quota", q)?;
            }
        }

        // Only meaningful when every member has a quota and the account is capped
        let individual: Option<f64> = snapshot.members.values().map(|m| m.quota).sum();
        if let (Some(individual_sum), Some(global_quota)) = (individual, snapshot.global_quota) {
            if individual_sum > global_quota {
                return Err(ConfigurationError::QuotaSumExceedsGlobal {
                    individual_sum,
                    global_quota,
                });
            }
        }

        let global_used = snapshot.global_used();
        debug!(
            billing_fraction = bf,
            global_used,
            members = snapshot.members.len(),
            "usage snapshot accepted"
        );

        Ok(Self {
            snapshot,
            global_used,
        })
    }

    pub fn snapshot(&self) -> &UsageSnapshot {
        &self.snapshot
    }

    pub fn members(&self) -> &BTreeMap<String, MemberUsage> {
        &self.snapshot.members
    }

    /// Fraction of the billing cycle elapsed
    pub fn billing_fraction(&self) -> f64 {
        self.snapshot.billing_fraction
    }

    /// Account allowance, `None` when unlimited
    pub fn global_quota(&self) -> Option<f64> {
        self.snapshot.global_quota
    }

    /// Sum of every member's usage
    pub fn global_used(&self) -> f64 {
        self.global_used
    }

    /// Account usage at end of cycle if the current rate continues
    pub fn global_usage_prediction(&self) -> Estimate {
        self.eobc_prediction(self.global_used)
    }

    /// Warning for the account as a whole
    pub fn account_health(&self) -> GlobalWarning {
        let Some(gq) = self.snapshot.global_quota else {
            return GlobalWarning::Ok;
        };
        let gu = self.global_used;

        if gu > gq {
            return GlobalWarning::Overage;
        }
        if gu == 0.0 && gq == 0.0 {
            return GlobalWarning::Ok;
        }

        let bf = self.snapshot.billing_fraction;
        let pct = gu / gq;
        if pct > max_allowable_pct(bf) {
            return GlobalWarning::Overuse;
        }
        if underuse_window_open(bf) && pct < min_underuse_pct(bf) {
            return GlobalWarning::Underuse;
        }
        GlobalWarning::Ok
    }

    /// Status of a single member
    pub fn user_status(&self, member: &str) -> Result<UserStatus, AlerterError> {
        let usage = self
            .snapshot
            .members
            .get(member)
            .ok_or_else(|| AlerterError::UnknownMember {
                member: member.to_string(),
            })?;
        Ok(self.status_for(usage))
    }

    /// Status of every member, keyed by member id
    pub fn statuses(&self) -> BTreeMap<String, UserStatus> {
        self.snapshot
            .members
            .iter()
            .map(|(id, usage)| (id.clone(), self.status_for(usage)))
            .collect()
    }

    fn status_for(&self, usage: &MemberUsage) -> UserStatus {
        let bf = self.snapshot.billing_fraction;
        UserStatus {
            projected_end_of_cycle_usage: self.eobc_prediction(usage.used),
            warning: self.local_warning(usage),
            max_daily_allowance_remaining: usage
                .quota
                .map(|q| Estimate::ratio(q - usage.used, DAYS_PER_CYCLE * (1.0 - bf))),
        }
    }

    fn local_warning(&self, usage: &MemberUsage) -> LocalWarning {
        let bf = self.snapshot.billing_fraction;
        let used = usage.used;

        match usage.quota {
            // Only the account cap matters. Underuse is deliberately never
            // raised here: members sharing a cap can each look fine while
            // together overrunning it.
            None => {
                let Some(gq) = self.snapshot.global_quota else {
                    return LocalWarning::Ok;
                };
                if used > gq {
                    return LocalWarning::Overage;
                }
                if used == 0.0 {
                    return LocalWarning::Ok;
                }
                if used / gq > max_allowable_pct(bf) {
                    return LocalWarning::Overuse;
                }
                LocalWarning::Ok
            }
            Some(quota) => {
                if used > quota {
                    return LocalWarning::Overage;
                }
                if used == 0.0 && quota == 0.0 {
                    return LocalWarning::Ok;
                }
                let pct = used / quota;
                if pct > max_allowable_pct(bf) {
                    return LocalWarning::Overuse;
                }
                if underuse_window_open(bf) && pct < min_underuse_pct(bf) {
                    return LocalWarning::Underuse;
                }
                LocalWarning::Ok
            }
        }
    }

    fn eobc_prediction(&self, used_now: f64) -> Estimate {
        Estimate::ratio(used_now, self.snapshot.billing_fraction)
    }
}

fn check_amount(owner: &str, field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidAmount {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}
