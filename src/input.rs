//! Usage input file handed over by the upstream usage provider.
//!
//! ```toml
//! account = "family"
//! cycle_end = "2024-04-30"      # or: billing_fraction = 0.8
//!
//! [resources.data]
//! global_quota = 6.0
//! members.john = { quota = 2.0, used = 0.1 }
//! members.yuri = { used = 1.2 }  # no individual quota
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use quotawarn_core::usage::{billing_fraction, days_in_month};
use quotawarn_core::{MemberUsage, UsageSnapshot};
use serde::Deserialize;

/// Usage of every resource of one account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUsage {
    /// Account id, used to key persisted state
    pub account: String,
    /// Explicit position in the billing cycle
    #[serde(default)]
    pub billing_fraction: Option<f64>,
    /// Last day of the current billing cycle
    #[serde(default)]
    pub cycle_end: Option<NaiveDate>,
    /// Evaluation date (defaults to the local date)
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// Billing cycle length in days (defaults to the current month's length)
    #[serde(default)]
    pub cycle_days: Option<u32>,
    /// Usage per resource ("voice", "SMS", "data", ...)
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceUsage>,
}

/// Usage of a single resource
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceUsage {
    /// Account-wide allowance, absent when unlimited
    #[serde(default)]
    pub global_quota: Option<f64>,
    #[serde(default)]
    pub members: BTreeMap<String, MemberUsage>,
}

impl AccountUsage {
    /// Read a `.json` or `.toml` usage file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read usage file: {:?}", path))?;
        Self::parse(&content, path.extension().and_then(|e| e.to_str()))
            .with_context(|| format!("Failed to parse usage file: {:?}", path))
    }

    /// Parse usage content; TOML unless the extension says JSON
    pub fn parse(content: &str, extension: Option<&str>) -> Result<Self> {
        let usage = match extension {
            Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(content)?,
            _ => toml::from_str(content)?,
        };
        Ok(usage)
    }

    /// Position in the billing cycle, explicit or derived from `cycle_end`
    pub fn billing_fraction(&self) -> Result<f64> {
        if let Some(bf) = self.billing_fraction {
            return Ok(bf);
        }
        let Some(cycle_end) = self.cycle_end else {
            bail!("usage file needs either billing_fraction or cycle_end");
        };
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let days = self.cycle_days.unwrap_or_else(|| days_in_month(today));
        Ok(billing_fraction(today, cycle_end, days))
    }

    /// Snapshot of one resource at `billing_fraction`
    pub fn snapshot(&self, resource: &ResourceUsage, billing_fraction: f64) -> UsageSnapshot {
        UsageSnapshot {
            billing_fraction,
            global_quota: resource.global_quota,
            members: resource.members.clone(),
        }
    }
}
