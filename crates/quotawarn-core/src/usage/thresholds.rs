//! Tolerance curve bounding acceptable (non-warnable) usage.
//!
//! Both bounds are expressed as a fraction of the applicable quota and depend
//! only on how far into the billing cycle we are. Plot them before tweaking:
//! the scenario tests pin the intended behaviour.

/// Underuse is only ever reported once the cycle is past this point
pub const UNDERUSE_START: f64 = 0.7;

/// Days assumed per billing cycle when spreading the remaining allowance
pub const DAYS_PER_CYCLE: f64 = 31.0;

/// Highest fraction of quota that is still acceptable at `billing_fraction`.
///
/// 50% at the start of the cycle (headroom for bursty early use), rising
/// linearly towards 100% at the end. Using exactly 100% is not overuse; only
/// exceeding the quota is (and that is an overage).
pub fn max_allowable_pct(billing_fraction: f64) -> f64 {
    billing_fraction / 2.0 + 0.5
}

/// Fraction of quota below which usage counts as underuse.
///
/// Returns 1 before [`UNDERUSE_START`]; callers gate on the billing fraction
/// as well, so this value never triggers on its own. From the start point on,
/// `((1 / bf) - 1) * 0.2 + 0.5`, which is about 0.59 at 0.7 and settles to
/// 0.5 as the cycle closes.
pub fn min_underuse_pct(billing_fraction: f64) -> f64 {
    if billing_fraction < UNDERUSE_START {
        return 1.0;
    }
    pct_change(1.0, billing_fraction) * 0.2 + 0.5
}

/// Whether underuse may be reported at all at this point of the cycle
pub fn underuse_window_open(billing_fraction: f64) -> bool {
    billing_fraction > UNDERUSE_START
}

fn pct_change(x: f64, y: f64) -> f64 {
    (x - y) / y
}
