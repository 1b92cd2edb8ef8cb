//! Eligibility projection over one student's attendance.
//!
//! # Responsibility
//! - Classify a student's standing against the attendance target.
//! - Report the numbers behind the verdict so callers can render them.
//!
//! # Invariants
//! - `project` is pure: same records, class-day total and `today` give the
//!   same projection. It performs no I/O and never fails.
//! - Threshold comparisons use integer cross-multiplication; percentages are
//!   only materialized as `f64` for reporting.
//! - `total_class_days == 0` or no records always yields `InsufficientData`.
//! - An empty recent window counts as 0% recent attendance.

use crate::model::attendance::{AttendanceIndex, AttendanceRecord, MarkCounts};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Thresholds used by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityPolicy {
    /// Overall attendance percentage a student must reach.
    pub target_percent: u32,
    /// Recent percentage at or below which a student is critical.
    pub critical_percent: u32,
    /// Length of the trailing recent window in calendar days.
    pub recent_window_days: u32,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            target_percent: 75,
            critical_percent: 50,
            recent_window_days: 30,
        }
    }
}

impl EligibilityPolicy {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.target_percent == 0 || self.target_percent > 100 {
            return Err("target_percent must be within 1..=100");
        }
        if self.critical_percent >= self.target_percent {
            return Err("critical_percent must be below target_percent");
        }
        if self.recent_window_days == 0 {
            return Err("recent_window_days must be positive");
        }
        Ok(())
    }
}

/// Every intermediate number of a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceTally {
    pub total_class_days: u32,
    /// Records of any status.
    pub attended: u32,
    pub present: u32,
    /// `total_class_days - attended`; negative when stray records exceed the calendar.
    pub remaining: i64,
    /// `present / attended * 100`; `None` when nothing is recorded.
    pub current_pct: Option<f64>,
    /// Records dated after `today - recent_window_days`.
    pub recent: MarkCounts,
    /// Present share of `recent`, or `0.0` for an empty window.
    pub recent_pct: f64,
    /// Additional present marks needed to reach the target. Not clamped:
    /// zero or below means the target is already met.
    pub needed_present: i64,
}

/// Feasibility classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No class days or no records yet.
    InsufficientData,
    /// Recent attendance meets the target.
    OnTrack { current_pct: f64 },
    /// Recent attendance is between the critical floor and the target.
    AtRisk {
        recent_pct: f64,
        needed_present: i64,
        remaining: i64,
    },
    /// The target can no longer be reached with the remaining class days.
    Infeasible { current_pct: f64 },
    /// Recent attendance is at or below the critical floor, but the target is
    /// still reachable.
    Critical {
        recent_pct: f64,
        needed_present: i64,
        remaining: i64,
    },
}

impl Verdict {
    /// Stable snake_case name, matching the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::OnTrack { .. } => "on_track",
            Self::AtRisk { .. } => "at_risk",
            Self::Infeasible { .. } => "infeasible",
            Self::Critical { .. } => "critical",
        }
    }
}

/// Result of one projection. Derived data; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityProjection {
    pub evaluated_on: NaiveDate,
    pub tally: AttendanceTally,
    pub verdict: Verdict,
}

/// Projects eligibility from raw ledger records.
pub fn project(
    records: &[AttendanceRecord],
    total_class_days: u32,
    today: NaiveDate,
    policy: &EligibilityPolicy,
) -> EligibilityProjection {
    project_index(
        &AttendanceIndex::from_records(records),
        total_class_days,
        today,
        policy,
    )
}

/// Projects eligibility from an already built index.
pub fn project_index(
    index: &AttendanceIndex,
    total_class_days: u32,
    today: NaiveDate,
    policy: &EligibilityPolicy,
) -> EligibilityProjection {
    let totals = index.totals();
    let recent = index.window_after(recent_cutoff(today, policy.recent_window_days));
    let tally = AttendanceTally {
        total_class_days,
        attended: totals.recorded,
        present: totals.present,
        remaining: i64::from(total_class_days) - i64::from(totals.recorded),
        current_pct: percent(totals.present, totals.recorded),
        recent,
        recent_pct: percent(recent.present, recent.recorded).unwrap_or(0.0),
        needed_present: needed_present(total_class_days, totals.present, policy.target_percent),
    };
    let verdict = classify(&tally, policy);

    EligibilityProjection {
        evaluated_on: today,
        tally,
        verdict,
    }
}

/// `ceil(target_percent / 100 * total_class_days - present)` in exact integers.
pub fn needed_present(total_class_days: u32, present: u32, target_percent: u32) -> i64 {
    let numerator =
        i64::from(target_percent) * i64::from(total_class_days) - 100 * i64::from(present);
    ceil_div(numerator, 100)
}

fn classify(tally: &AttendanceTally, policy: &EligibilityPolicy) -> Verdict {
    let current_pct = match tally.current_pct {
        Some(value) if tally.total_class_days > 0 => value,
        _ => return Verdict::InsufficientData,
    };

    let recent = tally.recent;
    if meets_percent(recent, policy.target_percent) {
        return Verdict::OnTrack { current_pct };
    }

    if exceeds_percent(recent, policy.critical_percent) {
        return Verdict::AtRisk {
            recent_pct: tally.recent_pct,
            needed_present: tally.needed_present,
            remaining: tally.remaining,
        };
    }

    if tally.needed_present > tally.remaining {
        Verdict::Infeasible { current_pct }
    } else {
        Verdict::Critical {
            recent_pct: tally.recent_pct,
            needed_present: tally.needed_present,
            remaining: tally.remaining,
        }
    }
}

/// `present / recorded * 100 >= percent`, with an empty window at 0%.
fn meets_percent(counts: MarkCounts, percent: u32) -> bool {
    100 * u64::from(counts.present) >= u64::from(percent) * u64::from(counts.recorded)
        && (counts.recorded > 0 || percent == 0)
}

/// `present / recorded * 100 > percent`, with an empty window at 0%.
fn exceeds_percent(counts: MarkCounts, percent: u32) -> bool {
    100 * u64::from(counts.present) > u64::from(percent) * u64::from(counts.recorded)
}

fn recent_cutoff(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
}

fn percent(part: u32, whole: u32) -> Option<f64> {
    (whole > 0).then(|| f64::from(part) * 100.0 / f64::from(whole))
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    if numerator.rem_euclid(denominator) > 0 {
        quotient + 1
    } else {
        quotient
    }
}
