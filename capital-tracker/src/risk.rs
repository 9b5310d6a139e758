//! Risk and budget analyzer: executive-facing buckets over the rollup numbers.

use capital_tracker_sdk::{BudgetBucket, RiskAssessment, RiskBucket};

use crate::prepare::PreparedSnapshot;
use crate::rollup;

pub const HIGH_RISK_THRESHOLD: f64 = 7.0;
pub const MEDIUM_RISK_THRESHOLD: f64 = 5.0;

/// `>= 7` High, `>= 5` Medium, otherwise Low
pub fn risk_bucket(score: f64) -> RiskBucket {
    if score >= HIGH_RISK_THRESHOLD {
        RiskBucket::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskBucket::Medium
    } else {
        RiskBucket::Low
    }
}

/// Over-spend (positive variance) is "Over Budget"; anything else is "Under Budget"
pub fn budget_bucket(variance_percent: f64) -> BudgetBucket {
    if variance_percent > 0.0 {
        BudgetBucket::OverBudget
    } else {
        BudgetBucket::UnderBudget
    }
}

/// Risk score and budget variance with their buckets.
///
/// A snapshot with no aggregable phases scores 0 rather than the formula's
/// floor of 1, so an empty dashboard reads as empty.
pub fn assess(snapshot: &PreparedSnapshot<'_>) -> RiskAssessment {
    let risk_score = if snapshot.is_empty() {
        0.0
    } else {
        rollup::risk_score(snapshot.phases().map(|p| p.phase), snapshot.as_of)
    };
    let budget_variance_percent = rollup::budget_variance_percent(snapshot.projects.iter().map(|p| p.project));

    RiskAssessment {
        risk_score,
        risk_bucket: risk_bucket(risk_score),
        budget_variance_percent,
        budget_bucket: budget_bucket(budget_variance_percent),
    }
}
