//! Rollup calculator: the aggregate facts every other report is built from.
//!
//! All functions are pure over their inputs. Empty inputs produce 0 rather
//! than NaN; guarded divisions are documented behaviour, not errors.

use chrono::{Duration, NaiveDate};

use capital_tracker_sdk::{
    CheckpointStatus, ComplianceSummary, Phase, PhaseStatus, Priority, ProgressSource, Project,
};

/// Weight of an overdue phase in the risk score
pub const OVERDUE_RISK_WEIGHT: f64 = 2.0;
/// Weight of an urgent phase in the risk score
pub const URGENT_RISK_WEIGHT: f64 = 1.5;
pub const RISK_SCORE_MIN: f64 = 1.0;
pub const RISK_SCORE_MAX: f64 = 10.0;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `a / b`, or 0 when `b` is 0
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `date` moved by `days`, saturating at the calendar bounds instead of overflowing
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// True iff the phase ended before `now` and is not completed.
///
/// A phase without a usable end date is never overdue.
pub fn is_overdue(phase: &Phase, now: NaiveDate) -> bool {
    if phase.is_completed() {
        return false;
    }
    phase.end().map(|end| end < now).unwrap_or(false)
}

/// Whole days an overdue phase is past its end date; 0 otherwise
pub fn delay_days(phase: &Phase, now: NaiveDate) -> i64 {
    if !is_overdue(phase, now) {
        return 0;
    }
    phase
        .end()
        .map(|end| (now - end).num_days().max(0))
        .unwrap_or(0)
}

/// Percentage of completed phases, 2 decimals; 0 for an empty set
pub fn completion_rate<'a, I>(phases: I) -> f64
where
    I: IntoIterator<Item = &'a Phase>,
{
    let (total, completed) = phases.into_iter().fold((0usize, 0usize), |(t, c), p| {
        (t + 1, c + usize::from(p.is_completed()))
    });
    round_to(100.0 * ratio(completed as f64, total as f64), 2)
}

/// Mean delay in days over overdue phases; 0 when nothing is overdue
pub fn average_delay_days<'a, I>(phases: I, now: NaiveDate) -> f64
where
    I: IntoIterator<Item = &'a Phase>,
{
    let (count, total_delay) = phases
        .into_iter()
        .filter(|p| is_overdue(p, now))
        .fold((0usize, 0i64), |(n, sum), p| (n + 1, sum + delay_days(p, now)));
    ratio(total_delay as f64, count as f64)
}

/// `100 * (Σactual - Σbudget) / Σbudget`, 2 decimals; 0 when there is no budget.
///
/// Positive means over-spend, negative means under-spend.
pub fn budget_variance_percent<'a, I>(projects: I) -> f64
where
    I: IntoIterator<Item = &'a Project>,
{
    let (budget, actual) = projects
        .into_iter()
        .fold((0.0, 0.0), |(b, a), p| (b + p.budget, a + p.actual_cost));
    round_to(100.0 * ratio(actual - budget, budget), 2)
}

/// Composite risk score in `[1, 10]`, 1 decimal.
///
/// Overdue work weighs 2 and urgent work 1.5 per phase, normalised by the
/// phase count and scaled by 10. Overdue counts more because it is already a
/// missed commitment while urgent is only flagged pressure. The floor of 1
/// keeps a clean portfolio distinguishable from "no data"; the ceiling keeps
/// the executive scale fixed however bad things get.
pub fn risk_score<'a, I>(phases: I, now: NaiveDate) -> f64
where
    I: IntoIterator<Item = &'a Phase>,
{
    let (total, overdue, urgent) =
        phases
            .into_iter()
            .fold((0usize, 0usize, 0usize), |(t, o, u), p| {
                (
                    t + 1,
                    o + usize::from(is_overdue(p, now)),
                    u + usize::from(p.status == PhaseStatus::Urgent),
                )
            });
    risk_score_from_counts(total, overdue, urgent)
}

pub fn risk_score_from_counts(total: usize, overdue: usize, urgent: usize) -> f64 {
    let weighted = OVERDUE_RISK_WEIGHT * overdue as f64 + URGENT_RISK_WEIGHT * urgent as f64;
    let raw = 10.0 * weighted / total.max(1) as f64;
    round_to(raw.clamp(RISK_SCORE_MIN, RISK_SCORE_MAX), 1)
}

fn clamped_progress(progress: i64) -> f64 {
    progress.clamp(0, 100) as f64
}

/// Progress that honours the phase's [`ProgressSource`].
///
/// Rollup-computed phases take the mean effective progress of their
/// sub-phases, falling back to their own value when they have none.
pub fn effective_progress(phase: &Phase) -> f64 {
    match phase.progress_source {
        ProgressSource::LeafReported => clamped_progress(phase.progress),
        ProgressSource::RollupComputed if phase.sub_phases.is_empty() => {
            clamped_progress(phase.progress)
        }
        ProgressSource::RollupComputed => {
            let sum: f64 = phase.sub_phases.iter().map(effective_progress).sum();
            sum / phase.sub_phases.len() as f64
        }
    }
}

/// Mean effective progress, 2 decimals; 0 for an empty set
pub fn average_progress<'a, I>(phases: I) -> f64
where
    I: IntoIterator<Item = &'a Phase>,
{
    let (count, sum) = phases
        .into_iter()
        .fold((0usize, 0.0), |(n, s), p| (n + 1, s + effective_progress(p)));
    round_to(ratio(sum, count as f64), 2)
}

/// Rollup of the compliance checkpoints attached to the given phases
pub fn compliance_summary<'a, I>(phases: I, now: NaiveDate) -> ComplianceSummary
where
    I: IntoIterator<Item = &'a Phase>,
{
    let mut summary = ComplianceSummary::default();

    for checkpoint in phases.into_iter().flat_map(|p| &p.compliance_checkpoints) {
        summary.total += 1;
        let open = checkpoint.status != CheckpointStatus::Completed;
        let past_due = checkpoint
            .due_date
            .as_ref()
            .and_then(|d| d.resolve())
            .map(|due| due < now)
            .unwrap_or(false);

        match checkpoint.status {
            CheckpointStatus::Completed => summary.completed += 1,
            CheckpointStatus::Overdue => summary.overdue += 1,
            CheckpointStatus::Pending if past_due => summary.overdue += 1,
            CheckpointStatus::Pending => summary.pending += 1,
        }
        if open && checkpoint.priority == Priority::Urgent {
            summary.open_urgent += 1;
        }
    }

    summary
}
