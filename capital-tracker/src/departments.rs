//! Department performance ranker
//!
//! Groups the prepared phases by owning department, scores each group and
//! ranks the groups against each other. Groups are scored in parallel; the
//! ranking itself is a total order so repeated calls give identical ranks.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rayon::prelude::*;

use capital_tracker_sdk::{DepartmentPerformance, PerformanceTrend, RiskLevel};

use crate::config::EngineConfig;
use crate::prepare::{PreparedPhase, PreparedSnapshot};
use crate::rollup::{self, round_to};

/// Points below the overall rate at which recent work counts as declining
pub const DECLINE_THRESHOLD: f64 = 10.0;

/// Delay ratio classification on integer counts.
///
/// `overdue/total > 0.3` is high and `> 0.1` medium; comparing
/// `overdue * 10` against `total * 3` keeps the 0.3 boundary exact.
pub fn delay_risk_level(overdue: usize, total: usize) -> RiskLevel {
    if overdue * 10 > total * 3 {
        RiskLevel::High
    } else if overdue * 10 > total {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// `clamp(0, 100, round2(completion_rate / max(average_delay_days, 1)))`
pub fn efficiency(completion_rate: f64, average_delay_days: f64) -> f64 {
    round_to(completion_rate / average_delay_days.max(1.0), 2).clamp(0.0, 100.0)
}

/// Compare recent completion against the department's overall completion.
///
/// No recent phases means there is nothing to compare, which reads as stable.
pub fn classify_trend(recent_rate: Option<f64>, overall_rate: f64) -> PerformanceTrend {
    match recent_rate {
        Some(recent) if recent > overall_rate => PerformanceTrend::Improving,
        Some(recent) if recent < overall_rate - DECLINE_THRESHOLD => PerformanceTrend::Declining,
        _ => PerformanceTrend::Stable,
    }
}

fn score_department(
    department: &str,
    phases: &[&PreparedPhase<'_>],
    as_of: NaiveDate,
    recent_window_days: i64,
) -> DepartmentPerformance {
    let total = phases.len();
    let completed = phases.iter().filter(|p| p.phase.is_completed()).count();
    let overdue = phases.iter().filter(|p| p.overdue).count();

    let completion_rate = rollup::completion_rate(phases.iter().map(|p| p.phase));
    let average_delay_days = rollup::average_delay_days(phases.iter().map(|p| p.phase), as_of);

    let window_start = rollup::shift_days(as_of, -recent_window_days.max(0));
    let recent: Vec<_> = phases
        .iter()
        .filter(|p| p.start >= window_start && p.start <= as_of)
        .map(|p| p.phase)
        .collect();
    let recent_rate = (!recent.is_empty()).then(|| rollup::completion_rate(recent.iter().copied()));

    let budget_allocated: f64 = phases.iter().map(|p| p.budget_share).sum();
    let budget_used: f64 = phases.iter().map(|p| p.cost_share).sum();

    let team_size = phases
        .iter()
        .map(|p| p.phase.responsible_role.trim())
        .filter(|role| !role.is_empty())
        .collect::<BTreeSet<_>>()
        .len();

    let last_activity = phases
        .iter()
        .flat_map(|p| {
            let started = Some(p.start).filter(|d| *d <= as_of);
            let finished = Some(p.end).filter(|d| p.phase.is_completed() && *d <= as_of);
            started.into_iter().chain(finished)
        })
        .max();

    DepartmentPerformance {
        department: department.to_string(),
        rank: 0,
        completion_rate,
        completion_delta_vs_mean: 0.0,
        average_delay_days,
        risk_level: delay_risk_level(overdue, total),
        total_phases: total,
        completed_phases: completed,
        pending_phases: total - completed - overdue,
        overdue_phases: overdue,
        budget_allocated: round_to(budget_allocated, 2),
        budget_used: round_to(budget_used, 2),
        budget_utilization: round_to(100.0 * rollup::ratio(budget_used, budget_allocated), 2),
        efficiency: efficiency(completion_rate, average_delay_days),
        performance_trend: classify_trend(recent_rate, completion_rate),
        team_size,
        last_activity,
    }
}

/// Completion rate desc, then average delay asc, then name asc
fn ranking_order(a: &DepartmentPerformance, b: &DepartmentPerformance) -> Ordering {
    b.completion_rate
        .total_cmp(&a.completion_rate)
        .then_with(|| a.average_delay_days.total_cmp(&b.average_delay_days))
        .then_with(|| a.department.cmp(&b.department))
}

/// Score and rank every department in the snapshot
pub fn rank_departments(snapshot: &PreparedSnapshot<'_>, config: &EngineConfig) -> Vec<DepartmentPerformance> {
    let mut groups: BTreeMap<&str, Vec<&PreparedPhase<'_>>> = BTreeMap::new();
    for phase in snapshot.phases() {
        groups
            .entry(phase.phase.department.trim())
            .or_default()
            .push(phase);
    }

    let groups: Vec<(&str, Vec<&PreparedPhase<'_>>)> = groups.into_iter().collect();
    let mut departments: Vec<DepartmentPerformance> = groups
        .par_iter()
        .map(|(name, phases)| score_department(name, phases, snapshot.as_of, config.recent_window_days))
        .collect();

    if departments.is_empty() {
        return departments;
    }

    let mean = departments.iter().map(|d| d.completion_rate).sum::<f64>() / departments.len() as f64;
    departments.sort_by(ranking_order);
    for (position, department) in departments.iter_mut().enumerate() {
        department.rank = position + 1;
        department.completion_delta_vs_mean = round_to(department.completion_rate - mean, 2);
    }
    departments
}
