//! Forecast estimator for phases that are still in flight.
//!
//! The prediction is a heuristic: a phase is expected to slip by its
//! department's historical average delay. Departments with too little
//! completed work borrow the cohort-wide average instead and the entry is
//! flagged. Confidence drops with dependency depth and with a department
//! whose own risk score lands in the High bucket.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use capital_tracker_sdk::{
    DepartmentPerformance, ForecastEntry, ForecastWarning, Phase, PhaseStatus, RiskBucket,
};

use crate::config::EngineConfig;
use crate::prepare::{PreparedPhase, PreparedProject, PreparedSnapshot};
use crate::risk;
use crate::rollup;

pub const BASE_CONFIDENCE: i64 = 90;
pub const MIN_CONFIDENCE: i64 = 20;
pub const MAX_CONFIDENCE: i64 = 95;
/// Confidence lost per dependency edge in the longest chain
pub const DEPTH_PENALTY: i64 = 5;
pub const HIGH_RISK_PENALTY: i64 = 10;
/// Chains deeper than this are named as a risk factor
pub const DEPTH_RISK_THRESHOLD: usize = 2;

pub const FACTOR_DEPENDENCY_DEPTH: &str = "dependency chain depth";
pub const FACTOR_DEPARTMENT_RISK: &str = "departmental risk";
pub const FACTOR_SCHEDULE_PRESSURE: &str = "project schedule pressure";

/// `clamp(20, 95, 90 - 5*depth - 10*high_risk)`
pub fn confidence(dependency_depth: usize, high_risk_department: bool) -> u8 {
    let depth = i64::try_from(dependency_depth).unwrap_or(i64::MAX / DEPTH_PENALTY);
    let score = BASE_CONFIDENCE
        - DEPTH_PENALTY.saturating_mul(depth)
        - if high_risk_department { HIGH_RISK_PENALTY } else { 0 };
    // Clamped to 20..=95 so the cast cannot truncate
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}

fn is_in_flight(status: PhaseStatus) -> bool {
    matches!(status, PhaseStatus::InProgress | PhaseStatus::NotStarted)
}

struct DelayBasis<'d> {
    cohort_delay: f64,
    min_history: usize,
    departments: HashMap<&'d str, &'d DepartmentPerformance>,
    high_risk: HashSet<&'d str>,
}

/// Departments whose risk score over their own phases buckets as High
fn high_risk_departments<'a>(snapshot: &PreparedSnapshot<'a>) -> HashSet<&'a str> {
    let mut groups: HashMap<&'a str, Vec<&'a Phase>> = HashMap::new();
    for prepared in snapshot.phases() {
        groups
            .entry(prepared.phase.department.trim())
            .or_default()
            .push(prepared.phase);
    }

    groups
        .into_iter()
        .filter(|(_, phases)| {
            let score = rollup::risk_score(phases.iter().copied(), snapshot.as_of);
            risk::risk_bucket(score) == RiskBucket::High
        })
        .map(|(department, _)| department)
        .collect()
}

fn forecast_phase(
    project: &PreparedProject<'_>,
    index: usize,
    prepared: &PreparedPhase<'_>,
    basis: &DelayBasis<'_>,
) -> ForecastEntry {
    let phase = prepared.phase;
    let department_name = phase.department.trim();
    let department = basis.departments.get(department_name).copied();

    let completed_history = department.map(|d| d.completed_phases).unwrap_or(0);
    let mut warnings = Vec::new();
    let expected_delay = match department {
        Some(d) if completed_history >= basis.min_history => d.average_delay_days,
        _ => {
            warnings.push(ForecastWarning::LowHistoricalData {
                department: department_name.to_string(),
                completed_phases: completed_history,
            });
            basis.cohort_delay
        }
    };

    let high_risk = basis.high_risk.contains(department_name);
    let schedule_pressure = project
        .phases
        .iter()
        .enumerate()
        .any(|(i, other)| i != index && other.overdue);

    let mut risk_factors = Vec::new();
    if prepared.dependency_depth > DEPTH_RISK_THRESHOLD {
        risk_factors.push(FACTOR_DEPENDENCY_DEPTH.to_string());
    }
    if high_risk {
        risk_factors.push(FACTOR_DEPARTMENT_RISK.to_string());
    }
    if schedule_pressure {
        risk_factors.push(FACTOR_SCHEDULE_PRESSURE.to_string());
    }

    ForecastEntry {
        project_id: project.project.id.clone(),
        phase_id: phase.id.clone(),
        phase_name: phase.name.clone(),
        department: department_name.to_string(),
        status: phase.status,
        predicted_completion_date: rollup::shift_days(prepared.end, expected_delay.round() as i64),
        confidence: confidence(prepared.dependency_depth, high_risk),
        dependency_chain_depth: prepared.dependency_depth,
        risk_factors,
        warnings,
    }
}

/// Forecast every in-progress or not-started phase in the snapshot.
///
/// `departments` is the ranker's output for the same snapshot. Entries come
/// back in project order, then phase order.
pub fn forecast(
    snapshot: &PreparedSnapshot<'_>,
    departments: &[DepartmentPerformance],
    config: &EngineConfig,
) -> Vec<ForecastEntry> {
    let basis = DelayBasis {
        cohort_delay: rollup::average_delay_days(snapshot.phases().map(|p| p.phase), snapshot.as_of),
        min_history: config.min_department_history,
        departments: departments
            .iter()
            .map(|d| (d.department.as_str(), d))
            .collect(),
        high_risk: high_risk_departments(snapshot),
    };

    snapshot
        .projects
        .par_iter()
        .flat_map_iter(|project| {
            let basis = &basis;
            project
                .phases
                .iter()
                .enumerate()
                .filter(|(_, p)| is_in_flight(p.phase.status))
                .map(move |(index, prepared)| forecast_phase(project, index, prepared, basis))
        })
        .collect()
}
