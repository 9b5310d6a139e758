//! Portfolio and per-project metrics built from the rollup functions.

use capital_tracker_sdk::{PhaseStatus, ProjectMetrics, ProjectSummary};

use crate::config::EngineConfig;
use crate::prepare::{PreparedProject, PreparedSnapshot};
use crate::risk;
use crate::rollup;

fn summarize_project(prepared: &PreparedProject<'_>, snapshot: &PreparedSnapshot<'_>) -> ProjectSummary {
    let phases = || prepared.phases.iter().map(|p| p.phase);
    let risk_score = if prepared.phases.is_empty() {
        0.0
    } else {
        rollup::risk_score(phases(), snapshot.as_of)
    };

    ProjectSummary {
        project_id: prepared.project.id.clone(),
        name: prepared.project.name.clone(),
        status: prepared.project.status,
        // Clamped to 0..=100 so the cast cannot truncate
        reported_progress: prepared.project.total_progress.clamp(0, 100) as u8,
        computed_progress: rollup::average_progress(phases()),
        completion_rate: rollup::completion_rate(phases()),
        overdue_count: prepared.phases.iter().filter(|p| p.overdue).count(),
        risk_score,
        risk_bucket: risk::risk_bucket(risk_score),
        budget_variance_percent: rollup::budget_variance_percent([prepared.project]),
    }
}

/// Portfolio metrics for a prepared snapshot.
///
/// An empty snapshot yields the zeroed [`ProjectMetrics::default`].
pub fn project_metrics(snapshot: &PreparedSnapshot<'_>, config: &EngineConfig) -> ProjectMetrics {
    if snapshot.projects.is_empty() {
        return ProjectMetrics::default();
    }

    let as_of = snapshot.as_of;
    let phases = || snapshot.phases().map(|p| p.phase);
    let assessment = risk::assess(snapshot);
    let upcoming_end = rollup::shift_days(as_of, config.upcoming_window_days);

    ProjectMetrics {
        total_phases: snapshot.phase_count(),
        completion_rate: rollup::completion_rate(phases()),
        average_delay_days: rollup::average_delay_days(phases(), as_of),
        budget_variance_percent: assessment.budget_variance_percent,
        budget_bucket: assessment.budget_bucket,
        risk_score: assessment.risk_score,
        risk_bucket: assessment.risk_bucket,
        upcoming_deadline_count: snapshot
            .phases()
            .filter(|p| !p.phase.is_completed() && p.end >= as_of && p.end <= upcoming_end)
            .count(),
        overdue_count: snapshot.phases().filter(|p| p.overdue).count(),
        urgent_count: snapshot
            .phases()
            .filter(|p| p.phase.status == PhaseStatus::Urgent)
            .count(),
        average_progress: rollup::average_progress(phases()),
        compliance: rollup::compliance_summary(phases(), as_of),
        projects: snapshot
            .projects
            .iter()
            .map(|p| summarize_project(p, snapshot))
            .collect(),
    }
}
