//! Portfolio metric scenarios

use super::common::*;
use capital_tracker::{Engine, EngineConfig};
use capital_tracker_sdk::{
    BudgetBucket, PhaseStatus, ProgressSource, Project, ProjectMetrics, RiskBucket, RiskLevel,
};

// ============================================================================
// Rollup Scenarios
// ============================================================================

#[test]
fn test_four_phase_project_completion_and_risk() {
    let projects = vec![project(
        "p1",
        vec![
            open_phase("a", "Projects", PhaseStatus::Completed),
            open_phase("b", "Projects", PhaseStatus::Completed),
            open_phase("c", "Projects", PhaseStatus::InProgress),
            open_phase("d", "Projects", PhaseStatus::Urgent),
        ],
    )];

    let metrics = engine().compute_project_metrics(&projects);
    assert!(metrics.diagnostics.is_empty());

    let m = metrics.result;
    assert_eq!(m.total_phases, 4);
    assert_eq!(m.completion_rate, 50.0);
    assert_eq!(m.overdue_count, 0);
    assert_eq!(m.urgent_count, 1);
    assert_eq!(m.risk_score, 3.8);
    assert_eq!(m.risk_bucket, RiskBucket::Low);
}

#[test]
fn test_department_with_three_overdue_of_ten() {
    let mut phases = vec![
        overdue_phase("late-1", "Projects", 4),
        overdue_phase("late-2", "Projects", 6),
        overdue_phase("late-3", "Projects", 8),
    ];
    phases.extend((0..3).map(|i| completed_phase(&format!("done-{}", i), "Projects")));
    phases.extend((0..4).map(|i| open_phase(&format!("open-{}", i), "Projects", PhaseStatus::InProgress)));
    let projects = vec![project("p1", phases)];

    let departments = engine().compute_department_performance(&projects).result;
    assert_eq!(departments.len(), 1);

    let projects_dept = &departments[0];
    assert_eq!(projects_dept.department, "Projects");
    assert_eq!(projects_dept.total_phases, 10);
    assert_eq!(projects_dept.overdue_phases, 3);
    assert_eq!(projects_dept.average_delay_days, 6.0);
    // 0.3 exactly is not above 0.3
    assert_eq!(projects_dept.risk_level, RiskLevel::Medium);
    assert_eq!(projects_dept.completed_phases, 3);
    assert_eq!(projects_dept.pending_phases, 4);

    let metrics = engine().compute_project_metrics(&projects).result;
    assert_eq!(metrics.average_delay_days, 6.0);
    assert_eq!(metrics.overdue_count, 3);
}

#[test]
fn test_under_spend_reads_under_budget() {
    let projects = vec![project_with_budget(
        "p1",
        12.0,
        4.2,
        vec![open_phase("a", "Finance", PhaseStatus::InProgress)],
    )];

    let assessment = engine().assess(&projects).result;
    assert_eq!(assessment.budget_variance_percent, -65.0);
    assert_eq!(assessment.budget_bucket, BudgetBucket::UnderBudget);

    let metrics = engine().compute_project_metrics(&projects).result;
    assert_eq!(metrics.budget_variance_percent, -65.0);
    assert_eq!(metrics.budget_bucket, BudgetBucket::UnderBudget);
}

#[test]
fn test_over_spend_reads_over_budget() {
    let projects = vec![
        project_with_budget("p1", 100.0, 150.0, vec![]),
        project_with_budget("p2", 100.0, 70.0, vec![]),
    ];
    let assessment = engine().assess(&projects).result;
    assert_eq!(assessment.budget_variance_percent, 10.0);
    assert_eq!(assessment.budget_bucket, BudgetBucket::OverBudget);
}

#[test]
fn test_empty_snapshot_returns_zeroed_structures() {
    let projects: Vec<Project> = Vec::new();
    let engine = engine();

    assert_eq!(engine.compute_project_metrics(&projects).result, ProjectMetrics::default());
    assert!(engine.compute_department_performance(&projects).result.is_empty());
    assert!(engine.compute_forecast(&projects).result.is_empty());
}

#[test]
fn test_high_risk_portfolio() {
    let projects = vec![project(
        "p1",
        vec![
            overdue_phase("a", "Works", 3),
            overdue_phase("b", "Works", 5),
            open_phase("c", "Works", PhaseStatus::Urgent),
            open_phase("d", "Works", PhaseStatus::InProgress),
        ],
    )];
    // 10 * (2*2 + 1.5*1) / 4 = 13.75, capped
    let metrics = engine().compute_project_metrics(&projects).result;
    assert_eq!(metrics.risk_score, 10.0);
    assert_eq!(metrics.risk_bucket, RiskBucket::High);
}

// ============================================================================
// Windows and Progress
// ============================================================================

#[test]
fn test_upcoming_deadlines_window() {
    let projects = vec![project(
        "p1",
        vec![
            phase("today", "Works", PhaseStatus::InProgress, -10, 0),
            phase("soon", "Works", PhaseStatus::NotStarted, 1, 30),
            phase("later", "Works", PhaseStatus::NotStarted, 1, 31),
            phase("done-soon", "Works", PhaseStatus::Completed, -10, 5),
            phase("past", "Works", PhaseStatus::InProgress, -20, -1),
        ],
    )];

    let metrics = engine().compute_project_metrics(&projects).result;
    assert_eq!(metrics.upcoming_deadline_count, 2);
    assert_eq!(metrics.overdue_count, 1);
}

#[test]
fn test_reported_and_computed_progress_diverge() {
    let mut parent = open_phase("parent", "Design", PhaseStatus::InProgress);
    parent.progress = 10;
    parent.progress_source = ProgressSource::RollupComputed;
    let mut child_a = open_phase("child-a", "Design", PhaseStatus::Completed);
    child_a.progress = 100;
    let mut child_b = open_phase("child-b", "Design", PhaseStatus::InProgress);
    child_b.progress = 50;
    parent.sub_phases = vec![child_a, child_b];

    let mut sibling = open_phase("sibling", "Design", PhaseStatus::InProgress);
    sibling.progress = 25;

    let mut p = project("p1", vec![parent, sibling]);
    p.total_progress = 90;
    let projects = vec![p];

    let metrics = engine().compute_project_metrics(&projects).result;
    let summary = &metrics.projects[0];
    assert_eq!(summary.reported_progress, 90);
    // (75 + 25) / 2
    assert_eq!(summary.computed_progress, 50.0);
    assert_eq!(metrics.average_progress, 50.0);
}

#[test]
fn test_include_sub_phases_flag() {
    let mut parent = open_phase("parent", "Civil", PhaseStatus::InProgress);
    parent.sub_phases = vec![
        open_phase("sub-1", "Civil", PhaseStatus::Completed),
        open_phase("sub-2", "Civil", PhaseStatus::Completed),
        open_phase("sub-3", "Civil", PhaseStatus::Completed),
    ];
    let projects = vec![project("p1", vec![parent])];

    let top_only = engine().compute_project_metrics(&projects).result;
    assert_eq!(top_only.total_phases, 1);
    assert_eq!(top_only.completion_rate, 0.0);

    let nested = Engine::new(EngineConfig {
        include_sub_phases: true,
        ..config()
    })
    .compute_project_metrics(&projects)
    .result;
    assert_eq!(nested.total_phases, 4);
    assert_eq!(nested.completion_rate, 75.0);
}

#[test]
fn test_per_project_breakdown() {
    let projects = vec![
        project_with_budget(
            "good",
            200.0,
            180.0,
            vec![completed_phase("a", "Works"), completed_phase("b", "Works")],
        ),
        project_with_budget(
            "bad",
            100.0,
            130.0,
            vec![overdue_phase("c", "Works", 12), open_phase("d", "Works", PhaseStatus::Urgent)],
        ),
    ];

    let metrics = engine().compute_project_metrics(&projects).result;
    assert_eq!(metrics.projects.len(), 2);

    let good = &metrics.projects[0];
    assert_eq!(good.project_id, "good");
    assert_eq!(good.completion_rate, 100.0);
    assert_eq!(good.risk_score, 1.0);
    assert_eq!(good.budget_variance_percent, -10.0);

    let bad = &metrics.projects[1];
    assert_eq!(bad.overdue_count, 1);
    assert_eq!(bad.risk_score, 10.0);
    assert_eq!(bad.risk_bucket, RiskBucket::High);
    assert_eq!(bad.budget_variance_percent, 30.0);

    assert_eq!(metrics.completion_rate, 50.0);
}

#[test]
fn test_completion_rate_always_in_range() {
    for completed in 0..=6 {
        let phases = (0..6)
            .map(|i| {
                let status = if i < completed {
                    PhaseStatus::Completed
                } else {
                    PhaseStatus::InProgress
                };
                open_phase(&format!("p{}", i), "Works", status)
            })
            .collect();
        let metrics = engine().compute_project_metrics(&[project("p", phases)]).result;
        assert!((0.0..=100.0).contains(&metrics.completion_rate));
    }
}

#[test]
fn test_oversized_windows_saturate_instead_of_panicking() {
    let projects = vec![project(
        "p1",
        vec![
            phase("far", "Works", PhaseStatus::NotStarted, 10, 5_000),
            completed_phase("done", "Works"),
        ],
    )];
    let engine = Engine::new(EngineConfig {
        upcoming_window_days: 100_000_000,
        recent_window_days: i64::MAX,
        ..config()
    });

    let metrics = engine.compute_project_metrics(&projects).result;
    assert_eq!(metrics.upcoming_deadline_count, 1);

    let departments = engine.compute_department_performance(&projects).result;
    assert_eq!(departments[0].total_phases, 2);
}
