//! Completion forecasts for in-flight phases

use super::common::*;
use capital_tracker::error::EngineError;
use capital_tracker::forecast::{
    FACTOR_DEPARTMENT_RISK, FACTOR_DEPENDENCY_DEPTH, FACTOR_SCHEDULE_PRESSURE,
};
use capital_tracker::{Engine, EngineConfig};
use capital_tracker_sdk::{ForecastEntry, ForecastWarning, PhaseStatus, RiskLevel};

fn entry<'a>(entries: &'a [ForecastEntry], phase_id: &str) -> &'a ForecastEntry {
    entries
        .iter()
        .find(|e| e.phase_id == phase_id)
        .unwrap_or_else(|| panic!("no forecast entry for {}", phase_id))
}

#[test]
fn test_department_history_drives_predicted_date() {
    let projects = vec![project(
        "p1",
        vec![
            completed_phase("done-1", "Works"),
            completed_phase("done-2", "Works"),
            completed_phase("done-3", "Works"),
            overdue_phase("late", "Works", 4),
            open_phase("next", "Works", PhaseStatus::NotStarted),
        ],
    )];

    let forecast = engine().compute_forecast(&projects).result;
    // completed phases are not forecast
    assert_eq!(forecast.len(), 2);

    let next = entry(&forecast, "next");
    assert_eq!(next.predicted_completion_date, day(64));
    assert!(!next.has_low_historical_data());
    assert!(next.risk_factors.contains(&FACTOR_SCHEDULE_PRESSURE.to_string()));

    let late = entry(&forecast, "late");
    assert_eq!(late.predicted_completion_date, day(0));
    assert!(!late.risk_factors.contains(&FACTOR_SCHEDULE_PRESSURE.to_string()));
}

#[test]
fn test_thin_history_falls_back_to_cohort() {
    let projects = vec![
        project(
            "p1",
            vec![
                completed_phase("w1", "Works"),
                completed_phase("w2", "Works"),
                overdue_phase("w3", "Works", 3),
                overdue_phase("w4", "Works", 9),
            ],
        ),
        project(
            "p2",
            vec![
                completed_phase("l1", "Legal"),
                open_phase("l2", "Legal", PhaseStatus::InProgress),
            ],
        ),
    ];

    let forecast = engine().compute_forecast(&projects).result;
    let legal = entry(&forecast, "l2");
    assert!(legal.has_low_historical_data());
    assert_eq!(
        legal.warnings,
        vec![ForecastWarning::LowHistoricalData {
            department: "Legal".to_string(),
            completed_phases: 1,
        }]
    );
    // cohort mean delay over all overdue phases is 6
    assert_eq!(legal.predicted_completion_date, day(66));
    assert!(legal.risk_factors.is_empty());
}

#[test]
fn test_history_threshold_is_configurable() {
    let projects = vec![project(
        "p1",
        vec![
            completed_phase("l1", "Legal"),
            open_phase("l2", "Legal", PhaseStatus::InProgress),
        ],
    )];

    let lenient = Engine::new(EngineConfig {
        min_department_history: 1,
        ..config()
    });
    let forecast = lenient.compute_forecast(&projects).result;
    assert!(!entry(&forecast, "l2").has_low_historical_data());
}

#[test]
fn test_deep_dependency_chain_lowers_confidence() {
    let projects = vec![project(
        "p1",
        vec![
            open_phase("a", "Works", PhaseStatus::InProgress),
            with_deps(open_phase("b", "Works", PhaseStatus::NotStarted), &["a"]),
            with_deps(open_phase("c", "Works", PhaseStatus::NotStarted), &["b"]),
            with_deps(open_phase("d", "Works", PhaseStatus::NotStarted), &["c"]),
        ],
    )];

    let forecast = engine().compute_forecast(&projects).result;
    let a = entry(&forecast, "a");
    assert_eq!(a.confidence, 90);
    assert_eq!(a.dependency_chain_depth, 0);

    let c = entry(&forecast, "c");
    assert_eq!(c.confidence, 80);
    assert!(c.risk_factors.is_empty());

    let d = entry(&forecast, "d");
    assert_eq!(d.dependency_chain_depth, 3);
    assert_eq!(d.confidence, 75);
    assert_eq!(d.risk_factors, vec![FACTOR_DEPENDENCY_DEPTH.to_string()]);
}

#[test]
fn test_high_risk_department_lowers_confidence() {
    let projects = vec![project(
        "p1",
        vec![
            overdue_phase("late", "Civil", 10),
            open_phase("open", "Civil", PhaseStatus::InProgress),
        ],
    )];

    let forecast = engine().compute_forecast(&projects).result;
    let open = entry(&forecast, "open");
    assert_eq!(open.confidence, 80);
    assert!(open.risk_factors.contains(&FACTOR_DEPARTMENT_RISK.to_string()));
    assert!(open.risk_factors.contains(&FACTOR_SCHEDULE_PRESSURE.to_string()));
}

#[test]
fn test_urgent_heavy_department_counts_as_high_risk() {
    // Delay ratio 1/5 is only medium, but the risk score is capped at 10
    let projects = vec![project(
        "p1",
        vec![
            overdue_phase("late", "Civil", 3),
            open_phase("u1", "Civil", PhaseStatus::Urgent),
            open_phase("u2", "Civil", PhaseStatus::Urgent),
            open_phase("u3", "Civil", PhaseStatus::Urgent),
            open_phase("open", "Civil", PhaseStatus::InProgress),
        ],
    )];

    let departments = engine().compute_department_performance(&projects).result;
    assert_eq!(departments[0].risk_level, RiskLevel::Medium);

    let forecast = engine().compute_forecast(&projects).result;
    let open = entry(&forecast, "open");
    assert_eq!(open.confidence, 80);
    assert_eq!(
        open.risk_factors,
        vec![
            FACTOR_DEPARTMENT_RISK.to_string(),
            FACTOR_SCHEDULE_PRESSURE.to_string()
        ]
    );
}

#[test]
fn test_delay_heavy_but_low_score_department_keeps_confidence() {
    // 3 of 10 overdue with nothing urgent scores 6, the Medium bucket
    let mut phases: Vec<_> = (0..3)
        .map(|i| overdue_phase(&format!("late-{}", i), "Works", 2))
        .collect();
    phases.extend((0..6).map(|i| completed_phase(&format!("done-{}", i), "Works")));
    phases.push(open_phase("open", "Works", PhaseStatus::InProgress));
    let projects = vec![project("p1", phases)];

    let forecast = engine().compute_forecast(&projects).result;
    let open = entry(&forecast, "open");
    assert_eq!(open.confidence, 90);
    assert!(!open.risk_factors.contains(&FACTOR_DEPARTMENT_RISK.to_string()));
}

#[test]
fn test_phase_without_end_date_is_reported_not_forecast() {
    let mut undated = open_phase("undated", "Works", PhaseStatus::InProgress);
    undated.end_date = None;
    let projects = vec![project(
        "p1",
        vec![undated, open_phase("dated", "Works", PhaseStatus::InProgress)],
    )];

    let analysis = engine().compute_forecast(&projects);
    let ids: Vec<&str> = analysis.result.iter().map(|e| e.phase_id.as_str()).collect();
    assert_eq!(ids, vec!["dated"]);
    assert!(analysis.has_errors());
    assert!(analysis.diagnostics.iter().any(|d| d.error
        == EngineError::missing_field("p1", "undated", "end_date")));
}

#[test]
fn test_urgent_and_delayed_phases_are_not_forecast() {
    let projects = vec![project(
        "p1",
        vec![
            open_phase("urgent", "Works", PhaseStatus::Urgent),
            open_phase("delayed", "Works", PhaseStatus::Delayed),
            open_phase("moving", "Works", PhaseStatus::InProgress),
        ],
    )];
    let forecast = engine().compute_forecast(&projects).result;
    assert_eq!(forecast.len(), 1);
    assert_eq!(forecast[0].phase_id, "moving");
}

#[test]
fn test_confidence_stays_in_bounds_on_long_chains() {
    let phases = (0..25)
        .map(|i| {
            let phase = open_phase(&format!("s{}", i), "Works", PhaseStatus::NotStarted);
            if i == 0 {
                phase
            } else {
                with_deps(phase, &[&format!("s{}", i - 1)])
            }
        })
        .collect();
    let forecast = engine().compute_forecast(&[project("p1", phases)]).result;

    assert_eq!(forecast.len(), 25);
    assert!(forecast.iter().all(|e| (20..=95).contains(&e.confidence)));
    assert_eq!(entry(&forecast, "s24").confidence, 20);
}
