//! Snapshot preparation: the per-project fan-out every report starts from.
//!
//! Each project is checked independently (cycle detection, required
//! fields, dates) on the rayon pool, then the surviving phases are merged in
//! input order. A cyclic project drops out entirely; a phase with missing or
//! bad fields drops out alone. Either way the reason lands in diagnostics.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use capital_tracker_sdk::{DateValue, Phase, Project};

use crate::config::EngineConfig;
use crate::error::{Diagnostic, EngineError};
use crate::phase_tree::{top_level, PhaseGraph};
use crate::rollup;

/// A phase that passed validation, with the facts later stages need
#[derive(Debug, Clone)]
pub struct PreparedPhase<'a> {
    pub phase: &'a Phase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub overdue: bool,
    pub delay_days: i64,
    pub dependency_depth: usize,
    /// Even share of the project's budget
    pub budget_share: f64,
    /// Even share of the project's actual cost
    pub cost_share: f64,
}

/// A project that passed cycle detection and its aggregable phases
#[derive(Debug, Clone)]
pub struct PreparedProject<'a> {
    pub project: &'a Project,
    pub phases: Vec<PreparedPhase<'a>>,
}

/// Merged result of preparing a whole snapshot
#[derive(Debug, Clone)]
pub struct PreparedSnapshot<'a> {
    pub as_of: NaiveDate,
    pub projects: Vec<PreparedProject<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> PreparedSnapshot<'a> {
    /// Every aggregable phase across all projects, in project then tree order
    pub fn phases(&self) -> impl Iterator<Item = &PreparedPhase<'a>> + '_ {
        self.projects.iter().flat_map(|p| p.phases.iter())
    }

    pub fn phase_count(&self) -> usize {
        self.projects.iter().map(|p| p.phases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.phase_count() == 0
    }
}

struct ProjectOutcome<'a> {
    prepared: Option<PreparedProject<'a>>,
    diagnostics: Vec<EngineError>,
}

/// Check one phase's required fields and dates.
///
/// Returns the resolved `(start, end)` or every problem found.
pub fn check_phase(project_id: &str, phase: &Phase) -> Result<(NaiveDate, NaiveDate), Vec<EngineError>> {
    let mut problems = Vec::new();

    if phase.department.trim().is_empty() {
        problems.push(EngineError::missing_field(project_id, &phase.id, "department"));
    }

    let mut resolve = |value: &Option<DateValue>, field: &'static str| match value {
        None => {
            problems.push(EngineError::missing_field(project_id, &phase.id, field));
            None
        }
        Some(value) => {
            let resolved = value.resolve();
            if resolved.is_none() {
                problems.push(EngineError::invalid_date(
                    project_id,
                    &phase.id,
                    field,
                    value.as_text(),
                ));
            }
            resolved
        }
    };
    let start = resolve(&phase.start_date, "start_date");
    let end = resolve(&phase.end_date, "end_date");

    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            problems.push(EngineError::InvalidDateRange {
                project_id: project_id.to_string(),
                phase_id: phase.id.clone(),
                start,
                end,
            });
            Err(problems)
        }
        (Some(start), Some(end)) if problems.is_empty() => Ok((start, end)),
        _ => Err(problems),
    }
}

fn prepare_project<'a>(project: &'a Project, config: &EngineConfig, as_of: NaiveDate) -> ProjectOutcome<'a> {
    let graph = PhaseGraph::build(project);
    let mut diagnostics = graph.warnings();

    if let Some(cycle) = graph.find_cycle() {
        warn!(project = %project.id, cycle = %cycle.join(" -> "), "Excluding project with cyclic dependencies");
        diagnostics.push(EngineError::cyclic(&project.id, cycle));
        return ProjectOutcome {
            prepared: None,
            diagnostics,
        };
    }

    let candidates = if config.include_sub_phases {
        graph.phases().to_vec()
    } else {
        top_level(project)
    };
    let depths = graph.dependency_depths();

    let mut accepted = Vec::with_capacity(candidates.len());
    for phase in &candidates {
        match check_phase(&project.id, phase) {
            Ok((start, end)) => accepted.push((*phase, start, end)),
            Err(problems) => {
                debug!(project = %project.id, phase = %phase.id, problems = problems.len(), "Excluding phase from aggregates");
                diagnostics.extend(problems);
            }
        }
    }

    let share = |total: f64| rollup::ratio(total, accepted.len() as f64);
    let budget_share = share(project.budget);
    let cost_share = share(project.actual_cost);

    let phases = accepted
        .into_iter()
        .map(|(phase, start, end)| PreparedPhase {
            phase,
            start,
            end,
            overdue: rollup::is_overdue(phase, as_of),
            delay_days: rollup::delay_days(phase, as_of),
            dependency_depth: depths.get(phase.id.as_str()).copied().unwrap_or(0),
            budget_share,
            cost_share,
        })
        .collect();

    ProjectOutcome {
        prepared: Some(PreparedProject { project, phases }),
        diagnostics,
    }
}

/// Prepare a snapshot for aggregation
pub fn prepare<'a>(projects: &'a [Project], config: &EngineConfig) -> PreparedSnapshot<'a> {
    let as_of = config.as_of_date();

    let outcomes: Vec<ProjectOutcome<'a>> = projects
        .par_iter()
        .map(|project| prepare_project(project, config, as_of))
        .collect();

    let mut snapshot = PreparedSnapshot {
        as_of,
        projects: Vec::with_capacity(outcomes.len()),
        diagnostics: Vec::new(),
    };
    for outcome in outcomes {
        snapshot
            .diagnostics
            .extend(outcome.diagnostics.into_iter().map(Diagnostic::from));
        if let Some(prepared) = outcome.prepared {
            snapshot.projects.push(prepared);
        }
    }

    debug!(
        projects = snapshot.projects.len(),
        phases = snapshot.phase_count(),
        diagnostics = snapshot.diagnostics.len(),
        %as_of,
        "Prepared snapshot"
    );
    snapshot
}

/// Pre-flight validation of every phase at every depth, without aggregation.
///
/// Returns `(phases_checked, diagnostics)`.
pub fn validate_projects(projects: &[Project]) -> (usize, Vec<Diagnostic>) {
    let per_project: Vec<(usize, Vec<EngineError>)> = projects
        .par_iter()
        .map(|project| {
            let graph = PhaseGraph::build(project);
            let mut problems = graph.warnings();
            if let Some(cycle) = graph.find_cycle() {
                problems.push(EngineError::cyclic(&project.id, cycle));
            }
            for phase in graph.phases() {
                if let Err(errors) = check_phase(&project.id, phase) {
                    problems.extend(errors);
                }
            }
            (graph.phases().len(), problems)
        })
        .collect();

    let mut checked = 0;
    let mut diagnostics = Vec::new();
    for (count, problems) in per_project {
        checked += count;
        diagnostics.extend(problems.into_iter().map(Diagnostic::from));
    }
    (checked, diagnostics)
}
