//! Public engine surface.
//!
//! Every operation takes an immutable snapshot and returns fresh values
//! together with the diagnostics collected while preparing it. Nothing is
//! cached between calls.

use serde::Serialize;
use tracing::info;

use capital_tracker_sdk::{
    DepartmentPerformance, ForecastEntry, Project, ProjectMetrics, RiskAssessment,
};

use crate::config::EngineConfig;
use crate::departments::rank_departments;
use crate::error::Diagnostic;
use crate::forecast::forecast;
use crate::metrics::project_metrics;
use crate::prepare::{prepare, validate_projects};
use crate::risk;

/// A result plus the diagnostics gathered while computing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis<T> {
    pub result: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Analysis<T> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        Analysis {
            result: f(self.result),
            diagnostics: self.diagnostics,
        }
    }
}

/// Outcome of a pre-flight [`Engine::validate`] call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub projects_checked: usize,
    pub phases_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// True when nothing of error severity was found; warnings are allowed
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Every report for one snapshot, computed from a single preparation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub metrics: ProjectMetrics,
    pub departments: Vec<DepartmentPerformance>,
    pub forecast: Vec<ForecastEntry>,
}

/// Rollup, ranking and forecasting engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Completion, delay, budget, risk and deadline metrics for the portfolio
    pub fn compute_project_metrics(&self, projects: &[Project]) -> Analysis<ProjectMetrics> {
        let snapshot = prepare(projects, &self.config);
        let metrics = project_metrics(&snapshot, &self.config);
        info!(
            projects = projects.len(),
            phases = metrics.total_phases,
            completion_rate = metrics.completion_rate,
            risk_score = metrics.risk_score,
            "Computed project metrics"
        );
        Analysis {
            result: metrics,
            diagnostics: snapshot.diagnostics,
        }
    }

    /// Departments scored and ranked, rank 1 first
    pub fn compute_department_performance(
        &self,
        projects: &[Project],
    ) -> Analysis<Vec<DepartmentPerformance>> {
        let snapshot = prepare(projects, &self.config);
        let departments = rank_departments(&snapshot, &self.config);
        info!(departments = departments.len(), "Ranked departments");
        Analysis {
            result: departments,
            diagnostics: snapshot.diagnostics,
        }
    }

    /// Predicted completion for every in-flight phase
    pub fn compute_forecast(&self, projects: &[Project]) -> Analysis<Vec<ForecastEntry>> {
        let snapshot = prepare(projects, &self.config);
        let departments = rank_departments(&snapshot, &self.config);
        let entries = forecast(&snapshot, &departments, &self.config);
        info!(entries = entries.len(), "Computed forecast");
        Analysis {
            result: entries,
            diagnostics: snapshot.diagnostics,
        }
    }

    /// Risk score and budget variance with their buckets
    pub fn assess(&self, projects: &[Project]) -> Analysis<RiskAssessment> {
        let snapshot = prepare(projects, &self.config);
        Analysis {
            result: risk::assess(&snapshot),
            diagnostics: snapshot.diagnostics,
        }
    }

    /// All reports from one preparation pass
    pub fn analyze(&self, projects: &[Project]) -> Analysis<PortfolioReport> {
        let snapshot = prepare(projects, &self.config);
        let metrics = project_metrics(&snapshot, &self.config);
        let departments = rank_departments(&snapshot, &self.config);
        let forecast = forecast(&snapshot, &departments, &self.config);
        info!(
            projects = projects.len(),
            departments = departments.len(),
            forecast = forecast.len(),
            diagnostics = snapshot.diagnostics.len(),
            "Analyzed portfolio"
        );
        Analysis {
            result: PortfolioReport {
                metrics,
                departments,
                forecast,
            },
            diagnostics: snapshot.diagnostics,
        }
    }

    /// Cycle detection and required-field checks over every phase, no metrics
    pub fn validate(&self, projects: &[Project]) -> ValidationReport {
        let (phases_checked, diagnostics) = validate_projects(projects);
        info!(
            projects = projects.len(),
            phases = phases_checked,
            problems = diagnostics.len(),
            "Validated snapshot"
        );
        ValidationReport {
            projects_checked: projects.len(),
            phases_checked,
            diagnostics,
        }
    }
}
