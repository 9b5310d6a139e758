//! Error types and diagnostics for the engine
//!
//! Structural problems in a snapshot never abort a call. They are collected
//! as [`Diagnostic`]s and returned next to whatever could still be computed.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Structural problem found in a project snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineError {
    /// A phase appears in its own transitive dependency closure.
    /// The whole project is excluded from results.
    #[error("cyclic dependency in project {project_id}: {}", cycle.join(" -> "))]
    CyclicDependency {
        project_id: String,
        cycle: Vec<String>,
    },

    /// Phase lacks department, start date or end date; the phase is excluded
    #[error("phase {phase_id} in project {project_id} is missing required field `{field}`")]
    MissingRequiredField {
        project_id: String,
        phase_id: String,
        field: &'static str,
    },

    /// Date text that could not be resolved; the phase is excluded
    #[error("phase {phase_id} in project {project_id} has unparsable {field}: {value:?}")]
    InvalidDate {
        project_id: String,
        phase_id: String,
        field: &'static str,
        value: String,
    },

    /// End date earlier than start date; the phase is excluded
    #[error("phase {phase_id} in project {project_id} ends ({end}) before it starts ({start})")]
    InvalidDateRange {
        project_id: String,
        phase_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("phase {phase_id} in project {project_id} depends on unknown phase {dependency}")]
    UnknownDependency {
        project_id: String,
        phase_id: String,
        dependency: String,
    },

    #[error("project {project_id} has more than one phase with id {phase_id}")]
    DuplicatePhaseId {
        project_id: String,
        phase_id: String,
    },
}

impl EngineError {
    pub fn cyclic(project_id: impl Into<String>, cycle: Vec<String>) -> Self {
        Self::CyclicDependency {
            project_id: project_id.into(),
            cycle,
        }
    }

    pub fn missing_field(
        project_id: impl Into<String>,
        phase_id: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingRequiredField {
            project_id: project_id.into(),
            phase_id: phase_id.into(),
            field,
        }
    }

    pub fn invalid_date(
        project_id: impl Into<String>,
        phase_id: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidDate {
            project_id: project_id.into(),
            phase_id: phase_id.into(),
            field,
            value: value.into(),
        }
    }

    /// Warnings leave the phase in the aggregates; errors take it (or its project) out
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownDependency { .. } | Self::DuplicatePhaseId { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn project_id(&self) -> &str {
        match self {
            Self::CyclicDependency { project_id, .. }
            | Self::MissingRequiredField { project_id, .. }
            | Self::InvalidDate { project_id, .. }
            | Self::InvalidDateRange { project_id, .. }
            | Self::UnknownDependency { project_id, .. }
            | Self::DuplicatePhaseId { project_id, .. } => project_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One entry of the per-call diagnostics list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub error: EngineError,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<EngineError> for Diagnostic {
    fn from(error: EngineError) -> Self {
        Self {
            severity: error.severity(),
            message: error.to_string(),
            error,
        }
    }
}
