//! Input records supplied by the host's document/workflow store.
//!
//! These mirror what the workflow system persists for a capital project: a
//! project owns an ordered list of top-level phases, and each phase may own
//! sub-phases, dependency references and compliance checkpoints. The engine
//! only ever reads them.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Dates
// ============================================================================

/// A calendar date as sent by the host.
///
/// Hosts do not always send clean ISO dates, so anything that does not parse
/// on the way in is kept verbatim instead of failing the whole snapshot. The
/// engine resolves it later and reports the phase when it cannot. Numbers
/// and booleans are kept too but never resolve to a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// Parsed `YYYY-MM-DD` date
    Date(NaiveDate),
    /// Text that was not a plain ISO date
    Raw(String),
    /// Bare number such as `20250101`
    Number(f64),
    Flag(bool),
}

impl DateValue {
    /// Resolve to a calendar date, if the value is usable
    pub fn resolve(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Date(date) => Some(*date),
            DateValue::Raw(raw) => parse_date(raw),
            DateValue::Number(_) | DateValue::Flag(_) => None,
        }
    }

    /// Original text of the value, for diagnostics
    pub fn as_text(&self) -> String {
        match self {
            DateValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            DateValue::Raw(raw) => raw.clone(),
            DateValue::Number(number) => number.to_string(),
            DateValue::Flag(flag) => flag.to_string(),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Date(date)
    }
}

/// Parse the date formats hosts are known to send.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date part is kept) and
/// `YYYY/MM/DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y/%m/%d").ok()
}

// ============================================================================
// Enumerations
// ============================================================================

/// Workflow state of a phase. Overdue is inferred separately and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Delayed,
    Urgent,
}

/// Where a phase's `progress` value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    /// The value set on the phase itself is authoritative
    #[default]
    LeafReported,
    /// The value is derived from the phase's sub-phases
    RollupComputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Completed,
    OnHold,
}

/// Low/medium/high classification used for advisory project risk and
/// computed department risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    #[default]
    Pending,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

// ============================================================================
// Records
// ============================================================================

/// A dated sub-obligation of a phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheckpoint {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateValue>,

    #[serde(default)]
    pub status: CheckpointStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, alias = "responsibleRole")]
    pub responsible_role: String,
}

/// A schedulable unit of project work, possibly decomposed into sub-phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    /// Unique phase ID within its project
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateValue>,

    #[serde(default, alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateValue>,

    #[serde(default)]
    pub status: PhaseStatus,

    /// Percent complete; out-of-range values are clamped to 0-100 when used
    #[serde(default)]
    pub progress: i64,

    #[serde(default, alias = "progressSource")]
    pub progress_source: ProgressSource,

    #[serde(default, alias = "responsibleRole")]
    pub responsible_role: String,

    /// Owning department, the grouping key for department analytics
    #[serde(default)]
    pub department: String,

    #[serde(default, alias = "subPhases", skip_serializing_if = "Vec::is_empty")]
    pub sub_phases: Vec<Phase>,

    /// IDs of phases that must precede this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,

    #[serde(
        default,
        alias = "complianceCheckpoints",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub compliance_checkpoints: Vec<ComplianceCheckpoint>,
}

impl Phase {
    /// Minimal phase with the given id and name; everything else defaulted
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            start_date: None,
            end_date: None,
            status: PhaseStatus::default(),
            progress: 0,
            progress_source: ProgressSource::default(),
            responsible_role: String::new(),
            department: String::new(),
            sub_phases: Vec::new(),
            dependencies: Vec::new(),
            documents: Vec::new(),
            compliance_checkpoints: Vec::new(),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start_date.as_ref().and_then(DateValue::resolve)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end_date.as_ref().and_then(DateValue::resolve)
    }

    pub fn is_completed(&self) -> bool {
        self.status == PhaseStatus::Completed
    }
}

/// A capital project and its ordered top-level phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateValue>,

    #[serde(default, alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateValue>,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Host-reported overall progress; not required to match the phase rollup
    #[serde(default, alias = "totalProgress")]
    pub total_progress: i64,

    #[serde(default)]
    pub budget: f64,

    #[serde(default, alias = "actualCost")]
    pub actual_cost: f64,

    /// Advisory level set by the host, distinct from the computed risk score
    #[serde(default, alias = "riskLevel")]
    pub risk_level: RiskLevel,

    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            start_date: None,
            end_date: None,
            status: ProjectStatus::default(),
            total_progress: 0,
            budget: 0.0,
            actual_cost: 0.0,
            risk_level: RiskLevel::default(),
            phases: Vec::new(),
        }
    }
}
