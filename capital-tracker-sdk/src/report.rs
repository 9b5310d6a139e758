//! Derived records produced by the engine.
//!
//! None of these carry identity or persistence; they are recomputed from a
//! full snapshot on every call and handed back to the host for rendering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{PhaseStatus, ProjectStatus, RiskLevel};

// ============================================================================
// Buckets
// ============================================================================

/// Human-readable risk bucket for executive summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RiskBucket {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low",
            RiskBucket::Medium => "Medium",
            RiskBucket::High => "High",
        }
    }
}

/// Spend position relative to budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BudgetBucket {
    #[serde(rename = "Over Budget")]
    OverBudget,
    #[default]
    #[serde(rename = "Under Budget")]
    UnderBudget,
}

impl BudgetBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetBucket::OverBudget => "Over Budget",
            BudgetBucket::UnderBudget => "Under Budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    #[default]
    Stable,
    Declining,
}

// ============================================================================
// Project Metrics
// ============================================================================

/// Compliance checkpoint rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComplianceSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Marked overdue, or still open past its due date
    pub overdue: usize,
    /// Open checkpoints with urgent priority
    pub open_urgent: usize,
}

/// Per-project breakdown inside [`ProjectMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub name: String,
    pub status: ProjectStatus,
    /// Progress as reported by the host
    pub reported_progress: u8,
    /// Mean effective progress of the aggregated phases
    pub computed_progress: f64,
    pub completion_rate: f64,
    pub overdue_count: usize,
    pub risk_score: f64,
    pub risk_bucket: RiskBucket,
    pub budget_variance_percent: f64,
}

/// Portfolio-level metrics for a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectMetrics {
    pub total_phases: usize,
    pub completion_rate: f64,
    pub average_delay_days: f64,
    pub budget_variance_percent: f64,
    pub budget_bucket: BudgetBucket,
    pub risk_score: f64,
    pub risk_bucket: RiskBucket,
    /// Open phases ending within the upcoming window
    pub upcoming_deadline_count: usize,
    pub overdue_count: usize,
    pub urgent_count: usize,
    pub average_progress: f64,
    pub compliance: ComplianceSummary,
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

/// Output of the risk and budget analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_bucket: RiskBucket,
    pub budget_variance_percent: f64,
    pub budget_bucket: BudgetBucket,
}

// ============================================================================
// Department Performance
// ============================================================================

/// Per-department aggregate plus its position in the cross-department ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentPerformance {
    pub department: String,

    /// 1-based position in the ranking
    pub rank: usize,

    pub completion_rate: f64,

    /// Completion rate minus the mean completion rate of all departments
    pub completion_delta_vs_mean: f64,

    pub average_delay_days: f64,
    pub risk_level: RiskLevel,

    pub total_phases: usize,
    pub completed_phases: usize,
    pub pending_phases: usize,
    pub overdue_phases: usize,

    pub budget_allocated: f64,
    pub budget_used: f64,
    pub budget_utilization: f64,

    pub efficiency: f64,
    pub performance_trend: PerformanceTrend,

    /// Distinct responsible roles
    pub team_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<NaiveDate>,
}

// ============================================================================
// Forecast
// ============================================================================

/// Non-fatal condition attached to a forecast entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// Department has too few completed phases; the cohort average delay was used
    LowHistoricalData {
        department: String,
        completed_phases: usize,
    },
}

/// Predicted completion for a phase that is still in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub project_id: String,
    pub phase_id: String,
    pub phase_name: String,
    pub department: String,
    pub status: PhaseStatus,
    pub predicted_completion_date: NaiveDate,
    /// 20-95
    pub confidence: u8,
    pub dependency_chain_depth: usize,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ForecastWarning>,
}

impl ForecastEntry {
    pub fn has_low_historical_data(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ForecastWarning::LowHistoricalData { .. }))
    }
}
