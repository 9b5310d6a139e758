//! Records shared between the capital-tracker engine and its hosts.
//!
//! Hosts build [`Project`] snapshots from their own store and receive the
//! derived records in [`report`] back. Nothing here carries behaviour beyond
//! date resolution and small accessors.

pub mod model;
pub mod report;

pub use model::{
    parse_date, CheckpointStatus, ComplianceCheckpoint, DateValue, Phase, PhaseStatus, Priority,
    ProgressSource, Project, ProjectStatus, RiskLevel,
};
pub use report::{
    BudgetBucket, ComplianceSummary, DepartmentPerformance, ForecastEntry, ForecastWarning,
    PerformanceTrend, ProjectMetrics, ProjectSummary, RiskAssessment, RiskBucket,
};

// ============================================================================
// Console Report Macros (for CLI hosts)
// ============================================================================
// Colored, human-readable output for hosts that print reports to a terminal.
// Machine-readable output goes through serde instead.

/// Prints a report section header.
///
/// # Example
/// ```
/// use capital_tracker_sdk::log_report_header;
/// log_report_header!("Department Performance", "3 departments ranked");
/// ```
///
/// Outputs:
/// ```text
/// ═══ Department Performance ═══
/// 3 departments ranked
/// ```
#[macro_export]
macro_rules! log_report_header {
    ($title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ {} ═══\x1b[0m", $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Prints one labelled value line.
///
/// # Example
/// ```
/// use capital_tracker_sdk::log_report_line;
/// log_report_line!("Completion rate", format!("{:.2}%", 50.0));
/// ```
///
/// Outputs:
/// ```text
///   Completion rate: 50.00%
/// ```
#[macro_export]
macro_rules! log_report_line {
    ($label:expr, $value:expr) => {
        println!("  \x1b[2m{}:\x1b[0m {}", $label, $value);
    };
}

/// Prints a diagnostic line, red for errors and yellow for warnings.
///
/// # Example
/// ```
/// use capital_tracker_sdk::log_report_diagnostic;
/// log_report_diagnostic!(true, "cyclic dependency in project p1: A -> B -> A");
/// ```
#[macro_export]
macro_rules! log_report_diagnostic {
    ($is_error:expr, $message:expr) => {
        if $is_error {
            println!("\x1b[31m  ✗ {}\x1b[0m", $message);
        } else {
            println!("\x1b[33m  ⚠ {}\x1b[0m", $message);
        }
    };
}

/// Prints a closing line for a report section.
///
/// # Example
/// ```
/// use capital_tracker_sdk::log_report_complete;
/// log_report_complete!("Forecast", 12);
/// ```
///
/// Outputs:
/// ```text
/// ✓ Forecast complete (12 entries)
/// ```
#[macro_export]
macro_rules! log_report_complete {
    ($title:expr, $count:expr) => {
        println!("\x1b[32m✓ {} complete ({} entries)\x1b[0m", $title, $count);
    };
}
