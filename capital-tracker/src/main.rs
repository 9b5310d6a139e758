use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use capital_tracker::cli::{Args, OutputFormat, ReportKind};
use capital_tracker::snapshot::load_snapshot;
use capital_tracker::{Analysis, Diagnostic, Engine, PortfolioReport, ValidationReport};
use capital_tracker_sdk::{
    log_report_complete, log_report_diagnostic, log_report_header, log_report_line,
    DepartmentPerformance, ForecastEntry, ProjectMetrics, RiskAssessment,
};

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    args.validate()?;

    let engine = Engine::new(args.engine_config()?);
    let projects = load_snapshot(&args.snapshot)?;

    let has_errors = match args.report {
        ReportKind::Metrics => {
            let analysis = engine.compute_project_metrics(&projects);
            emit(&analysis, args.format, |a| {
                print_metrics(&a.result);
                print_diagnostics(&a.diagnostics);
            })?;
            analysis.has_errors()
        }
        ReportKind::Departments => {
            let analysis = engine.compute_department_performance(&projects);
            emit(&analysis, args.format, |a| {
                print_departments(&a.result);
                print_diagnostics(&a.diagnostics);
            })?;
            analysis.has_errors()
        }
        ReportKind::Forecast => {
            let analysis = engine.compute_forecast(&projects);
            emit(&analysis, args.format, |a| {
                print_forecast(&a.result);
                print_diagnostics(&a.diagnostics);
            })?;
            analysis.has_errors()
        }
        ReportKind::Assess => {
            let analysis = engine.assess(&projects);
            emit(&analysis, args.format, |a| {
                print_assessment(&a.result);
                print_diagnostics(&a.diagnostics);
            })?;
            analysis.has_errors()
        }
        ReportKind::Validate => {
            let report = engine.validate(&projects);
            emit(&report, args.format, print_validation)?;
            !report.is_valid()
        }
        ReportKind::All => {
            let analysis: Analysis<PortfolioReport> = engine.analyze(&projects);
            emit(&analysis, args.format, |a| {
                print_metrics(&a.result.metrics);
                print_departments(&a.result.departments);
                print_forecast(&a.result.forecast);
                print_diagnostics(&a.diagnostics);
            })?;
            analysis.has_errors()
        }
    };

    if args.strict && has_errors {
        anyhow::bail!("Snapshot has error-severity diagnostics (run without --strict to ignore)");
    }
    Ok(())
}

/// Print `value` as YAML/JSON, or hand it to `text` for the console layout
fn emit<T: Serialize>(value: &T, format: OutputFormat, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(value).context("Failed to serialize report as JSON")?;
            println!("{}", out);
        }
        OutputFormat::Yaml => {
            let out = serde_yaml::to_string(value).context("Failed to serialize report as YAML")?;
            print!("{}", out);
        }
        OutputFormat::Text => text(value),
    }
    Ok(())
}

fn print_metrics(metrics: &ProjectMetrics) {
    log_report_header!("Project Metrics", format!("{} phases", metrics.total_phases));
    log_report_line!("Completion rate", format!("{:.2}%", metrics.completion_rate));
    log_report_line!("Average delay", format!("{:.1} days", metrics.average_delay_days));
    log_report_line!(
        "Risk score",
        format!("{:.1} ({})", metrics.risk_score, metrics.risk_bucket.as_str())
    );
    log_report_line!(
        "Budget variance",
        format!(
            "{:.2}% ({})",
            metrics.budget_variance_percent,
            metrics.budget_bucket.as_str()
        )
    );
    log_report_line!("Overdue", metrics.overdue_count);
    log_report_line!("Upcoming deadlines", metrics.upcoming_deadline_count);
    log_report_line!(
        "Compliance",
        format!(
            "{} total, {} overdue, {} open urgent",
            metrics.compliance.total, metrics.compliance.overdue, metrics.compliance.open_urgent
        )
    );
    for project in &metrics.projects {
        log_report_line!(
            project.name,
            format!(
                "{:.2}% complete, reported {}% / computed {:.1}%, risk {:.1}",
                project.completion_rate,
                project.reported_progress,
                project.computed_progress,
                project.risk_score
            )
        );
    }
    log_report_complete!("Project metrics", metrics.projects.len());
}

fn print_departments(departments: &[DepartmentPerformance]) {
    log_report_header!(
        "Department Performance",
        format!("{} departments ranked", departments.len())
    );
    for d in departments {
        log_report_line!(
            format!("#{} {}", d.rank, d.department),
            format!(
                "{:.2}% ({:+.2} vs mean), delay {:.1}d, efficiency {:.2}, risk {:?}, trend {:?}",
                d.completion_rate,
                d.completion_delta_vs_mean,
                d.average_delay_days,
                d.efficiency,
                d.risk_level,
                d.performance_trend
            )
        );
    }
    log_report_complete!("Department ranking", departments.len());
}

fn print_forecast(entries: &[ForecastEntry]) {
    log_report_header!("Forecast", format!("{} phases in flight", entries.len()));
    for entry in entries {
        let mut detail = format!(
            "{} (confidence {}%)",
            entry.predicted_completion_date, entry.confidence
        );
        if !entry.risk_factors.is_empty() {
            detail.push_str(&format!(", risks: {}", entry.risk_factors.join(", ")));
        }
        if entry.has_low_historical_data() {
            detail.push_str(", low historical data");
        }
        log_report_line!(format!("{}/{}", entry.project_id, entry.phase_id), detail);
    }
    log_report_complete!("Forecast", entries.len());
}

fn print_assessment(assessment: &RiskAssessment) {
    log_report_header!("Risk & Budget", "Portfolio assessment");
    log_report_line!(
        "Risk",
        format!("{:.1} ({})", assessment.risk_score, assessment.risk_bucket.as_str())
    );
    log_report_line!(
        "Budget",
        format!(
            "{:.2}% ({})",
            assessment.budget_variance_percent,
            assessment.budget_bucket.as_str()
        )
    );
}

fn print_validation(report: &ValidationReport) {
    log_report_header!(
        "Validation",
        format!(
            "{} projects, {} phases checked",
            report.projects_checked, report.phases_checked
        )
    );
    print_diagnostics(&report.diagnostics);
    log_report_complete!("Validation", report.diagnostics.len());
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        log_report_diagnostic!(diagnostic.is_error(), diagnostic.message);
    }
}
