//! Command-line arguments for the `capital-tracker` host binary.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Metrics,
    Departments,
    Forecast,
    Assess,
    Validate,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Text,
}

/// Capital project portfolio analytics
///
/// Reads a project snapshot and prints rollup metrics, department rankings,
/// completion forecasts or a validation report.
#[derive(Parser, Debug, Clone)]
#[command(name = "capital-tracker")]
#[command(about = "Capital project portfolio analytics")]
#[command(version)]
pub struct Args {
    /// Path to the project snapshot (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub snapshot: String,

    /// Path to an engine configuration YAML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Which report to produce
    #[arg(long, value_enum, default_value = "all")]
    pub report: ReportKind,

    /// Reference date (YYYY-MM-DD) for overdue and window checks; defaults to today
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Include sub-phases in aggregates instead of top-level phases only
    #[arg(long)]
    pub include_sub_phases: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Exit with an error when error-severity diagnostics are found
    #[arg(long)]
    pub strict: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.snapshot.trim().is_empty() {
            anyhow::bail!("--snapshot must not be empty");
        }
        if let Some(config) = &self.config {
            if config.trim().is_empty() {
                anyhow::bail!("--config must not be empty when given");
            }
        }
        Ok(())
    }

    /// Load the configuration file (if any) and apply flag overrides on top
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_yaml_file(path)?,
            None => EngineConfig::default(),
        };
        if self.include_sub_phases {
            config.include_sub_phases = true;
        }
        if self.as_of.is_some() {
            config.as_of = self.as_of;
        }
        config.validate()?;
        Ok(config)
    }
}
