//! Engine configuration
//!
//! Every knob has a default, so an empty YAML file (or no file at all) is a
//! valid configuration. Hosts usually load a file and then override single
//! values from their own flags.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest upcoming or recent window accepted, in days
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Configuration for an [`Engine`](crate::Engine)
///
/// # Examples
///
/// ```
/// use capital_tracker::EngineConfig;
///
/// let config = EngineConfig {
///     include_sub_phases: true,
///     ..Default::default()
/// };
/// assert_eq!(config.upcoming_window_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Aggregate over every phase in the tree instead of top-level phases only
    pub include_sub_phases: bool,
    /// Reference date for overdue and window checks (defaults to today)
    pub as_of: Option<NaiveDate>,
    /// Days ahead counted as an upcoming deadline
    pub upcoming_window_days: i64,
    /// Days back whose started phases drive the performance trend
    pub recent_window_days: i64,
    /// Completed phases a department needs before its own delay history is trusted
    pub min_department_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_sub_phases: false,
            as_of: None,
            upcoming_window_days: 30,
            recent_window_days: 30,
            min_department_history: 2,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse engine configuration YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject windows that are negative or too long to count from a date
    pub fn validate(&self) -> Result<()> {
        for (name, days) in [
            ("upcoming_window_days", self.upcoming_window_days),
            ("recent_window_days", self.recent_window_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                anyhow::bail!("{} must be between 0 and {} (got {})", name, MAX_WINDOW_DAYS, days);
            }
        }
        Ok(())
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// The reference date for this configuration
    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}
