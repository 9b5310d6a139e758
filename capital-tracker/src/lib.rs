//! Phase rollup, risk, department ranking and forecasting for capital
//! project portfolios.
//!
//! Hosts hand the [`Engine`] a full snapshot of [`Project`] records and get
//! back derived metrics plus any diagnostics found on the way. The engine is
//! stateless: every call recomputes from the snapshot it is given.
//!
//! ## Module Structure
//!
//! - `phase_tree` - Flattening, ID index, cycle detection, dependency depth
//! - `rollup` - Completion, delay, budget variance, risk score, progress
//! - `prepare` - Per-project validation and classification (parallel)
//! - `risk` - Risk and budget buckets
//! - `metrics` - Portfolio and per-project metrics
//! - `departments` - Department scoring and ranking
//! - `forecast` - Completion forecasts for in-flight phases
//! - `engine` - Public operations
//! - `config`, `error` - Engine configuration and diagnostics
//! - `snapshot`, `cli` - Host-side loading and argument parsing

pub mod cli;
pub mod config;
pub mod departments;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod phase_tree;
pub mod prepare;
pub mod risk;
pub mod rollup;
pub mod snapshot;

pub use capital_tracker_sdk as sdk;
pub use capital_tracker_sdk::{
    DepartmentPerformance, ForecastEntry, Phase, Project, ProjectMetrics, RiskAssessment,
};

pub use config::EngineConfig;
pub use engine::{Analysis, Engine, PortfolioReport, ValidationReport};
pub use error::{Diagnostic, EngineError, Severity};
