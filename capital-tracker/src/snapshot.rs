//! Host-side snapshot loading.
//!
//! The engine never touches files; this module is for hosts (the bundled CLI
//! among them) that keep snapshots on disk. Both YAML and JSON are accepted,
//! either as a bare list of projects or wrapped as `{ projects: [...] }`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use capital_tracker_sdk::Project;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<Project>),
    Wrapped { projects: Vec<Project> },
}

impl SnapshotDocument {
    fn into_projects(self) -> Vec<Project> {
        match self {
            SnapshotDocument::List(projects) => projects,
            SnapshotDocument::Wrapped { projects } => projects,
        }
    }
}

/// Serialization format of a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Yaml,
        }
    }
}

/// Strip a leading YAML document separator
fn clean_yaml(yaml: &str) -> &str {
    yaml.trim().trim_start_matches("---").trim()
}

/// Parse snapshot text in the given format
pub fn parse_snapshot(text: &str, format: SnapshotFormat) -> Result<Vec<Project>> {
    let document: SnapshotDocument = match format {
        SnapshotFormat::Json => {
            serde_json::from_str(text).context("Failed to parse snapshot JSON")?
        }
        SnapshotFormat::Yaml => {
            let yaml = clean_yaml(text);
            if yaml.is_empty() {
                return Ok(Vec::new());
            }
            serde_yaml::from_str(yaml).context("Failed to parse snapshot YAML")?
        }
    };
    Ok(document.into_projects())
}

/// Load a snapshot file, choosing the format by extension
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<Project>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    parse_snapshot(&text, SnapshotFormat::from_path(path))
        .with_context(|| format!("Invalid snapshot file: {}", path.display()))
}
