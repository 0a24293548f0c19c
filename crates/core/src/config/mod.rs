//! Slicer configuration and target-line loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod targets;

pub use targets::{load_target_lines, parse_target_lines, read_target_lines, TargetLines};

/// Default file listing the branch lines of interest.
pub const DEFAULT_TARGETS_FILE: &str = "branch_info.txt";

/// Errors reading configuration inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serializable slicer settings. Every field has a default, so an empty
/// document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Callees whose results are externally controlled.
    pub input_primitives: Vec<String>,
    /// Callees whose first argument is a format string.
    pub format_primitives: Vec<String>,
    /// Target-line list, relative to the working directory.
    pub targets_file: Option<String>,
    /// Directory the module's relative source path is resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            input_primitives: [
                "getchar",
                "getc",
                "fgetc",
                "fopen",
                "fread",
                "fgets",
                "gets",
                "getline",
                "read",
                "scanf",
                "fscanf",
                "__isoc99_scanf",
                "__isoc99_fscanf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            format_primitives: vec!["printf".to_string()],
            targets_file: Some(DEFAULT_TARGETS_FILE.to_string()),
            source_root: None,
        }
    }
}

impl SlicerConfig {
    pub fn is_input_primitive(&self, callee: &str) -> bool {
        self.input_primitives.iter().any(|p| p == callee)
    }

    pub fn is_format_primitive(&self, callee: &str) -> bool {
        self.format_primitives.iter().any(|p| p == callee)
    }
}

/// Load a slicer config from JSON (`.json`) or YAML (anything else).
pub fn load_slicer_config(path: &Path) -> Result<SlicerConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read slicer config at {}", path.display()))?;
    let config = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body).context("Failed to parse slicer config JSON")?
    } else {
        serde_yaml::from_str(&body).context("Failed to parse slicer config YAML")?
    };
    Ok(config)
}
