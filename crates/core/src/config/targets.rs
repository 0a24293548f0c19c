//! Target-line list: one record per line, line number in the second
//! comma-delimited field (`file.c,12,...`).

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Sorted, de-duplicated line numbers of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetLines(BTreeSet<u32>);

impl TargetLines {
    pub fn new(lines: impl IntoIterator<Item = u32>) -> Self {
        Self(lines.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, line: u32) -> bool {
        self.0.contains(&line)
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = u32>) {
        self.0.extend(lines);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse the line-oriented format. Lines without a numeric second field are skipped.
pub fn parse_target_lines(text: &str) -> TargetLines {
    let mut lines = BTreeSet::new();
    for (lineno, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let parsed = raw.split(',').nth(1).and_then(|field| field.trim().parse::<u32>().ok());
        match parsed {
            Some(line) => {
                lines.insert(line);
            }
            None => debug!(record = lineno + 1, "skipping malformed target record"),
        }
    }
    TargetLines(lines)
}

/// Read and parse a target file; fails only when the file cannot be read.
pub fn read_target_lines(path: &Path) -> Result<TargetLines, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Unreadable { path: path.to_path_buf(), source })?;
    Ok(parse_target_lines(&text))
}

/// Best-effort variant: an unreadable file yields an empty list.
pub fn load_target_lines(path: &Path) -> TargetLines {
    match read_target_lines(path) {
        Ok(lines) => lines,
        Err(err) => {
            warn!("{err}; continuing without target lines");
            TargetLines::default()
        }
    }
}
