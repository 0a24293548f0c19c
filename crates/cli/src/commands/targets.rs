use std::path::Path;

use anyhow::{Context, Result};
use seminal_core::config::read_target_lines;

/// Print the line numbers parsed from a target file.
pub fn targets_command(file: &str, json: bool) -> Result<()> {
    let targets = read_target_lines(Path::new(file))
        .with_context(|| format!("Failed to read target lines from {file}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    println!("Target lines ({}):", targets.len());
    if targets.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for line in targets.iter() {
        println!("  - {line}");
    }
    Ok(())
}
