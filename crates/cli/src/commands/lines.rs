use std::path::Path;

use anyhow::{Context, Result};
use seminal_core::analysis::{AnalysisContext, LineRecord};
use seminal_core::config::SlicerConfig;
use seminal_core::model::load_module;
use seminal_core::source::NoSource;

/// Print the line index of an IR module: variables named per source line.
pub fn lines_command(ir: &str, json: bool) -> Result<()> {
    let module = load_module(Path::new(ir))?;
    let ctx = AnalysisContext::build(&module, &SlicerConfig::default(), &NoSource);
    let records: Vec<&LineRecord> = ctx.lines().iter().collect();

    if json {
        let serialized = serde_json::to_string_pretty(&records)
            .context("Failed to serialize line index to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Lines ({}):", records.len());
    if records.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for record in records {
        let vars: Vec<&str> = record.variables.iter().map(String::as_str).collect();
        println!("Variables at line {}: {} ({})", record.line, vars.join(","), record.scope);
    }
    Ok(())
}
