use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use seminal_core::analysis::analyze_module;
use seminal_core::model::load_module;
use seminal_core::report::{render_text, AnalysisReport};
use seminal_core::source::FileSource;

use crate::commands::util::{load_config, resolve_targets};
use crate::{canonicalize_or_current, sha256_file};

/// JSON envelope for `analyze --json`.
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub module: String,
    pub ir_path: String,
    pub ir_sha256: String,
    pub generated_at: String,
    pub report: AnalysisReport,
}

/// Load the IR, resolve targets and source root, and run the slicer.
///
/// Relative source paths resolve against `--source-root`, then the config's
/// `source_root`, then the directory holding the IR file.
pub fn run_analysis(
    ir: &str,
    targets_file: Option<&str>,
    lines: &[u32],
    config_path: Option<&str>,
    source_root: Option<&str>,
) -> Result<AnalyzeOutput> {
    let ir_path = canonicalize_or_current(ir)?;
    let module = load_module(&ir_path)?;
    let config = load_config(config_path)?;
    let targets = resolve_targets(&config, targets_file, lines);

    let root = match source_root.or(config.source_root.as_deref()) {
        Some(root) => Some(canonicalize_or_current(root)?),
        None => ir_path.parent().map(Path::to_path_buf),
    };
    debug!(ir = %ir_path.display(), targets = targets.len(), "running analysis");

    let source = FileSource::new(root);
    let report = analyze_module(&module, &config, &targets, &source);
    let ir_sha256 = sha256_file(&ir_path)?;

    Ok(AnalyzeOutput {
        module: module.name,
        ir_path: ir_path.display().to_string(),
        ir_sha256,
        generated_at: Utc::now().to_rfc3339(),
        report,
    })
}

/// Full analysis: tables plus a verdict for every variable on the target lines.
pub fn analyze_command(
    ir: &str,
    targets_file: Option<&str>,
    lines: &[u32],
    config_path: Option<&str>,
    source_root: Option<&str>,
    json: bool,
) -> Result<()> {
    let output = run_analysis(ir, targets_file, lines, config_path, source_root)?;

    if json {
        let serialized = serde_json::to_string_pretty(&output)
            .context("Failed to serialize analysis report to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    print!("{}", render_text(&output.report));
    Ok(())
}
