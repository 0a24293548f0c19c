//! Analysis report: a serializable snapshot of the tables plus verdicts, and
//! its human-readable rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisContext, CallSiteRecord, FunctionRecord, LineRecord, SeedVerdict, VariableRecord,
    Verdict,
};
use crate::config::TargetLines;
use crate::model::Module;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub target_lines: Vec<u32>,
    pub lines: Vec<LineRecord>,
    pub functions: Vec<FunctionRecord>,
    pub variables: Vec<VariableRecord>,
    pub call_sites: Vec<CallSiteRecord>,
    pub verdicts: Vec<SeedVerdict>,
}

impl AnalysisReport {
    pub fn from_context(
        module: &Module,
        ctx: &AnalysisContext,
        targets: &TargetLines,
        verdicts: Vec<SeedVerdict>,
    ) -> Self {
        Self {
            module: module.name.clone(),
            source_file: module.source_file.clone(),
            target_lines: targets.iter().collect(),
            lines: ctx.lines().iter().cloned().collect(),
            functions: ctx.functions().to_vec(),
            variables: ctx.variables().cloned().collect(),
            call_sites: ctx.call_sites().to_vec(),
            verdicts,
        }
    }

    pub fn seminal(&self) -> impl Iterator<Item = &SeedVerdict> {
        self.verdicts.iter().filter(|v| v.verdict == Verdict::Seminal)
    }
}

/// Render lines, functions, variables, call sites and verdicts as text.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    writeln!(out, "Module {}", report.module)?;
    writeln!(out)?;

    for line in &report.lines {
        let vars: Vec<&str> = line.variables.iter().map(String::as_str).collect();
        writeln!(out, "Variables at line {}: {} ({})", line.line, vars.join(","), line.scope)?;
    }
    writeln!(out)?;

    for function in &report.functions {
        let line = function.line.map(|l| l.to_string()).unwrap_or_else(|| "?".into());
        writeln!(
            out,
            "Function {} at line {} ({})",
            function.name,
            line,
            function.params.join(", ")
        )?;
    }
    writeln!(out)?;

    for var in &report.variables {
        writeln!(
            out,
            "Variable {} ({}) declared at line {}",
            var.name, var.scope, var.declaration_line
        )?;
        for event in &var.events {
            write!(out, "  line {} [{}]", event.line, event.kind)?;
            if let Some(rhs) = &event.rhs {
                write!(out, " {rhs}")?;
            }
            if let Some(code) = &event.code {
                write!(out, " || Code: {code}")?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out)?;

    for site in &report.call_sites {
        let args: Vec<String> = site.args.iter().map(|a| a.to_string()).collect();
        writeln!(
            out,
            "Call to {} at line {} from {} with arguments: ({})",
            site.callee,
            site.line,
            site.caller,
            args.join(", ")
        )?;
    }
    writeln!(out)?;

    if report.verdicts.is_empty() {
        writeln!(out, "No variables on target lines.")?;
    }
    for verdict in &report.verdicts {
        write!(
            out,
            "Line {}: {} ({}) is {}",
            verdict.line, verdict.variable, verdict.scope, verdict.verdict
        )?;
        if !verdict.trace.is_empty() {
            let steps: Vec<String> = verdict.trace.iter().map(|s| s.to_string()).collect();
            write!(out, " via {}", steps.join(" -> "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
