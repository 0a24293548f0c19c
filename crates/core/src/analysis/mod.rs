//! Line-correlated backward slicing.
//!
//! Passes, in order:
//! 1. [`resolver`] and [`line_index`]: one sweep over every instruction.
//! 2. [`scope`]: partition lines into functions by declaration line.
//! 3. [`tables`], built by [`context`]: variables with their acquisition
//!    events, function records and call sites.
//! 4. [`slicer`]: per target line, per variable on it, trace back to an
//!    input primitive.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SlicerConfig, TargetLines};
use crate::model::Module;
use crate::report::AnalysisReport;
use crate::source::SourceProvider;

pub mod context;
pub mod line_index;
pub mod resolver;
pub mod scope;
pub mod slicer;
pub mod tables;

pub use context::AnalysisContext;
pub use line_index::{LineIndex, LineRecord};
pub use resolver::{Symbol, SymbolResolver};
pub use scope::{Scope, ScopeMap};
pub use slicer::{SliceNode, SliceOutcome, SlicePath, Slicer, TraceStep, Verdict};
pub use tables::{
    AcquisitionEvent, Argument, CallSiteRecord, EventKind, FunctionRecord, VariableKey,
    VariableRecord,
};

/// Verdict for one variable named on a target line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedVerdict {
    pub line: u32,
    pub variable: String,
    pub scope: Scope,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
}

/// Slice every variable recorded on every target line, in line then name order.
pub fn slice_targets(ctx: &AnalysisContext, targets: &TargetLines) -> Vec<SeedVerdict> {
    let slicer = Slicer::new(ctx);
    let mut verdicts = Vec::new();
    for line in targets.iter() {
        let Some(record) = ctx.line(line) else {
            debug!(line, "target line has no instructions");
            continue;
        };
        for variable in &record.variables {
            let outcome = slicer.slice_seed(variable, &record.scope);
            verdicts.push(SeedVerdict {
                line,
                variable: variable.clone(),
                scope: record.scope.clone(),
                verdict: outcome.verdict,
                trace: outcome.trace,
            });
        }
    }
    verdicts
}

/// Full run over one module. With no target lines, every line carrying a
/// conditional branch is a target.
pub fn analyze_module(
    module: &Module,
    config: &SlicerConfig,
    targets: &TargetLines,
    source: &dyn SourceProvider,
) -> AnalysisReport {
    let ctx = AnalysisContext::build(module, config, source);
    let targets = if targets.is_empty() {
        TargetLines::new(module.conditional_branch_lines())
    } else {
        targets.clone()
    };
    let verdicts = slice_targets(&ctx, &targets);
    info!(
        module = %module.name,
        targets = targets.len(),
        seeds = verdicts.len(),
        seminal = verdicts.iter().filter(|v| v.verdict == Verdict::Seminal).count(),
        "analysis finished"
    );
    AnalysisReport::from_context(module, &ctx, &targets, verdicts)
}
