//! Backward slicer: decides whether a variable's value can be traced back to
//! an input primitive.
//!
//! The traversal is a depth-first walk over two kinds of edges:
//! - parameter -> actual argument at each call site in another scope;
//! - variable -> co-variables named on the line of each acquisition event;
//! - call on an event line -> the lines where a defined callee returns.
//!
//! A node is terminal when its variable has no record (not seminal), when an
//! event has no co-variables (literal, not seminal), or when an input
//! primitive is called on an event line (seminal). Child results fold with
//! any-seminal-wins; a walk that revisits an ancestor on the current path is
//! inconclusive.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::context::AnalysisContext;
use crate::analysis::scope::Scope;
use crate::analysis::tables::{Argument, CallSiteRecord, VariableKey, VariableRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Seminal,
    NotSeminal,
    Inconclusive,
}

impl Verdict {
    /// Fold two child results: seminal beats not-seminal beats inconclusive.
    pub fn combine(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Seminal, _) | (_, Verdict::Seminal) => Verdict::Seminal,
            (Verdict::NotSeminal, _) | (_, Verdict::NotSeminal) => Verdict::NotSeminal,
            _ => Verdict::Inconclusive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Seminal => "seminal",
            Verdict::NotSeminal => "not seminal",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hop on the path from a seed to an input primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    /// `variable` acquired a value on `line`.
    Assignment { variable: String, scope: Scope, line: u32 },
    /// `parameter` of `function` was bound at the call on `line` in `caller`.
    Binding { parameter: String, function: String, caller: Scope, line: u32 },
    /// `function` returned a value on `line`.
    Return { function: String, line: u32 },
    /// `callee` is an input primitive called on `line`.
    Input { callee: String, line: u32 },
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStep::Assignment { variable, line, .. } => write!(f, "{variable}@{line}"),
            TraceStep::Binding { parameter, caller, line, .. } => {
                write!(f, "{parameter}<-{caller}@{line}")
            }
            TraceStep::Return { function, line } => write!(f, "{function}:return@{line}"),
            TraceStep::Input { callee, line } => write!(f, "{callee}()@{line}"),
        }
    }
}

/// Verdict plus, for seminal results, the path that reached the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceOutcome {
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
}

impl SliceOutcome {
    pub fn seminal(trace: Vec<TraceStep>) -> Self {
        Self { verdict: Verdict::Seminal, trace }
    }

    pub fn not_seminal() -> Self {
        Self { verdict: Verdict::NotSeminal, trace: Vec::new() }
    }

    pub fn inconclusive() -> Self {
        Self { verdict: Verdict::Inconclusive, trace: Vec::new() }
    }

    pub fn is_seminal(&self) -> bool {
        self.verdict == Verdict::Seminal
    }

    fn prepend(mut self, step: TraceStep) -> Self {
        self.trace.insert(0, step);
        self
    }

    fn fold(self, other: SliceOutcome) -> Self {
        if self.is_seminal() {
            return self;
        }
        if other.is_seminal() {
            return other;
        }
        Self { verdict: self.verdict.combine(other.verdict), trace: Vec::new() }
    }
}

/// A node of the slicing walk: a variable, or the returned values of a
/// defined function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SliceNode {
    Variable(VariableKey),
    Return(String),
}

/// Nodes on the current recursion path, innermost last.
#[derive(Debug, Clone, Default)]
pub struct SlicePath {
    stack: Vec<SliceNode>,
    revisits: usize,
}

impl SlicePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node: &SliceNode) -> bool {
        self.stack.contains(node)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of times the walk was cut short by meeting an ancestor.
    pub fn revisits(&self) -> usize {
        self.revisits
    }

    fn enter(&mut self, node: SliceNode) {
        self.stack.push(node);
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}

/// Read-only traversal over an [`AnalysisContext`].
///
/// Outcomes whose subtree never met an ancestor do not depend on the path
/// they were reached from and are memoized for the slicer's lifetime.
#[derive(Debug)]
pub struct Slicer<'a> {
    ctx: &'a AnalysisContext,
    cache: RefCell<HashMap<SliceNode, SliceOutcome>>,
}

impl<'a> Slicer<'a> {
    pub fn new(ctx: &'a AnalysisContext) -> Self {
        Self { ctx, cache: RefCell::new(HashMap::new()) }
    }

    /// Slice a seed with a fresh path.
    pub fn slice_seed(&self, name: &str, scope: &Scope) -> SliceOutcome {
        self.slice(name, scope, &mut SlicePath::new())
    }

    /// Slice `(name, scope)` given the ancestors already on `path`. The path
    /// stack is restored before returning.
    pub fn slice(&self, name: &str, scope: &Scope, path: &mut SlicePath) -> SliceOutcome {
        let Some(record) = self.ctx.lookup_variable(name, scope) else {
            debug!(variable = name, scope = %scope, "no record, dead end");
            return SliceOutcome::not_seminal();
        };
        let key = record.key();
        debug!(variable = %key, depth = path.depth(), "slicing");

        self.memoized(SliceNode::Variable(key), path, |slicer, path| {
            match slicer.through_callers(record, path) {
                Some(delegated) => delegated,
                None => slicer.through_events(record, path),
            }
        })
    }

    /// Cycle check, cache lookup, then `walk` with `node` pushed on the path.
    fn memoized(
        &self,
        node: SliceNode,
        path: &mut SlicePath,
        walk: impl FnOnce(&Self, &mut SlicePath) -> SliceOutcome,
    ) -> SliceOutcome {
        if path.contains(&node) {
            debug!(node = ?node, depth = path.depth(), "path revisits ancestor");
            path.revisits += 1;
            return SliceOutcome::inconclusive();
        }
        if let Some(hit) = self.cache.borrow().get(&node) {
            return hit.clone();
        }

        let revisits = path.revisits;
        path.enter(node.clone());
        let outcome = walk(self, path);
        path.leave();

        if path.revisits == revisits {
            self.cache.borrow_mut().insert(node, outcome.clone());
        }
        outcome
    }

    /// Parameter resolution. Returns `None` when the variable is not a
    /// parameter or no call site from another scope binds it, so the caller
    /// falls back to the variable's own events.
    fn through_callers(&self, record: &VariableRecord, path: &mut SlicePath) -> Option<SliceOutcome> {
        let (function, position) = self.ctx.parameter_position(record)?;
        let mut combined: Option<SliceOutcome> = None;

        for site in self.ctx.call_sites_to(&function.name) {
            // Recursive self-calls would re-enter immediately.
            if site.caller == record.scope {
                continue;
            }
            let Some(arg) = site.args.get(position) else { continue };
            let binding = TraceStep::Binding {
                parameter: record.name.clone(),
                function: function.name.clone(),
                caller: site.caller.clone(),
                line: site.line,
            };
            let child = self.slice_argument(arg, site, path).prepend(binding);
            if child.is_seminal() {
                return Some(child);
            }
            combined = Some(match combined {
                Some(acc) => acc.fold(child),
                None => child,
            });
        }

        // The parameter's own store names its sibling parameters, so bound
        // parameters never fall through to their events.
        combined.map(|mut outcome| {
            outcome.trace.clear();
            outcome
        })
    }

    fn slice_argument(
        &self,
        arg: &Argument,
        site: &CallSiteRecord,
        path: &mut SlicePath,
    ) -> SliceOutcome {
        match arg {
            Argument::Variable(name) => self.slice(name, &site.caller, path),
            Argument::Call(callee) if self.ctx.is_input_primitive(callee) => {
                SliceOutcome::seminal(vec![TraceStep::Input {
                    callee: callee.clone(),
                    line: site.line,
                }])
            }
            Argument::Call(callee) if !self.ctx.return_lines(callee).is_empty() => {
                self.through_returns(callee, path)
            }
            Argument::Str(_) | Argument::Int(_) | Argument::Format => SliceOutcome::not_seminal(),
            Argument::Call(_) | Argument::Unknown => SliceOutcome::inconclusive(),
        }
    }

    /// Event-based resolution over every acquisition event, in order.
    fn through_events(&self, record: &VariableRecord, path: &mut SlicePath) -> SliceOutcome {
        if record.events.is_empty() {
            return SliceOutcome::not_seminal();
        }

        let mut combined = SliceOutcome::inconclusive();
        for event in &record.events {
            let here = TraceStep::Assignment {
                variable: record.name.clone(),
                scope: record.scope.clone(),
                line: event.line,
            };
            let child = self.through_line(event.line, &event.scope, &event.co_variables, here, path);
            if child.is_seminal() {
                return child;
            }
            combined = combined.fold(child);
        }
        combined
    }

    /// Values returned by a defined function, one return line at a time.
    fn through_returns(&self, function: &str, path: &mut SlicePath) -> SliceOutcome {
        self.memoized(SliceNode::Return(function.to_string()), path, |slicer, path| {
            let scope = Scope::function(function);
            let none = BTreeSet::new();
            let mut combined = SliceOutcome::inconclusive();
            for &line in slicer.ctx.return_lines(function) {
                let here = TraceStep::Return { function: function.to_string(), line };
                let variables = slicer.ctx.line(line).map_or(&none, |record| &record.variables);
                let child = slicer.through_line(line, &scope, variables, here, path);
                if child.is_seminal() {
                    return child;
                }
                combined = combined.fold(child);
            }
            combined
        })
    }

    /// One source line: an input primitive called on it, then the returns of
    /// defined callees, then every named variable in `scope`. A line with
    /// none of these is a literal dead end.
    fn through_line(
        &self,
        line: u32,
        scope: &Scope,
        variables: &BTreeSet<String>,
        here: TraceStep,
        path: &mut SlicePath,
    ) -> SliceOutcome {
        let ctx = self.ctx;
        if let Some(input) = ctx.call_sites_at(line).find(|site| ctx.is_input_primitive(&site.callee)) {
            return SliceOutcome::seminal(vec![
                here,
                TraceStep::Input { callee: input.callee.clone(), line: input.line },
            ]);
        }

        let mut combined: Option<SliceOutcome> = None;
        let callees = ctx.call_sites_at(line).filter(|site| !ctx.return_lines(&site.callee).is_empty());
        for site in callees {
            let child = self.through_returns(&site.callee, path);
            if child.is_seminal() {
                return child.prepend(here);
            }
            combined = Some(match combined {
                Some(acc) => acc.fold(child),
                None => child,
            });
        }

        for variable in variables {
            let child = self.slice(variable, scope, path);
            if child.is_seminal() {
                return child.prepend(here);
            }
            combined = Some(match combined {
                Some(acc) => acc.fold(child),
                None => child,
            });
        }
        combined.unwrap_or_else(SliceOutcome::not_seminal)
    }
}
