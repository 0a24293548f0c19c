//! Per-run analysis context owning every table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::analysis::line_index::{LineIndex, LineRecord};
use crate::analysis::resolver::{Symbol, SymbolResolver};
use crate::analysis::scope::{Scope, ScopeMap};
use crate::analysis::tables::{
    placeholder_param, AcquisitionEvent, Argument, CallSiteRecord, EventKind, FunctionRecord,
    VariableKey, VariableRecord,
};
use crate::config::SlicerConfig;
use crate::model::{Callee, Module, Op, Operand};
use crate::source::{assignment_rhs, SourceProvider};

/// Prefix of debug intrinsics, never recorded as call sites.
const DEBUG_INTRINSIC_PREFIX: &str = "llvm.dbg";

/// Tables built for one module. Created once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    lines: LineIndex,
    scopes: ScopeMap,
    functions: Vec<FunctionRecord>,
    variables: BTreeMap<VariableKey, VariableRecord>,
    call_sites: Vec<CallSiteRecord>,
    calls_by_line: BTreeMap<u32, Vec<usize>>,
    returns: BTreeMap<String, Vec<u32>>,
    input_primitives: BTreeSet<String>,
}

impl AnalysisContext {
    /// Run the indexing passes: line index and symbols, then scope
    /// assignment, then the variable and call tables.
    pub fn build(module: &Module, config: &SlicerConfig, source: &dyn SourceProvider) -> Self {
        let resolver = SymbolResolver::new(module);
        let mut lines = LineIndex::build(module, &resolver);

        let functions = function_records(module, &resolver);
        let scopes = ScopeMap::new(&functions);
        lines.assign_scopes(&scopes);

        let mut ctx = Self {
            lines,
            scopes,
            functions,
            variables: BTreeMap::new(),
            call_sites: Vec::new(),
            calls_by_line: BTreeMap::new(),
            returns: return_lines(module),
            input_primitives: config.input_primitives.iter().cloned().collect(),
        };
        ctx.collect_call_sites(module, &resolver, config);
        ctx.declare_variables(module);
        ctx.collect_events(module, &resolver, config, source);

        debug!(
            module = %module.name,
            lines = ctx.lines.len(),
            functions = ctx.functions.len(),
            variables = ctx.variables.len(),
            call_sites = ctx.call_sites.len(),
            "analysis context built"
        );
        ctx
    }

    fn collect_call_sites(
        &mut self,
        module: &Module,
        resolver: &SymbolResolver<'_>,
        config: &SlicerConfig,
    ) {
        for function in module.defined_functions() {
            let caller = Scope::function(function.name.clone());
            for inst in function.instructions() {
                let Op::Call { callee: Callee::Direct(callee), args } = &inst.op else { continue };
                let Some(line) = inst.line else { continue };
                if callee.starts_with(DEBUG_INTRINSIC_PREFIX) {
                    continue;
                }
                let args = args
                    .iter()
                    .enumerate()
                    .map(|(position, operand)| match resolver.argument(operand) {
                        Argument::Unknown
                            if position == 0
                                && config.is_format_primitive(callee)
                                && resolver.is_constant_global(operand) =>
                        {
                            Argument::Format
                        }
                        other => other,
                    })
                    .collect();
                self.calls_by_line.entry(line).or_default().push(self.call_sites.len());
                self.call_sites.push(CallSiteRecord {
                    callee: callee.clone(),
                    caller: caller.clone(),
                    line,
                    args,
                });
            }
        }
    }

    /// One record per debug-declared (name, scope); the first declaration wins.
    fn declare_variables(&mut self, module: &Module) {
        for global in &module.globals {
            if let Some(var) = &global.debug {
                self.variables
                    .entry(VariableKey::new(var.name.clone(), Scope::Global))
                    .or_insert_with(|| VariableRecord::new(var.name.clone(), Scope::Global, var.line));
            }
        }
        for function in module.defined_functions() {
            let scope = Scope::function(function.name.clone());
            for inst in function.instructions() {
                if let Op::DebugDeclare { variable, .. } = &inst.op {
                    self.variables
                        .entry(VariableKey::new(variable.name.clone(), scope.clone()))
                        .or_insert_with(|| {
                            VariableRecord::new(variable.name.clone(), scope.clone(), variable.line)
                        });
                }
            }
        }
    }

    fn collect_events(
        &mut self,
        module: &Module,
        resolver: &SymbolResolver<'_>,
        config: &SlicerConfig,
        source: &dyn SourceProvider,
    ) {
        let file = module.source_file.as_deref();
        for function in module.defined_functions() {
            for inst in function.instructions() {
                let Some(line) = inst.line else { continue };
                match &inst.op {
                    Op::Store { ptr, .. } => {
                        if let Some(symbol) = resolver.resolve(ptr) {
                            self.push_event(symbol, line, file, source);
                        }
                    }
                    // Storage passed by address receives a value from the callee.
                    Op::Call { callee: Callee::Direct(callee), args }
                        if !callee.starts_with(DEBUG_INTRINSIC_PREFIX)
                            && !config.is_format_primitive(callee) =>
                    {
                        let targets: BTreeSet<&Symbol> =
                            args.iter().filter_map(|arg| out_parameter(resolver, arg)).collect();
                        for symbol in targets {
                            self.push_event(symbol, line, file, source);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn push_event(
        &mut self,
        symbol: &Symbol,
        line: u32,
        file: Option<&str>,
        source: &dyn SourceProvider,
    ) {
        let key = VariableKey::new(symbol.name.clone(), symbol.scope.clone());
        if !self.variables.contains_key(&key) {
            trace!(variable = %key, line, "dropping event for undeclared variable");
            return;
        }
        let Some(line_record) = self.lines.get(line) else { return };
        let kind = self.classify(line_record);
        let co_variables: BTreeSet<String> =
            line_record.variables.iter().filter(|v| **v != symbol.name).cloned().collect();
        let scope = line_record.scope.clone();
        let code = file.and_then(|f| source.line_text(f, line)).map(|t| t.trim().to_string());
        let rhs = code.as_deref().map(assignment_rhs);

        if let Some(record) = self.variables.get_mut(&key) {
            record.events.push(AcquisitionEvent { line, kind, rhs, code, scope, co_variables });
        }
    }

    fn classify(&self, line: &LineRecord) -> EventKind {
        if line.variables.len() > 1 {
            if self.calls_by_line.contains_key(&line.line) {
                EventKind::Func
            } else {
                EventKind::Var
            }
        } else if self.functions.iter().any(|f| f.line == Some(line.line)) {
            EventKind::Param
        } else {
            EventKind::Var
        }
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn line(&self, line: u32) -> Option<&LineRecord> {
        self.lines.get(line)
    }

    pub fn scopes(&self) -> &ScopeMap {
        &self.scopes
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableRecord> {
        self.variables.values()
    }

    /// Exact `(name, scope)` lookup.
    pub fn variable(&self, name: &str, scope: &Scope) -> Option<&VariableRecord> {
        self.variables.get(&VariableKey::new(name, scope.clone()))
    }

    /// Lookup with C name resolution: a miss inside a function retries the
    /// global scope.
    pub fn lookup_variable(&self, name: &str, scope: &Scope) -> Option<&VariableRecord> {
        self.variable(name, scope).or_else(|| {
            if scope.is_global() {
                None
            } else {
                self.variable(name, &Scope::Global)
            }
        })
    }

    pub fn call_sites(&self) -> &[CallSiteRecord] {
        &self.call_sites
    }

    pub fn call_sites_at(&self, line: u32) -> impl Iterator<Item = &CallSiteRecord> {
        self.calls_by_line
            .get(&line)
            .into_iter()
            .flat_map(|indices| indices.iter().map(|&i| &self.call_sites[i]))
    }

    pub fn call_sites_to<'a>(&'a self, callee: &'a str) -> impl Iterator<Item = &'a CallSiteRecord> {
        self.call_sites.iter().filter(move |site| site.callee == callee)
    }

    /// Lines where the defined function `name` returns a value; empty for
    /// external prototypes and void functions.
    pub fn return_lines(&self, name: &str) -> &[u32] {
        self.returns.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_input_primitive(&self, callee: &str) -> bool {
        self.input_primitives.contains(callee)
    }

    /// Function and 0-based position when `record` is a formal parameter,
    /// i.e. declared on its function's declaration line.
    pub fn parameter_position(&self, record: &VariableRecord) -> Option<(&FunctionRecord, usize)> {
        let owner = record.scope.function_name()?;
        let declared_here = |f: &&FunctionRecord| f.line == Some(record.declaration_line);
        let function = self
            .functions
            .iter()
            .filter(declared_here)
            .find(|f| f.name == owner)
            .or_else(|| self.functions.iter().find(declared_here))?;
        let position = function.param_position(&record.name)?;
        Some((function, position))
    }
}

fn function_records(module: &Module, resolver: &SymbolResolver<'_>) -> Vec<FunctionRecord> {
    module
        .defined_functions()
        .map(|function| FunctionRecord {
            name: function.name.clone(),
            line: function.line,
            params: (0..function.params.len())
                .map(|index| {
                    resolver
                        .parameter(&function.name, index as u32 + 1)
                        .map(|symbol| symbol.name.clone())
                        .unwrap_or_else(|| placeholder_param(index))
                })
                .collect(),
        })
        .collect()
}

fn return_lines(module: &Module) -> BTreeMap<String, Vec<u32>> {
    let mut returns = BTreeMap::new();
    for function in module.defined_functions() {
        let mut lines: Vec<u32> = function
            .instructions()
            .filter(|inst| matches!(inst.op, Op::Return { value: Some(_) }))
            .filter_map(|inst| inst.line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        if !lines.is_empty() {
            returns.entry(function.name.clone()).or_insert(lines);
        }
    }
    returns
}

/// Storage location passed directly (not a loaded value) as a call argument.
fn out_parameter<'r>(resolver: &'r SymbolResolver<'_>, arg: &Operand) -> Option<&'r Symbol> {
    let id = arg.value_id()?;
    match resolver.definition(id).map(|inst| &inst.op) {
        Some(Op::Load { .. }) | Some(Op::Call { .. }) | Some(Op::Compute { .. }) => None,
        _ => resolver.resolve_id(id),
    }
}
