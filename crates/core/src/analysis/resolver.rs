//! Scope & symbol resolution: maps storage locations to source-level names.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::analysis::scope::Scope;
use crate::analysis::tables::Argument;
use crate::model::{Callee, Initializer, Instruction, Module, Op, Operand, ValueId};

/// Upper bound on nested element-address hops followed back to a base.
const MAX_ELEMENT_DEPTH: usize = 32;

/// Debug identity of a storage location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol {
    pub name: String,
    /// Declaration line.
    pub line: u32,
    pub scope: Scope,
    /// 1-based parameter ordinal, for formal parameters.
    pub arg: Option<u32>,
}

/// Read-only view over a module's debug associations.
///
/// Locals come from `debug_declare` records inside defined functions; globals
/// from the module's debug-named globals and always resolve to the global
/// scope. Element addresses resolve to their base variable, so array elements
/// collapse onto the containing variable.
#[derive(Debug)]
pub struct SymbolResolver<'m> {
    locals: HashMap<ValueId, Symbol>,
    globals: HashMap<ValueId, Symbol>,
    strings: HashMap<ValueId, &'m str>,
    constant_globals: HashSet<ValueId>,
    definitions: HashMap<ValueId, &'m Instruction>,
    parameters: HashMap<&'m str, HashMap<u32, Symbol>>,
}

impl<'m> SymbolResolver<'m> {
    pub fn new(module: &'m Module) -> Self {
        let mut resolver = Self {
            locals: HashMap::new(),
            globals: HashMap::new(),
            strings: HashMap::new(),
            constant_globals: HashSet::new(),
            definitions: HashMap::new(),
            parameters: HashMap::new(),
        };

        for global in &module.globals {
            if let Some(var) = &global.debug {
                resolver.globals.insert(
                    global.id,
                    Symbol { name: var.name.clone(), line: var.line, scope: Scope::Global, arg: None },
                );
            } else {
                resolver.constant_globals.insert(global.id);
                if let Some(Initializer::Str(text)) = &global.initializer {
                    resolver.strings.insert(global.id, text.as_str());
                }
            }
        }

        for function in module.defined_functions() {
            let scope = Scope::function(function.name.clone());
            for inst in function.instructions() {
                if let Some(id) = inst.id {
                    resolver.definitions.insert(id, inst);
                }
                if let Op::DebugDeclare { address, variable } = &inst.op {
                    let symbol = Symbol {
                        name: variable.name.clone(),
                        line: variable.line,
                        scope: scope.clone(),
                        arg: variable.arg,
                    };
                    if let Some(ordinal) = variable.arg {
                        resolver
                            .parameters
                            .entry(function.name.as_str())
                            .or_default()
                            .insert(ordinal, symbol.clone());
                    }
                    resolver.locals.insert(*address, symbol);
                }
            }
        }

        debug!(
            locals = resolver.locals.len(),
            globals = resolver.globals.len(),
            "symbol resolver ready"
        );
        resolver
    }

    /// Name of the storage location `operand` designates, if any.
    pub fn resolve(&self, operand: &Operand) -> Option<&Symbol> {
        operand.value_id().and_then(|id| self.resolve_id(id))
    }

    pub fn resolve_id(&self, id: ValueId) -> Option<&Symbol> {
        let mut current = id;
        for _ in 0..MAX_ELEMENT_DEPTH {
            if let Some(symbol) = self.locals.get(&current).or_else(|| self.globals.get(&current)) {
                return Some(symbol);
            }
            match self.definitions.get(&current).map(|inst| &inst.op) {
                Some(Op::ElementPtr { base: Operand::Value(base), .. }) => current = *base,
                _ => return None,
            }
        }
        None
    }

    /// Debug-declared local slot (not a global, not an element address).
    pub fn declared_local(&self, id: ValueId) -> Option<&Symbol> {
        self.locals.get(&id)
    }

    pub fn definition(&self, id: ValueId) -> Option<&'m Instruction> {
        self.definitions.get(&id).copied()
    }

    /// Debug identity of `function`'s parameter at 1-based `ordinal`.
    pub fn parameter(&self, function: &str, ordinal: u32) -> Option<&Symbol> {
        self.parameters.get(function).and_then(|params| params.get(&ordinal))
    }

    /// True when the operand designates a global without debug identity,
    /// i.e. compiler-emitted constant data.
    pub fn is_constant_global(&self, operand: &Operand) -> bool {
        let Some(id) = operand.value_id() else { return false };
        if self.constant_globals.contains(&id) {
            return true;
        }
        matches!(
            self.definition(id).map(|inst| &inst.op),
            Some(Op::ElementPtr { base: Operand::Value(base), .. }) if self.constant_globals.contains(base)
        )
    }

    fn string_literal(&self, id: ValueId) -> Option<&'m str> {
        if let Some(text) = self.strings.get(&id) {
            return Some(*text);
        }
        match self.definition(id).map(|inst| &inst.op) {
            Some(Op::ElementPtr { base: Operand::Value(base), .. }) => self.strings.get(base).copied(),
            _ => None,
        }
    }

    /// Describe an actual call argument: literal, variable, call result, or unknown.
    pub fn argument(&self, operand: &Operand) -> Argument {
        let id = match operand {
            Operand::Str(text) => return Argument::Str(text.clone()),
            Operand::Int(value) => return Argument::Int(*value),
            Operand::Undef => return Argument::Unknown,
            Operand::Value(id) => *id,
        };

        if let Some(text) = self.string_literal(id) {
            return Argument::Str(text.to_string());
        }
        match self.definition(id).map(|inst| &inst.op) {
            Some(Op::Load { ptr }) => {
                if let Some(symbol) = self.resolve(ptr) {
                    return Argument::Variable(symbol.name.clone());
                }
            }
            Some(Op::Call { callee: Callee::Direct(name), .. }) => {
                return Argument::Call(name.clone());
            }
            _ => {}
        }
        // Address of a variable passed directly (out-parameters, decayed arrays).
        match self.resolve_id(id) {
            Some(symbol) => Argument::Variable(symbol.name.clone()),
            None => Argument::Unknown,
        }
    }
}
