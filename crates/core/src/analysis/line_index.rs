//! Line index: source line -> set of variable names touched on that line.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::resolver::SymbolResolver;
use crate::analysis::scope::{Scope, ScopeMap};
use crate::model::{Instruction, Module, Op};

/// Variables read, written or declared on one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub line: u32,
    /// Enclosing scope; [`Scope::Global`] until scopes are assigned.
    pub scope: Scope,
    pub variables: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    records: BTreeMap<u32, LineRecord>,
}

impl LineIndex {
    /// Single pass over every instruction of every defined function.
    ///
    /// Any line that carries an instruction gets a record, even when none of
    /// its operands resolve to a name.
    pub fn build(module: &Module, resolver: &SymbolResolver<'_>) -> Self {
        let mut index = Self::default();
        for function in module.defined_functions() {
            for inst in function.instructions() {
                if let Some(line) = inst.line {
                    index.record(line, inst, resolver);
                }
            }
        }
        debug!(lines = index.records.len(), "line index built");
        index
    }

    fn record(&mut self, line: u32, inst: &Instruction, resolver: &SymbolResolver<'_>) {
        let entry = match self.records.entry(line) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                e.insert(LineRecord { line, scope: Scope::Global, variables: BTreeSet::new() })
            }
        };
        let vars = &mut entry.variables;

        match &inst.op {
            Op::DebugDeclare { variable, .. } | Op::DebugValue { variable, .. } => {
                vars.insert(variable.name.clone());
            }
            Op::Load { ptr } | Op::Store { ptr, .. } => {
                if let Some(symbol) = resolver.resolve(ptr) {
                    vars.insert(symbol.name.clone());
                }
            }
            _ => {}
        }

        // Operands that are themselves declared slots: `&x`, decayed arrays.
        for operand in inst.operands() {
            let Some(id) = operand.value_id() else { continue };
            if let Some(symbol) = resolver.declared_local(id) {
                vars.insert(symbol.name.clone());
            } else if let Some(symbol) = resolver.resolve_id(id).filter(|s| s.scope.is_global()) {
                vars.insert(symbol.name.clone());
            }
        }
    }

    /// Resolve every record's scope against the function partition.
    pub fn assign_scopes(&mut self, scopes: &ScopeMap) {
        for record in self.records.values_mut() {
            record.scope = scopes.scope_of(record.line);
        }
    }

    pub fn get(&self, line: u32) -> Option<&LineRecord> {
        self.records.get(&line)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
