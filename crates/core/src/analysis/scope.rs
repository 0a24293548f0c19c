//! Scope assignment: partitions source lines into enclosing functions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::tables::FunctionRecord;

/// Lexical scope used to disambiguate identically named variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    Function(String),
}

impl Scope {
    pub fn function(name: impl Into<String>) -> Self {
        Scope::Function(name.into())
    }

    pub fn function_name(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Function(name) => Some(name),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Function(name) => f.write_str(name),
        }
    }
}

/// Function start lines sorted ascending; a line belongs to the function with
/// the greatest start line not after it, and to the global scope before the
/// first function.
#[derive(Debug, Clone, Default)]
pub struct ScopeMap {
    starts: Vec<(u32, String)>,
}

impl ScopeMap {
    /// Functions without a debug line take no part in the partition.
    pub fn new(functions: &[FunctionRecord]) -> Self {
        let mut starts: Vec<(u32, String)> =
            functions.iter().filter_map(|f| f.line.map(|line| (line, f.name.clone()))).collect();
        starts.sort();
        Self { starts }
    }

    pub fn scope_of(&self, line: u32) -> Scope {
        let idx = self.starts.partition_point(|(start, _)| *start <= line);
        match idx {
            0 => Scope::Global,
            n => Scope::Function(self.starts[n - 1].1.clone()),
        }
    }

    /// `(function, start, end)` intervals; `end` is the next function's start.
    pub fn intervals(&self) -> Vec<(&str, u32, Option<u32>)> {
        self.starts
            .iter()
            .enumerate()
            .map(|(i, (start, name))| {
                (name.as_str(), *start, self.starts.get(i + 1).map(|(next, _)| *next))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}
