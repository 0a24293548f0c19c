//! Variable, function and call-site tables.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::scope::Scope;

/// Unique key of a variable record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableKey {
    pub name: String,
    pub scope: Scope,
}

impl VariableKey {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self { name: name.into(), scope }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.scope)
    }
}

/// Line-population classification of an acquisition event.
///
/// This is a proxy, not an inspection of the assigning operation:
///
/// | variables on line | condition                          | kind    |
/// |-------------------|------------------------------------|---------|
/// | more than one     | a call site sits on the line       | `Func`  |
/// | more than one     | otherwise                          | `Var`   |
/// | one               | a function is declared on the line | `Param` |
/// | one               | otherwise                          | `Var`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Var,
    Func,
    Param,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Var => "var",
            EventKind::Func => "func",
            EventKind::Param => "param",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One occurrence where a variable receives a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionEvent {
    pub line: u32,
    pub kind: EventKind,
    /// Right-hand side of the assignment as written in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs: Option<String>,
    /// Whole source line, trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Scope of the line, applied to every co-variable.
    pub scope: Scope,
    /// Other variables named on the line; never contains the owner's name.
    pub co_variables: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    pub scope: Scope,
    pub declaration_line: u32,
    pub events: Vec<AcquisitionEvent>,
}

impl VariableRecord {
    pub fn new(name: impl Into<String>, scope: Scope, declaration_line: u32) -> Self {
        Self { name: name.into(), scope, declaration_line, events: Vec::new() }
    }

    pub fn key(&self) -> VariableKey {
        VariableKey::new(self.name.clone(), self.scope.clone())
    }
}

/// Placeholder for a parameter lacking debug identity, by 0-based position.
pub fn placeholder_param(index: usize) -> String {
    format!("<arg{index}>")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    /// Declaration line; `None` when the function has no debug subprogram.
    pub line: Option<u32>,
    /// Formal parameters in declaration order.
    pub params: Vec<String>,
}

impl FunctionRecord {
    /// 0-based position of parameter `name`.
    pub fn param_position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }
}

/// Resolved actual argument of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    Variable(String),
    Str(String),
    Int(i64),
    /// Result of a direct call, e.g. `f(getchar())`.
    Call(String),
    /// Format string of a known formatting primitive.
    Format,
    Unknown,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Variable(name) => f.write_str(name),
            Argument::Str(text) => write!(f, "{text:?}"),
            Argument::Int(value) => write!(f, "{value}"),
            Argument::Call(callee) => write!(f, "{callee}()"),
            Argument::Format => f.write_str("\"%s\\n\""),
            Argument::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteRecord {
    pub callee: String,
    pub caller: Scope,
    pub line: u32,
    pub args: Vec<Argument>,
}
