//! Input IR handed over by the host compiler.
//!
//! A [`Module`] is one compilation unit: debug-named globals plus a list of
//! function units, each an ordered list of blocks of instructions. The shape
//! mirrors what a compiler frontend emits at `-O0` with debug info: locals
//! live in `alloca` slots, a `debug_declare` ties a slot to its source-level
//! name, and every value flows through explicit `load`/`store` pairs.
//!
//! The model is serde-friendly so modules can be exported by a compiler
//! plugin as JSON or YAML and analyzed out of process.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod builder;

pub use builder::{FunctionBuilder, ModuleBuilder};

/// Identifier of an SSA value (instruction result, argument, or global).
///
/// Ids are unique across the whole module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Source-level identity attached to a storage location by debug metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugVariable {
    pub name: String,
    /// Line of the declaration in the source file.
    pub line: u32,
    /// 1-based formal parameter ordinal when the variable is a parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<u32>,
}

impl DebugVariable {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self { name: name.into(), line, arg: None }
    }

    pub fn parameter(name: impl Into<String>, line: u32, arg: u32) -> Self {
        Self { name: name.into(), line, arg: Some(arg) }
    }
}

/// Instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Value(ValueId),
    Int(i64),
    Str(String),
    Undef,
}

impl Operand {
    pub fn int(value: i64) -> Self {
        Operand::Int(value)
    }

    pub fn str(value: impl Into<String>) -> Self {
        Operand::Str(value.into())
    }

    pub fn value_id(&self) -> Option<ValueId> {
        match self {
            Operand::Value(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ValueId> for Operand {
    fn from(id: ValueId) -> Self {
        Operand::Value(id)
    }
}

/// Call target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    Direct(String),
    /// Function pointer or other computed target; never resolved.
    Indirect(Operand),
}

impl Callee {
    pub fn direct_name(&self) -> Option<&str> {
        match self {
            Callee::Direct(name) => Some(name),
            Callee::Indirect(_) => None,
        }
    }
}

/// Instruction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Op {
    Alloca,
    DebugDeclare {
        address: ValueId,
        variable: DebugVariable,
    },
    DebugValue {
        value: Operand,
        variable: DebugVariable,
    },
    Load {
        ptr: Operand,
    },
    Store {
        value: Operand,
        ptr: Operand,
    },
    ElementPtr {
        base: Operand,
        #[serde(default)]
        indices: Vec<Operand>,
    },
    Call {
        callee: Callee,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Branch {
        #[serde(default)]
        condition: Option<Operand>,
    },
    Return {
        #[serde(default)]
        value: Option<Operand>,
    },
    /// Arithmetic, comparison, cast, phi and anything else without memory effects.
    Compute {
        opcode: String,
        #[serde(default)]
        operands: Vec<Operand>,
    },
}

/// One IR instruction, optionally tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Result value, if the instruction produces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ValueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub op: Op,
}

impl Instruction {
    /// All value operands, in source order. Debug-declare addresses are
    /// metadata and are not included.
    pub fn operands(&self) -> Vec<&Operand> {
        match &self.op {
            Op::Alloca | Op::DebugDeclare { .. } => Vec::new(),
            Op::DebugValue { value, .. } => vec![value],
            Op::Load { ptr } => vec![ptr],
            Op::Store { value, ptr } => vec![value, ptr],
            Op::ElementPtr { base, indices } => {
                std::iter::once(base).chain(indices.iter()).collect()
            }
            Op::Call { callee, args } => {
                let mut out: Vec<&Operand> = args.iter().collect();
                if let Callee::Indirect(target) = callee {
                    out.push(target);
                }
                out
            }
            Op::Branch { condition } => condition.iter().collect(),
            Op::Return { value } => value.iter().collect(),
            Op::Compute { operands, .. } => operands.iter().collect(),
        }
    }

    fn referenced_ids(&self) -> Vec<ValueId> {
        let mut ids: Vec<ValueId> = self.operands().iter().filter_map(|o| o.value_id()).collect();
        if let Op::DebugDeclare { address, .. } = &self.op {
            ids.push(*address);
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub label: String,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

/// A function definition or an external prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUnit {
    pub name: String,
    /// Declaration line from the function's debug subprogram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// External prototype with no body (e.g. `getchar`).
    #[serde(default)]
    pub declaration: bool,
    /// Formal argument values, in declaration order.
    #[serde(default)]
    pub params: Vec<ValueId>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl FunctionUnit {
    /// True for prototypes that have no body to scan.
    pub fn is_declaration(&self) -> bool {
        self.declaration || self.blocks.is_empty()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

/// Constant initializer of a global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    Str(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: ValueId,
    /// Linkage symbol, e.g. `.str` for string literals.
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Source file the debug line numbers refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub globals: Vec<GlobalVariable>,
    #[serde(default)]
    pub functions: Vec<FunctionUnit>,
}

/// Structural problems in a module handed over by the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Value {id} is defined more than once")]
    DuplicateValue { id: ValueId },
    #[error("Value {id} referenced in function '{function}' is never defined")]
    DanglingValue { id: ValueId, function: String },
}

impl Module {
    /// Functions with a body, in module order.
    pub fn defined_functions(&self) -> impl Iterator<Item = &FunctionUnit> {
        self.functions.iter().filter(|f| !f.is_declaration())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionUnit> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Lines carrying a conditional branch in any defined function.
    pub fn conditional_branch_lines(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self
            .defined_functions()
            .flat_map(|f| f.instructions())
            .filter(|inst| matches!(inst.op, Op::Branch { condition: Some(_) }))
            .filter_map(|inst| inst.line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    /// Check that value ids are unique and every reference points at a definition.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut defined = HashSet::new();
        let mut define = |id: ValueId| {
            if defined.insert(id) {
                Ok(())
            } else {
                Err(ModelError::DuplicateValue { id })
            }
        };

        for global in &self.globals {
            define(global.id)?;
        }
        for function in &self.functions {
            for param in &function.params {
                define(*param)?;
            }
            for inst in function.instructions() {
                if let Some(id) = inst.id {
                    define(id)?;
                }
            }
        }

        for function in &self.functions {
            for inst in function.instructions() {
                if let Some(id) = inst.referenced_ids().into_iter().find(|id| !defined.contains(id))
                {
                    return Err(ModelError::DanglingValue { id, function: function.name.clone() });
                }
            }
        }
        Ok(())
    }
}

/// Load a module from JSON (`.json`) or YAML (anything else) and validate it.
pub fn load_module(path: &Path) -> Result<Module> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read IR module at {}", path.display()))?;
    let module: Module = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body).context("Failed to parse IR module JSON")?
    } else {
        serde_yaml::from_str(&body).context("Failed to parse IR module YAML")?
    };
    module.validate().with_context(|| format!("Invalid IR module at {}", path.display()))?;
    Ok(module)
}
