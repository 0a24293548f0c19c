//! Programmatic construction of modules, shaped like unoptimized frontend output.

use crate::model::{
    Block, Callee, DebugVariable, FunctionUnit, GlobalVariable, Initializer, Instruction, Module,
    Op, Operand, ValueId,
};

/// Builds a [`Module`], handing out fresh value ids.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Module,
    next_id: u32,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: Module {
                name: name.into(),
                source_file: None,
                globals: Vec::new(),
                functions: Vec::new(),
            },
            next_id: 0,
        }
    }

    pub fn source_file(mut self, path: impl Into<String>) -> Self {
        self.module.source_file = Some(path.into());
        self
    }

    pub fn fresh_id(&mut self) -> ValueId {
        let id = ValueId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Debug-named global declared at `line`.
    pub fn global(&mut self, name: &str, line: u32) -> ValueId {
        let id = self.fresh_id();
        self.module.globals.push(GlobalVariable {
            id,
            symbol: name.to_string(),
            debug: Some(DebugVariable::new(name, line)),
            initializer: None,
        });
        id
    }

    /// Anonymous constant string, as emitted for `"..."` literals.
    pub fn string_literal(&mut self, text: &str) -> ValueId {
        let id = self.fresh_id();
        let symbol = format!(".str.{}", self.module.globals.len());
        self.module.globals.push(GlobalVariable {
            id,
            symbol,
            debug: None,
            initializer: Some(Initializer::Str(text.to_string())),
        });
        id
    }

    /// External prototype such as `getchar`.
    pub fn declare(&mut self, name: &str) -> &mut Self {
        self.module.functions.push(FunctionUnit {
            name: name.to_string(),
            line: None,
            declaration: true,
            params: Vec::new(),
            blocks: Vec::new(),
        });
        self
    }

    /// Start a function definition whose debug subprogram sits at `line`.
    pub fn function(&mut self, name: &str, line: u32) -> FunctionBuilder<'_> {
        FunctionBuilder {
            unit: FunctionUnit {
                name: name.to_string(),
                line: Some(line),
                declaration: false,
                params: Vec::new(),
                blocks: vec![Block { label: "entry".into(), instructions: Vec::new() }],
            },
            line: Some(line),
            module: self,
        }
    }

    pub fn build(self) -> Module {
        self.module
    }
}

/// Appends instructions to one function; [`FunctionBuilder::finish`] commits it.
#[derive(Debug)]
pub struct FunctionBuilder<'a> {
    module: &'a mut ModuleBuilder,
    unit: FunctionUnit,
    line: Option<u32>,
}

impl<'a> FunctionBuilder<'a> {
    /// Subsequent instructions carry `line`.
    pub fn at(&mut self, line: u32) -> &mut Self {
        self.line = Some(line);
        self
    }

    /// Subsequent instructions carry no line.
    pub fn no_line(&mut self) -> &mut Self {
        self.line = None;
        self
    }

    pub fn block(&mut self, label: &str) -> &mut Self {
        self.unit.blocks.push(Block { label: label.to_string(), instructions: Vec::new() });
        self
    }

    fn push(&mut self, op: Op, has_result: bool) -> ValueId {
        let id = self.module.fresh_id();
        let inst = Instruction { id: has_result.then_some(id), line: self.line, op };
        if let Some(block) = self.unit.blocks.last_mut() {
            block.instructions.push(inst);
        }
        id
    }

    /// Named parameter: argument value spilled into a debug-declared slot on
    /// the function's own line. Returns the slot.
    pub fn param(&mut self, name: &str) -> ValueId {
        let arg = self.module.fresh_id();
        self.unit.params.push(arg);
        let ordinal = self.unit.params.len() as u32;
        let saved = self.line;
        self.line = self.unit.line;
        let slot = self.push(Op::Alloca, true);
        let decl_line = self.unit.line.unwrap_or_default();
        self.push(
            Op::DebugDeclare {
                address: slot,
                variable: DebugVariable::parameter(name, decl_line, ordinal),
            },
            false,
        );
        self.push(Op::Store { value: Operand::Value(arg), ptr: Operand::Value(slot) }, false);
        self.line = saved;
        slot
    }

    /// Parameter with no debug identity; returns the raw argument value.
    pub fn anonymous_param(&mut self) -> ValueId {
        let arg = self.module.fresh_id();
        self.unit.params.push(arg);
        arg
    }

    pub fn string_literal(&mut self, text: &str) -> ValueId {
        self.module.string_literal(text)
    }

    /// Debug-declared local slot at the current line.
    pub fn local(&mut self, name: &str) -> ValueId {
        let slot = self.push(Op::Alloca, true);
        let line = self.line.unwrap_or_default();
        self.push(
            Op::DebugDeclare { address: slot, variable: DebugVariable::new(name, line) },
            false,
        );
        slot
    }

    /// Slot with no debug identity (compiler temporary).
    pub fn temporary(&mut self) -> ValueId {
        self.push(Op::Alloca, true)
    }

    pub fn load(&mut self, ptr: ValueId) -> ValueId {
        self.push(Op::Load { ptr: Operand::Value(ptr) }, true)
    }

    pub fn store(&mut self, value: impl Into<Operand>, ptr: ValueId) -> &mut Self {
        self.push(Op::Store { value: value.into(), ptr: Operand::Value(ptr) }, false);
        self
    }

    pub fn element_ptr(&mut self, base: ValueId, index: impl Into<Operand>) -> ValueId {
        self.push(Op::ElementPtr { base: Operand::Value(base), indices: vec![index.into()] }, true)
    }

    pub fn call(&mut self, callee: &str, args: Vec<Operand>) -> ValueId {
        self.push(Op::Call { callee: Callee::Direct(callee.to_string()), args }, true)
    }

    pub fn call_indirect(&mut self, target: ValueId, args: Vec<Operand>) -> ValueId {
        self.push(Op::Call { callee: Callee::Indirect(Operand::Value(target)), args }, true)
    }

    pub fn compute(&mut self, opcode: &str, operands: Vec<Operand>) -> ValueId {
        self.push(Op::Compute { opcode: opcode.to_string(), operands }, true)
    }

    pub fn branch(&mut self, condition: Option<Operand>) -> &mut Self {
        self.push(Op::Branch { condition }, false);
        self
    }

    pub fn ret(&mut self, value: Option<Operand>) -> &mut Self {
        self.push(Op::Return { value }, false);
        self
    }

    /// Commit the function to the module.
    pub fn finish(self) {
        self.module.module.functions.push(self.unit);
    }
}
