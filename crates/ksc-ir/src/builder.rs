//! The IR builder façade (spec §6): the interface the lowering pass drives
//! to emit instructions, create functions and blocks, and manage an
//! insertion cursor - kept as an explicit trait so a test double can stand
//! in for the real arena-backed module in `ksc-lower`'s unit tests (spec
//! §9: "isolates the core from any particular IR library").

use ksc_util::Symbol;

use crate::ids::{BlockId, FunctionId, InstId};
use crate::mir::{BasicBlock, Function, Inst, Module, Terminator, Value};
use crate::types::Type;

pub trait IrBuilder {
    fn declare_function(&mut self, name: Symbol, param_names: Vec<Symbol>, return_type: Type) -> FunctionId;
    fn append_block(&mut self, function: FunctionId) -> BlockId;
    fn position_at_end(&mut self, function: FunctionId, block: BlockId);
    fn current_block(&self) -> BlockId;

    fn build_const_f64(&mut self, value: f64) -> Value;
    fn build_param(&self, index: u32) -> Value;
    fn build_alloca(&mut self) -> Value;
    fn build_load(&mut self, slot: Value) -> Value;
    fn build_store(&mut self, slot: Value, value: Value);
    fn build_fadd(&mut self, lhs: Value, rhs: Value) -> Value;
    fn build_fsub(&mut self, lhs: Value, rhs: Value) -> Value;
    fn build_fmul(&mut self, lhs: Value, rhs: Value) -> Value;
    fn build_fcmp_ult(&mut self, lhs: Value, rhs: Value) -> Value;
    fn build_uitofp(&mut self, value: Value) -> Value;
    fn build_fptosi(&mut self, value: Value) -> Value;
    fn build_call(&mut self, callee: FunctionId, args: Vec<Value>) -> Value;
    fn build_phi(&mut self, incoming: Vec<(Value, BlockId)>) -> Value;

    fn build_br(&mut self, target: BlockId);
    fn build_condbr(&mut self, cond: Value, then_block: BlockId, else_block: BlockId);
    fn build_ret(&mut self, value: Option<Value>);

    fn is_terminated(&self) -> bool;

    /// The previously-declared function named `name`, if any - how
    /// `ksc-lower` resolves a `CallExpr`'s callee or a user-operator's
    /// backing function without needing its own name index.
    fn lookup_function(&self, name: Symbol) -> Option<FunctionId>;
    fn function_arity(&self, id: FunctionId) -> usize;
    /// True iff `id` has no body yet - an `extern`, or a forward reference
    /// nothing has defined (spec §4.4's `Function` rule: "if a function
    /// with this name exists and is non-empty, error `AlreadyDefined`").
    fn function_is_declaration(&self, id: FunctionId) -> bool;
    /// Drop a function that failed to lower (spec §7: it is removed from
    /// the module; other top-level items still lower).
    fn remove_function(&mut self, id: FunctionId);
}

/// The one production `IrBuilder`: an insertion cursor (current function +
/// current block) over a [`Module`]'s own arenas. Non-owning - per spec
/// §5, "the lowering pass holds a cursor ... which is a non-owning
/// reference" into the module it is building.
pub struct ModuleBuilder {
    module: Module,
    current_function: Option<FunctionId>,
    current_block: Option<BlockId>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            module: Module::new(),
            current_function: None,
            current_block: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    fn func_mut(&mut self) -> &mut Function {
        let id = self.current_function.expect("no function positioned");
        self.module.function_mut(id)
    }

    fn push_inst(&mut self, inst: Inst) -> Value {
        let block = self.current_block.expect("no block positioned");
        let id = {
            let f = self.func_mut();
            let id = f.insts.push(inst);
            f.blocks[block].insts.push(id);
            id
        };
        Value::Inst(id)
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder for ModuleBuilder {
    fn declare_function(&mut self, name: Symbol, param_names: Vec<Symbol>, return_type: Type) -> FunctionId {
        self.module
            .declare(Function::declaration(name, param_names, return_type))
    }

    fn append_block(&mut self, function: FunctionId) -> BlockId {
        let f = self.module.function_mut(function);
        let id = f.blocks.push(BasicBlock::default());
        if f.entry_block.is_none() {
            f.entry_block = Some(id);
        }
        id
    }

    fn position_at_end(&mut self, function: FunctionId, block: BlockId) {
        self.current_function = Some(function);
        self.current_block = Some(block);
    }

    fn current_block(&self) -> BlockId {
        self.current_block.expect("no block positioned")
    }

    fn build_const_f64(&mut self, value: f64) -> Value {
        self.push_inst(Inst::ConstF64(value))
    }

    fn build_param(&self, index: u32) -> Value {
        Value::Param(index)
    }

    fn build_alloca(&mut self) -> Value {
        self.push_inst(Inst::Alloca)
    }

    fn build_load(&mut self, slot: Value) -> Value {
        self.push_inst(Inst::Load(slot))
    }

    fn build_store(&mut self, slot: Value, value: Value) {
        self.push_inst(Inst::Store(slot, value));
    }

    fn build_fadd(&mut self, lhs: Value, rhs: Value) -> Value {
        self.push_inst(Inst::FAdd(lhs, rhs))
    }

    fn build_fsub(&mut self, lhs: Value, rhs: Value) -> Value {
        self.push_inst(Inst::FSub(lhs, rhs))
    }

    fn build_fmul(&mut self, lhs: Value, rhs: Value) -> Value {
        self.push_inst(Inst::FMul(lhs, rhs))
    }

    fn build_fcmp_ult(&mut self, lhs: Value, rhs: Value) -> Value {
        self.push_inst(Inst::FCmpULT(lhs, rhs))
    }

    fn build_uitofp(&mut self, value: Value) -> Value {
        self.push_inst(Inst::UIToFP(value))
    }

    fn build_fptosi(&mut self, value: Value) -> Value {
        self.push_inst(Inst::FPToSI(value))
    }

    fn build_call(&mut self, callee: FunctionId, args: Vec<Value>) -> Value {
        self.push_inst(Inst::Call(callee, args))
    }

    fn build_phi(&mut self, incoming: Vec<(Value, BlockId)>) -> Value {
        self.push_inst(Inst::Phi(incoming))
    }

    fn build_br(&mut self, target: BlockId) {
        let block = self.current_block.expect("no block positioned");
        self.func_mut().blocks[block].terminator = Some(Terminator::Br(target));
    }

    fn build_condbr(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        let block = self.current_block.expect("no block positioned");
        self.func_mut().blocks[block].terminator = Some(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    fn build_ret(&mut self, value: Option<Value>) {
        let block = self.current_block.expect("no block positioned");
        self.func_mut().blocks[block].terminator = Some(Terminator::Ret(value));
    }

    fn is_terminated(&self) -> bool {
        let block = self.current_block.expect("no block positioned");
        let f = &self.module.functions[self.current_function.unwrap()];
        f.blocks[block].is_terminated()
    }

    fn lookup_function(&self, name: Symbol) -> Option<FunctionId> {
        self.module.function_id(name)
    }

    fn function_arity(&self, id: FunctionId) -> usize {
        self.module.get(id).arity()
    }

    fn function_is_declaration(&self, id: FunctionId) -> bool {
        self.module.get(id).is_declaration()
    }

    fn remove_function(&mut self, id: FunctionId) {
        self.module.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksc_util::Interner;

    #[test]
    fn builds_a_trivial_function_returning_a_constant() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("answer");
        let f = b.declare_function(name, vec![], Type::F64);
        let entry = b.append_block(f);
        b.position_at_end(f, entry);
        let c = b.build_const_f64(42.0);
        b.build_ret(Some(c));
        assert!(b.is_terminated());

        let module = b.into_module();
        let func = module.function(name).unwrap();
        assert!(!func.is_declaration());
        assert_eq!(func.blocks.len(), 1);
    }

    #[test]
    fn redeclaring_a_function_reuses_its_id() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let id1 = b.declare_function(name, vec![], Type::F64);
        let id2 = b.declare_function(name, vec![interner.intern("x")], Type::F64);
        assert_eq!(id1, id2);
    }
}
