//! The abstract IR module spec §4.5 describes: a named collection of
//! `f64`-or-`i32` functions, each either a declaration (zero basic blocks)
//! or a body of one or more blocks terminated by `br`/`condbr`/`ret`.
//!
//! Instructions and blocks live in per-function arenas
//! (`IndexVec<InstId, _>`, `IndexVec<BlockId, _>`) and refer to each other
//! by handle, matching spec §9's "IR objects ... owned by a context
//! object (arena); cross-references ... as stable indices/handles, never
//! as owning links."

use indexmap::IndexMap;
use ksc_util::index_vec::IndexVec;
use ksc_util::Symbol;

pub use crate::ids::{BlockId, FunctionId, InstId};
pub use crate::types::Type;

/// A value produced somewhere in the function: either an incoming
/// parameter (addressed by position, since every parameter is `f64`) or
/// the result of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Param(u32),
    Inst(InstId),
}

impl From<InstId> for Value {
    fn from(id: InstId) -> Self {
        Value::Inst(id)
    }
}

/// One instruction (spec §4.5's instruction list). Every instruction
/// implicitly defines a value named by its own `InstId`, even ones with no
/// interesting result (`Store` - its "value" is never read, but giving it a
/// slot keeps every `Vec<InstId>` in `BasicBlock::insts` uniform).
#[derive(Clone, Debug)]
pub enum Inst {
    /// A constant `f64`.
    ConstF64(f64),
    /// `alloca(f64)`: a stack slot, always created in the entry block.
    Alloca,
    Load(Value),
    Store(Value, Value),
    FAdd(Value, Value),
    FSub(Value, Value),
    FMul(Value, Value),
    /// `fcmp-ult`: floating-point unordered-less-than, producing a `0.0`
    /// or `1.0` bit pattern directly - this core has no separate `i1`
    /// type, so the comparison and the widening conversion it would
    /// normally feed are fused into a single `f64`-valued instruction.
    /// `uitofp` (below) still exists for the dump to use the mnemonic
    /// spec §4.5 names, applied to the result of this instruction.
    FCmpULT(Value, Value),
    /// `uitofp`: widens a boolean (produced by `FCmpULT`) to `f64`. A
    /// no-op at the value level since `FCmpULT` already yields `f64`, but
    /// kept as its own instruction so the dump/verifier vocabulary matches
    /// spec §4.5 exactly and a future embedder that wants a real `i1`
    /// result type has a seam to change only `FCmpULT`.
    UIToFP(Value),
    /// `fptosi`: narrows `f64` to `i32`, used only for `main`'s return.
    FPToSI(Value),
    Call(FunctionId, Vec<Value>),
    Phi(Vec<(Value, BlockId)>),
}

/// The terminator every basic block ends in exactly once (spec §8's
/// "Block termination" invariant).
#[derive(Clone, Debug)]
pub enum Terminator {
    Ret(Option<Value>),
    Br(BlockId),
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
}

impl Terminator {
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            Terminator::Ret(_) => Vec::new(),
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BasicBlock {
    pub insts: Vec<InstId>,
    pub terminator: Option<Terminator>,
    /// Set by `simplify_cfg` once every edge into this block has been
    /// redirected elsewhere. An elided block keeps its (now-unreachable)
    /// body out of the arena-index renumbering problem - nothing still
    /// points at it, and the verifier/dump skip it outright rather than
    /// complaining that it has no terminator.
    pub elided: bool,
}

impl BasicBlock {
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

/// A function: either a declaration (`is_declaration() == true`, no
/// blocks, body supplied by linkage - spec's `extern`) or a definition
/// with an `insts` arena and at least one block.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Symbol,
    pub param_names: Vec<Symbol>,
    pub return_type: Type,
    pub blocks: IndexVec<BlockId, BasicBlock>,
    pub insts: IndexVec<InstId, Inst>,
    pub entry_block: Option<BlockId>,
}

impl Function {
    pub fn declaration(name: Symbol, param_names: Vec<Symbol>, return_type: Type) -> Self {
        Self {
            name,
            param_names,
            return_type,
            blocks: IndexVec::new(),
            insts: IndexVec::new(),
            entry_block: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.param_names.len()
    }

    pub fn return_type(&self) -> Type {
        self.return_type
    }

    /// Spec §6: "`Function::is_declaration()`" - true iff lowering never
    /// gave this function a body (an `extern`, or a not-yet-defined
    /// forward reference).
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id]
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }
}

/// A named collection of functions (spec §4.5). `index` keeps
/// `Module::function(name)` O(1) while `functions` preserves declaration
/// order for the textual dump and the golden tests.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub functions: IndexVec<FunctionId, Function>,
    index: IndexMap<Symbol, FunctionId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, function: Function) -> FunctionId {
        let name = function.name;
        if let Some(&id) = self.index.get(&name) {
            self.functions[id] = function;
            return id;
        }
        let id = self.functions.push(function);
        self.index.insert(name, id);
        id
    }

    pub fn function_id(&self, name: Symbol) -> Option<FunctionId> {
        self.index.get(&name).copied()
    }

    pub fn function(&self, name: Symbol) -> Option<&Function> {
        self.function_id(name).map(|id| &self.functions[id])
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id]
    }

    pub fn get(&self, id: FunctionId) -> &Function {
        &self.functions[id]
    }

    /// In declaration order - walks the name index, not the raw arena, so
    /// a function `remove`d after a failed lowering (spec §7) never shows
    /// up here even though its arena slot still physically exists.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.index.values().map(|&id| (id, &self.functions[id]))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop a function that failed to lower (spec §7: "the function is
    /// removed from the module; other top-level items continue to be
    /// lowered"). Unlinks it from the name index so `function(name)` and
    /// `iter` stop seeing it; the arena slot is left in place so any
    /// `FunctionId` a sibling call already captured does not dangle, but
    /// nothing reaches it by name again.
    pub fn remove(&mut self, id: FunctionId) {
        let name = self.functions[id].name;
        if self.index.get(&name) == Some(&id) {
            self.index.shift_remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksc_util::Interner;

    #[test]
    fn declare_then_lookup_by_name() {
        let mut interner = Interner::new();
        let mut module = Module::new();
        let name = interner.intern("foo");
        let id = module.declare(Function::declaration(name, vec![], Type::F64));
        assert_eq!(module.function_id(name), Some(id));
        assert!(module.function(name).unwrap().is_declaration());
    }

    #[test]
    fn removed_function_is_not_found_by_name_or_iter() {
        let mut interner = Interner::new();
        let mut module = Module::new();
        let foo = interner.intern("foo");
        let bar = interner.intern("bar");
        let foo_id = module.declare(Function::declaration(foo, vec![], Type::F64));
        module.declare(Function::declaration(bar, vec![], Type::F64));
        module.remove(foo_id);
        assert!(module.function(foo).is_none());
        assert_eq!(module.iter().count(), 1);
    }

    #[test]
    fn declare_twice_with_same_name_overwrites_in_place() {
        let mut interner = Interner::new();
        let mut module = Module::new();
        let name = interner.intern("foo");
        let first = module.declare(Function::declaration(name, vec![], Type::F64));
        let second = module.declare(Function::declaration(name, vec![interner.intern("x")], Type::F64));
        assert_eq!(first, second);
        assert_eq!(module.function(name).unwrap().arity(), 1);
    }
}
