//! `gvn` - global value numbering (spec §5, fourth in the fixed pipeline):
//! structurally identical pure instructions collapse to a single
//! definition. Scoped to instructions with no observable side effect and
//! no control dependency - `Alloca`/`Load`/`Store` never reach this pass
//! (`promote` already removed every promotable one, and this language's
//! lowering never produces an escaping alloca), and `Call` is excluded
//! outright since a user-defined operator or function may not be pure.
//!
//! A later occurrence is folded into the earliest structurally-equal one
//! only when the earlier one's block dominates the later one's - equal
//! operands alone do not imply that, since two sibling branches of the
//! same `if` can each compute the identical expression independently (e.g.
//! `if(c) then a+b else a+b`) without either dominating the other. Folding
//! across non-dominating blocks would make the surviving definition feed a
//! site that never actually computed it on the branch not taken.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::analysis::ControlFlowGraph;
use crate::mir::{BlockId, Function, Inst, InstId, Value};
use crate::opt::rewrite::{apply_substitutions, remove_instructions};

/// A structural key for the instructions `gvn` considers poolable. Calls
/// and phis are deliberately absent - see the module docs.
#[derive(PartialEq, Eq, Hash)]
enum Key {
    Const(u64),
    FAdd(Value, Value),
    FSub(Value, Value),
    FMul(Value, Value),
    FCmpULT(Value, Value),
    UIToFP(Value),
    FPToSI(Value),
}

fn key_of(inst: &Inst) -> Option<Key> {
    match inst {
        Inst::ConstF64(v) => Some(Key::Const(v.to_bits())),
        Inst::FAdd(a, b) => Some(Key::FAdd(*a, *b)),
        Inst::FSub(a, b) => Some(Key::FSub(*a, *b)),
        Inst::FMul(a, b) => Some(Key::FMul(*a, *b)),
        Inst::FCmpULT(a, b) => Some(Key::FCmpULT(*a, *b)),
        Inst::UIToFP(v) => Some(Key::UIToFP(*v)),
        Inst::FPToSI(v) => Some(Key::FPToSI(*v)),
        Inst::Alloca | Inst::Load(_) | Inst::Store(_, _) | Inst::Call(_, _) | Inst::Phi(_) => None,
    }
}

pub fn gvn(func: &mut Function) {
    if func.is_declaration() {
        return;
    }

    let cfg = ControlFlowGraph::build(func);

    // Every candidate definition seen so far for a given structural key,
    // each tagged with the block it lives in - a later occurrence can only
    // fold into one whose block dominates its own.
    let mut seen: HashMap<Key, Vec<(InstId, BlockId)>> = HashMap::new();
    let mut substitutions: HashMap<InstId, Value> = HashMap::new();
    let mut removed: HashSet<InstId> = HashSet::new();

    // Visit in block order, and within a block in instruction order, so
    // candidates are always recorded before a dominated user can see them.
    for (block_id, block) in func.blocks.iter_enumerated() {
        for &id in &block.insts {
            let Some(key) = key_of(&func.insts[id]) else {
                continue;
            };
            let candidates = seen.entry(key).or_default();
            let dominating = candidates
                .iter()
                .find(|&&(_, def_block)| cfg.dominates(def_block, block_id));
            match dominating {
                Some(&(earlier, _)) => {
                    substitutions.insert(id, Value::Inst(earlier));
                    removed.insert(id);
                }
                None => {
                    candidates.push((id, block_id));
                }
            }
        }
    }

    apply_substitutions(func, &substitutions);
    remove_instructions(func, &removed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IrBuilder, ModuleBuilder};
    use crate::types::Type;
    use ksc_util::Interner;

    #[test]
    fn duplicate_additions_collapse_to_one_definition() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![interner.intern("x")], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        let p = b.build_param(0);
        let one = b.build_const_f64(1.0);
        let sum1 = b.build_fadd(p, one);
        let sum2 = b.build_fadd(p, one);
        let total = b.build_fadd(sum1, sum2);
        b.build_ret(Some(total));

        let mut module = b.into_module();
        let func = module.function_mut(func_id);
        gvn(func);

        let Value::Inst(total_id) = total else { unreachable!() };
        let Inst::FAdd(a, bb) = func.inst(total_id) else {
            panic!("expected FAdd")
        };
        assert_eq!(a, bb, "both duplicate sums should have collapsed to the same definition");
    }

    #[test]
    fn calls_are_never_deduplicated() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let callee_name = interner.intern("g");
        let callee = b.declare_function(callee_name, vec![interner.intern("x")], Type::F64);
        let entry_callee = b.append_block(callee);
        b.position_at_end(callee, entry_callee);
        let p = b.build_param(0);
        b.build_ret(Some(p));

        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        let one = b.build_const_f64(1.0);
        let call1 = b.build_call(callee, vec![one]);
        let call2 = b.build_call(callee, vec![one]);
        let total = b.build_fadd(call1, call2);
        b.build_ret(Some(total));

        let mut module = b.into_module();
        let func = module.function_mut(func_id);
        let before = func.insts.len();
        gvn(func);
        assert_eq!(func.insts.len(), before, "call results must not be pooled by identity");
    }

    #[test]
    fn identical_expressions_in_sibling_branches_are_not_folded() {
        // `then` and `else` both compute `p + one` independently; neither
        // block dominates the other, so folding one into the other would
        // make the branch not taken feed a definition it never executed.
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![interner.intern("x")], Type::F64);
        let entry = b.append_block(func_id);
        let then_block = b.append_block(func_id);
        let else_block = b.append_block(func_id);
        let join = b.append_block(func_id);

        b.position_at_end(func_id, entry);
        let p = b.build_param(0);
        let cond = b.build_fcmp_ult(p, p);
        b.build_condbr(cond, then_block, else_block);

        b.position_at_end(func_id, then_block);
        let one_a = b.build_const_f64(1.0);
        let sum_then = b.build_fadd(p, one_a);
        b.build_br(join);

        b.position_at_end(func_id, else_block);
        let one_b = b.build_const_f64(1.0);
        let sum_else = b.build_fadd(p, one_b);
        b.build_br(join);

        b.position_at_end(func_id, join);
        let phi = b.build_phi(vec![(sum_then, then_block), (sum_else, else_block)]);
        b.build_ret(Some(phi));

        let mut module = b.into_module();
        let func = module.function_mut(func_id);
        gvn(func);

        let Value::Inst(phi_id) = phi else { unreachable!() };
        let Inst::Phi(incoming) = func.inst(phi_id) else {
            panic!("expected Phi")
        };
        let (then_value, _) = incoming[0];
        let (else_value, _) = incoming[1];
        assert_ne!(
            then_value, else_value,
            "sibling branches must keep independent definitions, not alias one into the other"
        );
    }
}
