//! Small helpers shared by the optimization passes: most of them boil down
//! to "decide a replacement value for some instructions, then splice those
//! replacements through the function and drop the dead instructions."

use std::collections::{HashMap, HashSet};

use crate::mir::{Function, Inst, InstId, Terminator, Value};

fn resolve(v: Value, subs: &HashMap<InstId, Value>) -> Value {
    match v {
        Value::Inst(id) => subs.get(&id).copied().unwrap_or(v),
        Value::Param(_) => v,
    }
}

/// Rewrite every operand in `func` (instructions and terminators) that
/// names a key in `subs` to the mapped value. Does not remove anything -
/// see [`remove_instructions`].
pub fn apply_substitutions(func: &mut Function, subs: &HashMap<InstId, Value>) {
    if subs.is_empty() {
        return;
    }
    for inst in func.insts.as_mut_slice() {
        match inst {
            Inst::Load(slot) => *slot = resolve(*slot, subs),
            Inst::Store(slot, value) => {
                *slot = resolve(*slot, subs);
                *value = resolve(*value, subs);
            }
            Inst::FAdd(a, b) | Inst::FSub(a, b) | Inst::FMul(a, b) | Inst::FCmpULT(a, b) => {
                *a = resolve(*a, subs);
                *b = resolve(*b, subs);
            }
            Inst::UIToFP(v) | Inst::FPToSI(v) => *v = resolve(*v, subs),
            Inst::Call(_, args) => {
                for a in args.iter_mut() {
                    *a = resolve(*a, subs);
                }
            }
            Inst::Phi(incoming) => {
                for (v, _) in incoming.iter_mut() {
                    *v = resolve(*v, subs);
                }
            }
            Inst::ConstF64(_) | Inst::Alloca => {}
        }
    }

    for block in func.blocks.as_mut_slice() {
        if let Some(term) = &mut block.terminator {
            match term {
                Terminator::Ret(Some(v)) => *v = resolve(*v, subs),
                Terminator::CondBr { cond, .. } => *cond = resolve(*cond, subs),
                Terminator::Ret(None) | Terminator::Br(_) => {}
            }
        }
    }
}

/// Drop every instruction named in `removed` from whichever block's `insts`
/// list currently holds it. The arena slot itself is left alone - nothing
/// should reference a removed id anymore once [`apply_substitutions`] has
/// run first.
pub fn remove_instructions(func: &mut Function, removed: &HashSet<InstId>) {
    if removed.is_empty() {
        return;
    }
    for block in func.blocks.as_mut_slice() {
        block.insts.retain(|id| !removed.contains(id));
    }
}

/// `Some(c)` iff `v` names a `ConstF64` instruction.
pub fn as_const(func: &Function, v: Value) -> Option<f64> {
    match v {
        Value::Inst(id) => match func.insts.get(id) {
            Some(Inst::ConstF64(c)) => Some(*c),
            _ => None,
        },
        Value::Param(_) => None,
    }
}
