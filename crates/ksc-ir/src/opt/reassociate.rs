//! `reassociate` - canonicalizes the operand order of commutative
//! `fadd`/`fmul` instructions (spec §5, third in the fixed pipeline) so
//! that `instcombine`'s patterns and `gvn`'s structural hashing, which both
//! already ran or are about to run, see `x + 5.0` and `5.0 + x` as the same
//! shape.
//!
//! Canonical order: a constant operand sorts after a non-constant one.
//! Between two constants, or two non-constants, operands keep their
//! original order - there is no further total order to canonicalize on
//! (this core has no instruction "rank" beyond definition order, and
//! sorting by raw `InstId` would make the pass sensitive to allocation
//! order instead of shape).

use std::collections::HashSet;

use crate::mir::{Inst, InstId};
use crate::mir::{Function, Value};

pub fn reassociate(func: &mut Function) {
    if func.is_declaration() {
        return;
    }

    let constants: HashSet<InstId> = func
        .insts
        .iter_enumerated()
        .filter(|(_, inst)| matches!(inst, Inst::ConstF64(_)))
        .map(|(id, _)| id)
        .collect();

    let is_const = |v: &Value| matches!(v, Value::Inst(id) if constants.contains(id));

    for inst in func.insts.as_mut_slice() {
        if let Inst::FAdd(a, b) | Inst::FMul(a, b) = inst {
            if is_const(a) && !is_const(b) {
                std::mem::swap(a, b);
            }
        }
    }
}
