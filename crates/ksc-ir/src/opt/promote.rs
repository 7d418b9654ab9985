//! `promote` - the pipeline's mem2reg pass (spec §5, first in the fixed
//! order so every later pass sees SSA values instead of `alloca`/`load`/
//! `store` triples). Every named value the lowering pass emits (function
//! parameters, `let` bindings, `for` induction variables) starts life as a
//! stack slot; this pass threads the slot's value through the CFG directly
//! and inserts a `phi` wherever two different values can reach the same
//! block, exactly as spec §4.6 describes the stack-slot scheme being
//! "later promoted."
//!
//! Scoped to allocas whose address never escapes (never passed to `call`,
//! stored as a value, or read by a `phi`) - the only shape this language's
//! lowering ever produces, so nothing here needs to model an alloca whose
//! address is taken.

use std::collections::{HashMap, HashSet};

use crate::analysis::ControlFlowGraph;
use crate::mir::{BlockId, Function, Inst, InstId, Value};
use crate::opt::rewrite;

pub fn promote(func: &mut Function) {
    if func.is_declaration() {
        return;
    }
    let allocas = promotable_allocas(func);
    if allocas.is_empty() {
        return;
    }

    let cfg = ControlFlowGraph::build(func);
    let mut removed: HashSet<InstId> = HashSet::new();
    let mut substitutions: HashMap<InstId, Value> = HashMap::new();
    let mut phi_insts: HashMap<(InstId, BlockId), InstId> = HashMap::new();

    for &alloca in &allocas {
        promote_one(func, alloca, &cfg, &mut removed, &mut substitutions, &mut phi_insts);
    }

    rewrite::apply_substitutions(func, &substitutions);
    rewrite::remove_instructions(func, &removed);
}

/// An alloca is promotable iff every use of it is as the address operand
/// of a `load` or a `store` - never as a stored value, arithmetic operand,
/// call argument, or phi input.
fn promotable_allocas(func: &Function) -> Vec<InstId> {
    let mut candidates: HashSet<InstId> = HashSet::new();
    for (id, inst) in func.insts.iter_enumerated() {
        if matches!(inst, Inst::Alloca) {
            candidates.insert(id);
        }
    }

    let mut disqualify = |v: &Value, candidates: &mut HashSet<InstId>| {
        if let Value::Inst(id) = v {
            candidates.remove(id);
        }
    };

    for (_, inst) in func.insts.iter_enumerated() {
        match inst {
            Inst::Store(_, value) => disqualify(value, &mut candidates),
            Inst::FAdd(a, b) | Inst::FSub(a, b) | Inst::FMul(a, b) | Inst::FCmpULT(a, b) => {
                disqualify(a, &mut candidates);
                disqualify(b, &mut candidates);
            }
            Inst::UIToFP(v) | Inst::FPToSI(v) => disqualify(v, &mut candidates),
            Inst::Call(_, args) => {
                for a in args {
                    disqualify(a, &mut candidates);
                }
            }
            Inst::Phi(incoming) => {
                for (v, _) in incoming {
                    disqualify(v, &mut candidates);
                }
            }
            Inst::Load(_) | Inst::ConstF64(_) | Inst::Alloca => {}
        }
    }

    let mut v: Vec<InstId> = candidates.into_iter().collect();
    v.sort_by_key(|id| id.0);
    v
}

#[allow(clippy::too_many_arguments)]
fn promote_one(
    func: &mut Function,
    alloca: InstId,
    cfg: &ControlFlowGraph,
    removed: &mut HashSet<InstId>,
    substitutions: &mut HashMap<InstId, Value>,
    phi_insts: &mut HashMap<(InstId, BlockId), InstId>,
) {
    let order: Vec<BlockId> = func.blocks.indices().collect();
    let mut entry_val: HashMap<BlockId, Option<Value>> = HashMap::new();
    let mut end_val: HashMap<BlockId, Option<Value>> = HashMap::new();

    // A simple value-flow fixpoint: enough iterations for a single level
    // of loop back-edge to stabilize (this language has no nested
    // user-visible loop headers sharing the same induction slot).
    let max_iters = func.blocks.len() + 2;
    for _ in 0..max_iters {
        let mut changed = false;
        for &block in &order {
            let preds = cfg.predecessors.get(&block).cloned().unwrap_or_default();
            let new_entry = if preds.is_empty() {
                None
            } else if preds.len() == 1 {
                end_val.get(&preds[0]).copied().flatten()
            } else {
                let vals: Vec<Option<Value>> =
                    preds.iter().map(|p| end_val.get(p).copied().flatten()).collect();
                if vals.iter().any(Option::is_none) {
                    phi_insts.get(&(alloca, block)).copied().map(Value::Inst)
                } else {
                    let first = vals[0].unwrap();
                    if vals.iter().all(|v| v.unwrap() == first) {
                        Some(first)
                    } else {
                        let phi_id = *phi_insts
                            .entry((alloca, block))
                            .or_insert_with(|| func.insts.push(Inst::Phi(Vec::new())));
                        Some(Value::Inst(phi_id))
                    }
                }
            };

            if entry_val.get(&block).copied().flatten() != new_entry {
                entry_val.insert(block, new_entry);
                changed = true;
            }

            let mut current = entry_val.get(&block).copied().flatten();
            for &inst_id in &func.blocks[block].insts.clone() {
                if let Inst::Store(slot, v) = &func.insts[inst_id] {
                    if *slot == Value::Inst(alloca) {
                        current = Some(*v);
                    }
                }
            }
            if end_val.get(&block).copied().flatten() != current {
                end_val.insert(block, current);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    removed.insert(alloca);
    for &block in &order {
        let mut current = entry_val.get(&block).copied().flatten();
        for &inst_id in &func.blocks[block].insts.clone() {
            match &func.insts[inst_id] {
                Inst::Store(slot, v) if *slot == Value::Inst(alloca) => {
                    current = Some(*v);
                    removed.insert(inst_id);
                }
                Inst::Load(slot) if *slot == Value::Inst(alloca) => {
                    if let Some(v) = current {
                        substitutions.insert(inst_id, v);
                    }
                    removed.insert(inst_id);
                }
                _ => {}
            }
        }
    }

    let blocks_needing: Vec<BlockId> = phi_insts
        .keys()
        .filter(|(a, _)| *a == alloca)
        .map(|(_, b)| *b)
        .collect();
    for block in blocks_needing {
        let phi_id = phi_insts[&(alloca, block)];
        let preds = cfg.predecessors.get(&block).cloned().unwrap_or_default();
        let incoming: Vec<(Value, BlockId)> = preds
            .iter()
            .map(|&p| {
                let v = end_val.get(&p).copied().flatten().unwrap_or(Value::Inst(phi_id));
                (v, p)
            })
            .collect();
        func.insts[phi_id] = Inst::Phi(incoming);
        if !func.blocks[block].insts.contains(&phi_id) {
            func.blocks[block].insts.insert(0, phi_id);
        }
    }
}
