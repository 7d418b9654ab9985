//! `simplify_cfg` - the last pass of the fixed pipeline (spec §5): merge a
//! block into its single predecessor when that predecessor unconditionally
//! branches to nothing else, and mark every block unreachable from entry
//! as elided so the dump and verifier skip it.
//!
//! Elided blocks are never removed from the arena (spec §9: IR objects are
//! owned by a context/arena; nothing here renumbers `BlockId`s), they are
//! flagged via [`crate::mir::BasicBlock::elided`] and every consumer of a
//! `Function` (dump, verify) already treats an elided block as absent.

use std::collections::HashSet;

use crate::analysis::ControlFlowGraph;
use crate::mir::{BlockId, Function, Terminator};

pub fn simplify_cfg(func: &mut Function) {
    if func.is_declaration() {
        return;
    }
    let Some(entry) = func.entry_block else {
        return;
    };

    merge_single_predecessor_chains(func, entry);
    mark_unreachable_elided(func, entry);
}

/// While some block `b` (other than the entry) has exactly one predecessor
/// `p`, and `p`'s only successor is `b`, splice `b`'s instructions and
/// terminator onto the end of `p` and redirect `b` to empty/elided.
fn merge_single_predecessor_chains(func: &mut Function, entry: BlockId) {
    loop {
        let cfg = ControlFlowGraph::build(func);
        let mergeable = func.blocks.indices().find(|&b| {
            b != entry
                && !func.blocks[b].elided
                && cfg.predecessors.get(&b).map(|p| p.len()) == Some(1)
                && {
                    let pred = cfg.predecessors[&b][0];
                    let pred_succs = cfg.successors.get(&pred).map(|s| s.len()).unwrap_or(0);
                    !func.blocks[pred].elided && pred_succs == 1
                }
        });
        let Some(block) = mergeable else { break };
        let pred = cfg.predecessors[&block][0];

        let moved_insts: Vec<_> = std::mem::take(&mut func.blocks[block].insts);
        let moved_term: Option<Terminator> = func.blocks[block].terminator.take();
        func.blocks[pred].insts.extend(moved_insts);
        func.blocks[pred].terminator = moved_term;
        func.blocks[block].elided = true;
        if func.entry_block == Some(block) {
            func.entry_block = Some(pred);
        }
    }
}

fn mark_unreachable_elided(func: &mut Function, entry: BlockId) {
    let cfg = ControlFlowGraph::build(func);
    let reachable: HashSet<BlockId> = cfg.reachable_from(entry);
    for block in func.blocks.indices() {
        if !reachable.contains(&block) {
            func.blocks[block].elided = true;
        }
    }
}
