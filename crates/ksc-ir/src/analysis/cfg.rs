//! Control-flow analysis over a lowered [`Function`]: predecessor/successor
//! edges and a dominator relation, computed once and reused by the
//! verifier (spec §4.5) and the `mem2reg`/`simplify_cfg` optimization
//! passes (spec §5).

use std::collections::{HashMap, HashSet};

use crate::mir::{BlockId, Function};

pub struct ControlFlowGraph {
    pub successors: HashMap<BlockId, Vec<BlockId>>,
    pub predecessors: HashMap<BlockId, Vec<BlockId>>,
    /// `dominators[b]` is every block (including `b` itself) that
    /// dominates `b`.
    dominators: HashMap<BlockId, HashSet<BlockId>>,
}

impl ControlFlowGraph {
    pub fn build(func: &Function) -> Self {
        let mut successors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        let mut predecessors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

        for (id, _) in func.blocks.iter_enumerated() {
            successors.entry(id).or_default();
            predecessors.entry(id).or_default();
        }

        for (id, block) in func.blocks.iter_enumerated() {
            if let Some(term) = &block.terminator {
                for target in term.targets() {
                    successors.entry(id).or_default().push(target);
                    predecessors.entry(target).or_default().push(id);
                }
            }
        }

        let dominators = match func.entry_block {
            Some(entry) => compute_dominators(func, entry, &predecessors),
            None => HashMap::new(),
        };

        Self {
            successors,
            predecessors,
            dominators,
        }
    }

    /// `a` dominates `b` iff every path from the entry block to `b`
    /// passes through `a` (every block dominates itself).
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominators
            .get(&b)
            .map(|doms| doms.contains(&a))
            .unwrap_or(false)
    }

    /// Blocks reachable from `entry` by following `successors` edges.
    pub fn reachable_from(&self, entry: BlockId) -> HashSet<BlockId> {
        let mut visited = HashSet::new();
        let mut stack = vec![entry];
        while let Some(block) = stack.pop() {
            if visited.insert(block) {
                if let Some(succs) = self.successors.get(&block) {
                    stack.extend(succs.iter().copied());
                }
            }
        }
        visited
    }
}

/// Classic iterative dominator-set computation (Cooper/Harvey/Kennedy's
/// data-flow formulation, applied as a direct set-intersection fixpoint
/// rather than the postorder-bitset variant - this core's functions have
/// at most a handful of blocks, so the simpler O(n^2)-per-iteration form
/// never shows up on a profile).
fn compute_dominators(
    func: &Function,
    entry: BlockId,
    predecessors: &HashMap<BlockId, Vec<BlockId>>,
) -> HashMap<BlockId, HashSet<BlockId>> {
    let all_blocks: HashSet<BlockId> = func.blocks.indices().collect();
    let mut doms: HashMap<BlockId, HashSet<BlockId>> = HashMap::new();

    for &block in &all_blocks {
        if block == entry {
            let mut set = HashSet::new();
            set.insert(entry);
            doms.insert(block, set);
        } else {
            doms.insert(block, all_blocks.clone());
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for &block in &all_blocks {
            if block == entry {
                continue;
            }
            let preds = predecessors.get(&block).cloned().unwrap_or_default();
            let mut new_set: Option<HashSet<BlockId>> = None;
            for pred in preds {
                let pred_doms = doms[&pred].clone();
                new_set = Some(match new_set {
                    None => pred_doms,
                    Some(acc) => acc.intersection(&pred_doms).copied().collect(),
                });
            }
            let mut new_set = new_set.unwrap_or_default();
            new_set.insert(block);
            if new_set != doms[&block] {
                doms.insert(block, new_set);
                changed = true;
            }
        }
    }

    doms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mir::{BasicBlock, Terminator};
    use ksc_util::index_vec::IndexVec;
    use ksc_util::{Interner, Symbol};

    fn function_with_blocks(n: usize, edges: &[(usize, usize)], entry: usize) -> Function {
        let mut interner = Interner::new();
        let name: Symbol = interner.intern("f");
        let mut blocks: IndexVec<BlockId, BasicBlock> = IndexVec::new();
        for _ in 0..n {
            blocks.push(BasicBlock::default());
        }
        for &(from, to) in edges {
            blocks[BlockId(from as u32)].terminator = Some(Terminator::Br(BlockId(to as u32)));
        }
        Function {
            name,
            param_names: vec![],
            return_type: crate::types::Type::F64,
            blocks,
            insts: IndexVec::new(),
            entry_block: Some(BlockId(entry as u32)),
        }
    }

    #[test]
    fn linear_chain_dominance() {
        // 0 -> 1 -> 2
        let func = function_with_blocks(3, &[(0, 1), (1, 2)], 0);
        let cfg = ControlFlowGraph::build(&func);
        assert!(cfg.dominates(BlockId(0), BlockId(2)));
        assert!(cfg.dominates(BlockId(1), BlockId(2)));
        assert!(!cfg.dominates(BlockId(2), BlockId(0)));
    }

    #[test]
    fn diamond_join_is_dominated_only_by_entry() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let func = function_with_blocks(4, &[(0, 1), (0, 2), (1, 3), (2, 3)], 0);
        let cfg = ControlFlowGraph::build(&func);
        assert!(cfg.dominates(BlockId(0), BlockId(3)));
        assert!(!cfg.dominates(BlockId(1), BlockId(3)));
        assert!(!cfg.dominates(BlockId(2), BlockId(3)));
    }

    #[test]
    fn unreachable_block_is_excluded_from_reachable_set() {
        let func = function_with_blocks(3, &[(0, 1)], 0);
        let cfg = ControlFlowGraph::build(&func);
        let reachable = cfg.reachable_from(BlockId(0));
        assert!(reachable.contains(&BlockId(1)));
        assert!(!reachable.contains(&BlockId(2)));
    }
}
