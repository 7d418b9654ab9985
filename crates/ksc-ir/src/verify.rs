//! The structural verifier spec §4.5 requires after lowering each
//! function: every block ends in exactly one terminator, and every
//! non-`phi` operand's definition dominates its use (spec §4.8, spec §8's
//! "Block termination" invariant). Failure is a fatal, non-recoverable
//! error for that function (spec §7's `VerifierError`).

use std::collections::HashMap;

use ksc_util::Symbol;
use thiserror::Error;

use crate::analysis::ControlFlowGraph;
use crate::mir::{BlockId, Function, Inst, InstId, Value};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("function `{function}` has no entry block")]
    NoEntryBlock { function: String },
    #[error("function `{function}` block {block:?} is not terminated")]
    UnterminatedBlock { function: String, block: BlockId },
    #[error("function `{function}` instruction {inst:?} uses a value that does not dominate its use")]
    UseNotDominated { function: String, inst: InstId },
    #[error("function `{function}` phi {inst:?} has an incoming value that does not dominate its predecessor edge")]
    PhiOperandNotDominated { function: String, inst: InstId },
}

/// Which block owns each instruction, built once per verification.
fn owners(func: &Function) -> HashMap<InstId, BlockId> {
    let mut map = HashMap::new();
    for (block_id, block) in func.blocks.iter_enumerated() {
        if block.elided {
            continue;
        }
        for &inst_id in &block.insts {
            map.insert(inst_id, block_id);
        }
    }
    map
}

pub fn verify_function(func: &Function, name: Symbol, resolve: impl Fn(Symbol) -> String) -> Result<(), VerifyError> {
    if func.is_declaration() {
        return Ok(());
    }
    let fname = resolve(name);
    let Some(_entry) = func.entry_block else {
        return Err(VerifyError::NoEntryBlock { function: fname });
    };

    for (block_id, block) in func.blocks.iter_enumerated() {
        if block.elided {
            continue;
        }
        if !block.is_terminated() {
            return Err(VerifyError::UnterminatedBlock {
                function: fname,
                block: block_id,
            });
        }
    }

    let cfg = ControlFlowGraph::build(func);
    let owner = owners(func);

    let dominates_use = |value: Value, use_block: BlockId, position_in_block: usize, insts: &[InstId]| -> bool {
        match value {
            Value::Param(_) => true,
            Value::Inst(id) => match owner.get(&id) {
                None => false,
                Some(&def_block) => {
                    if def_block == use_block {
                        insts
                            .iter()
                            .position(|&i| i == id)
                            .map(|def_pos| def_pos < position_in_block)
                            .unwrap_or(false)
                    } else {
                        cfg.dominates(def_block, use_block)
                    }
                }
            },
        }
    };

    for (block_id, block) in func.blocks.iter_enumerated() {
        if block.elided {
            continue;
        }
        for (position, &inst_id) in block.insts.iter().enumerate() {
            let operands = operand_values(&func.insts[inst_id]);
            for value in operands {
                if !dominates_use(value, block_id, position, &block.insts) {
                    return Err(VerifyError::UseNotDominated {
                        function: fname,
                        inst: inst_id,
                    });
                }
            }
        }
        if let Some(term) = &block.terminator {
            for value in terminator_operand(term) {
                // The terminator is logically "after" every instruction in
                // its own block - reuse the same in-block check with the
                // block's full length as position.
                if !dominates_use(value, block_id, block.insts.len(), &block.insts) {
                    return Err(VerifyError::UseNotDominated {
                        function: fname,
                        inst: block.insts.last().copied().unwrap_or(InstId(0)),
                    });
                }
            }
        }
    }

    // A phi's operands are exempt from the general "defined earlier in the
    // same block, or in a dominating block" rule above - that is the whole
    // point of a phi at a merge point. But each individual incoming value
    // still has to dominate the *predecessor edge* it is attached to: by
    // the time control reaches the end of that predecessor and branches to
    // the phi's block, the incoming value must already have been computed
    // along that path. Without this check, an optimization pass (e.g. GVN)
    // could alias two sibling branches' independent computations together
    // and the general check's phi exemption would never catch it.
    for (block_id, block) in func.blocks.iter_enumerated() {
        if block.elided {
            continue;
        }
        for &inst_id in &block.insts {
            let Inst::Phi(incoming) = &func.insts[inst_id] else {
                continue;
            };
            for &(value, pred) in incoming {
                if !phi_operand_dominates(value, pred, &owner, &cfg) {
                    return Err(VerifyError::PhiOperandNotDominated {
                        function: fname,
                        inst: inst_id,
                    });
                }
            }
        }
    }

    Ok(())
}

/// `value`'s definition dominates `pred` (the predecessor block the phi's
/// incoming edge comes from) - either `value` is a parameter (defined at
/// function entry, dominates everything), or it's defined in `pred` itself,
/// or its defining block dominates `pred`.
fn phi_operand_dominates(
    value: Value,
    pred: BlockId,
    owner: &HashMap<InstId, BlockId>,
    cfg: &ControlFlowGraph,
) -> bool {
    match value {
        Value::Param(_) => true,
        Value::Inst(id) => match owner.get(&id) {
            None => false,
            Some(&def_block) => def_block == pred || cfg.dominates(def_block, pred),
        },
    }
}

fn operand_values(inst: &Inst) -> Vec<Value> {
    match inst {
        Inst::ConstF64(_) | Inst::Alloca => vec![],
        Inst::Load(slot) => vec![*slot],
        Inst::Store(slot, value) => vec![*slot, *value],
        Inst::FAdd(a, b) | Inst::FSub(a, b) | Inst::FMul(a, b) | Inst::FCmpULT(a, b) => vec![*a, *b],
        Inst::UIToFP(v) | Inst::FPToSI(v) => vec![*v],
        Inst::Call(_, args) => args.clone(),
        // Phi operands are checked against the predecessor edge they are
        // attached to, not the phi's own block - see the loop above, which
        // only ever calls `operand_values` for the block the instruction
        // physically lives in. A phi is exempt from the general rule (spec
        // §4.8) because its value legitimately "arrives" from a
        // predecessor that does not dominate the phi's own block (that is
        // the entire point of a phi at a merge point).
        Inst::Phi(_) => vec![],
    }
}

fn terminator_operand(term: &crate::mir::Terminator) -> Vec<Value> {
    match term {
        crate::mir::Terminator::Ret(Some(v)) => vec![*v],
        crate::mir::Terminator::Ret(None) => vec![],
        crate::mir::Terminator::Br(_) => vec![],
        crate::mir::Terminator::CondBr { cond, .. } => vec![*cond],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IrBuilder, ModuleBuilder};
    use crate::types::Type;
    use ksc_util::Interner;

    #[test]
    fn well_formed_function_verifies() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        let c = b.build_const_f64(1.0);
        b.build_ret(Some(c));
        let module = b.into_module();
        let func = module.function(name).unwrap();
        assert!(verify_function(func, name, |s| interner.resolve(s).to_string()).is_ok());
    }

    #[test]
    fn unterminated_block_fails_verification() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("f");
        let func_id = b.declare_function(name, vec![], Type::F64);
        let entry = b.append_block(func_id);
        b.position_at_end(func_id, entry);
        b.build_const_f64(1.0);
        let module = b.into_module();
        let func = module.function(name).unwrap();
        assert!(matches!(
            verify_function(func, name, |s| interner.resolve(s).to_string()),
            Err(VerifyError::UnterminatedBlock { .. })
        ));
    }

    #[test]
    fn declaration_without_blocks_verifies_trivially() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("extern_fn");
        b.declare_function(name, vec![interner.intern("x")], Type::F64);
        let module = b.into_module();
        let func = module.function(name).unwrap();
        assert!(verify_function(func, name, |s| interner.resolve(s).to_string()).is_ok());
    }
}
