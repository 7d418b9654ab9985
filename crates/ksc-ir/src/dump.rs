//! The textual IR dump spec §6 requires: "function signatures with return
//! type and parameter types, basic-block labels, instruction mnemonics
//! listed in §4.5, and constants in decimal floating form." Stable enough
//! for golden tests, not meant to be a parseable or LLVM-compatible
//! format - the concrete textual/binary form a real assembler would emit
//! is a downstream collaborator's concern (spec §1).

use ksc_util::Interner;

use crate::mir::{BlockId, Function, Inst, Module, Terminator, Value};

pub fn dump_module(module: &Module, interner: &Interner) -> String {
    let mut out = String::new();
    for (_, func) in module.iter() {
        dump_function(&mut out, func, module, interner);
    }
    out
}

fn dump_function(out: &mut String, func: &Function, module: &Module, interner: &Interner) {
    let name = interner.resolve(func.name);

    if func.is_declaration() {
        let param_types = vec!["double"; func.arity()].join(", ");
        out.push_str(&format!(
            "declare {} @{}({})\n\n",
            func.return_type, name, param_types
        ));
        return;
    }

    let params = func
        .param_names
        .iter()
        .map(|p| format!("double %{}", interner.resolve(*p)))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!(
        "define {} @{}({}) {{\n",
        func.return_type, name, params
    ));

    for (block_id, block) in func.blocks.iter_enumerated() {
        if block.elided {
            continue;
        }
        out.push_str(&format!("bb{}:\n", block_id.0));
        for &inst_id in &block.insts {
            let inst = &func.insts[inst_id];
            match render_inst(inst_id, inst, module, interner) {
                Rendered::Assigned(text) => out.push_str(&format!("  %{} = {}\n", inst_id.0, text)),
                Rendered::Bare(text) => out.push_str(&format!("  {}\n", text)),
            }
        }
        if let Some(term) = &block.terminator {
            out.push_str(&format!("  {}\n", render_terminator(term, func)));
        }
    }

    out.push_str("}\n\n");
}

enum Rendered {
    Assigned(String),
    Bare(String),
}

fn value(v: Value) -> String {
    match v {
        Value::Param(i) => format!("%arg{i}"),
        Value::Inst(id) => format!("%{}", id.0),
    }
}

fn float_literal(v: f64) -> String {
    // `{:?}` always includes a decimal point for `f64` (e.g. `1.0`,
    // `3.14`, `-0.5`), matching spec §6's "constants in decimal floating
    // form" - `{}` alone would print `1` for `1.0`.
    format!("{v:?}")
}

fn render_inst(id: crate::mir::InstId, inst: &Inst, module: &Module, interner: &Interner) -> Rendered {
    let _ = id;
    match inst {
        Inst::ConstF64(v) => Rendered::Assigned(format!("const double {}", float_literal(*v))),
        Inst::Alloca => Rendered::Assigned("alloca double".to_string()),
        Inst::Load(slot) => Rendered::Assigned(format!("load double, double* {}", value(*slot))),
        Inst::Store(slot, v) => {
            Rendered::Bare(format!("store double {}, double* {}", value(*v), value(*slot)))
        }
        Inst::FAdd(a, b) => Rendered::Assigned(format!("fadd double {}, {}", value(*a), value(*b))),
        Inst::FSub(a, b) => Rendered::Assigned(format!("fsub double {}, {}", value(*a), value(*b))),
        Inst::FMul(a, b) => Rendered::Assigned(format!("fmul double {}, {}", value(*a), value(*b))),
        Inst::FCmpULT(a, b) => {
            Rendered::Assigned(format!("fcmp-ult double {}, {}", value(*a), value(*b)))
        }
        Inst::UIToFP(v) => Rendered::Assigned(format!("uitofp {} to double", value(*v))),
        Inst::FPToSI(v) => Rendered::Assigned(format!("fptosi {} to i32", value(*v))),
        Inst::Call(callee, args) => {
            let callee_fn = module.get(*callee);
            let callee_name = interner.resolve(callee_fn.name);
            let args = args.iter().map(|a| value(*a)).collect::<Vec<_>>().join(", ");
            Rendered::Assigned(format!("call double @{callee_name}({args})"))
        }
        Inst::Phi(incoming) => {
            let entries = incoming
                .iter()
                .map(|(v, block)| format!("[ {}, %bb{} ]", value(*v), block_num(*block)))
                .collect::<Vec<_>>()
                .join(", ");
            Rendered::Assigned(format!("phi double {entries}"))
        }
    }
}

fn block_num(b: BlockId) -> u32 {
    b.0
}

fn render_terminator(term: &Terminator, func: &Function) -> String {
    match term {
        Terminator::Ret(Some(v)) => format!("ret {} {}", func.return_type, value(*v)),
        Terminator::Ret(None) => "ret void".to_string(),
        Terminator::Br(target) => format!("br label %bb{}", block_num(*target)),
        Terminator::CondBr {
            cond,
            then_block,
            else_block,
        } => format!(
            "condbr {}, label %bb{}, label %bb{}",
            value(*cond),
            block_num(*then_block),
            block_num(*else_block)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IrBuilder, ModuleBuilder};
    use crate::types::Type;
    use ksc_util::Interner;

    #[test]
    fn dump_contains_signature_and_mnemonics() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();

        let foo_name = interner.intern("foo");
        let a = interner.intern("a");
        let bfield = interner.intern("b");
        let foo = b.declare_function(foo_name, vec![a, bfield], Type::F64);
        let entry = b.append_block(foo);
        b.position_at_end(foo, entry);
        let two = b.build_const_f64(2.0);
        let three = b.build_const_f64(3.0);
        let mul = b.build_fmul(two, three);
        let one = b.build_const_f64(1.0);
        let sum = b.build_fadd(one, mul);
        b.build_ret(Some(sum));

        let main_name = interner.intern("main");
        let main = b.declare_function(main_name, vec![], Type::I32);
        let main_entry = b.append_block(main);
        b.position_at_end(main, main_entry);
        let one_c = b.build_const_f64(1.0);
        let two_c = b.build_const_f64(2.0);
        let call = b.build_call(foo, vec![one_c, two_c]);
        let narrowed = b.build_fptosi(call);
        b.build_ret(Some(narrowed));

        let module = b.into_module();
        let text = dump_module(&module, &interner);

        assert!(text.contains("define double @foo(double %a, double %b)"));
        assert!(text.contains("define i32 @main()"));
        assert!(text.contains("fmul double"));
        assert!(text.contains("fadd double"));
        assert!(text.contains("call double @foo"));
        assert!(text.contains("fptosi"));
        assert_eq!(text.matches("define double @foo").count(), 1);
        assert_eq!(text.matches("define i32 @main").count(), 1);
    }

    #[test]
    fn declaration_dumps_without_a_body() {
        let mut interner = Interner::new();
        let mut b = ModuleBuilder::new();
        let name = interner.intern("bar");
        let x = interner.intern("a");
        let y = interner.intern("b");
        b.declare_function(name, vec![x, y], Type::F64);
        let module = b.into_module();
        let text = dump_module(&module, &interner);
        assert!(text.contains("declare double @bar(double, double)"));
        assert!(!text.contains("{"));
    }
}
