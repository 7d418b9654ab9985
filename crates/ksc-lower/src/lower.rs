//! The `Lowerer` itself (spec §4.4): an [`ksc_par::Visitor`] implementation
//! that drives an [`IrBuilder`] one expression at a time, plus
//! [`lower_program`], which walks a parsed unit's top-level items and feeds
//! each to it.

use ksc_ir::{FunctionId, IrBuilder, Type, Value};
use ksc_par::ast::{Expr, Extern, Function as AstFunction, Item, LetBinding};
use ksc_par::Visitor;
use ksc_util::{Interner, Span, Symbol};

use crate::error::LowerError;
use crate::scope::Scope;

/// The result of lowering a whole parsed unit: every error encountered,
/// in the order its owning item appears (spec §7 - a failed item does not
/// stop its siblings from lowering).
#[derive(Debug, Default)]
pub struct LoweredProgram {
    pub errors: Vec<LowerError>,
}

impl LoweredProgram {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lower every item in `items` into `builder`, in order. A `Function` whose
/// body fails to lower is removed from the module (spec §7); an `Extern` or
/// a bare top-level `Expr` is unaffected by its siblings' failures either
/// way, since each only ever touches its own function.
///
/// Takes the interner mutably: a bare top-level expression has to mint a
/// name for the anonymous function it is wrapped in (spec §3), and nothing
/// in the parsed text ever reserved one.
pub fn lower_program<B: IrBuilder>(items: &[Item], interner: &mut Interner, builder: &mut B) -> LoweredProgram {
    let mut errors = Vec::new();
    let mut anon_counter: u32 = 0;

    for item in items {
        match item {
            Item::Function(function) => {
                if let Err(err) = lower_function(function, interner, builder) {
                    errors.push(err);
                }
            }
            Item::Extern(extern_item) => {
                lower_extern(extern_item, interner, builder);
            }
            Item::Expr(expr) => {
                if let Err(err) = lower_anonymous_expr(expr, interner, builder, &mut anon_counter) {
                    errors.push(err);
                }
            }
            Item::Error(message) => {
                errors.push(LowerError::SourceError {
                    message: message.clone(),
                    span: Span::DUMMY,
                });
            }
        }
    }

    LoweredProgram { errors }
}

fn lower_extern<B: IrBuilder>(extern_item: &Extern, interner: &Interner, builder: &mut B) {
    let proto = &extern_item.proto;
    let return_type = if is_main(interner, proto.name) { Type::I32 } else { Type::F64 };
    builder.declare_function(proto.name, proto.params.clone(), return_type);
}

/// `main` is the only name this core ever returns `i32` for (spec §4.4's
/// `Prototype` rule); resolving that by spelling means `ksc-lower` never
/// needs its own notion of an entry point beyond "whatever is named
/// `main`".
fn is_main(interner: &Interner, name: Symbol) -> bool {
    interner.resolve(name) == "main"
}

fn lower_function<B: IrBuilder>(function: &AstFunction, interner: &Interner, builder: &mut B) -> Result<(), LowerError> {
    let proto = &function.proto;

    if let Some(existing) = builder.lookup_function(proto.name) {
        if !builder.function_is_declaration(existing) {
            return Err(LowerError::AlreadyDefined {
                name: interner.resolve(proto.name).to_string(),
                span: function.span,
            });
        }
    }

    let return_type = if is_main(interner, proto.name) { Type::I32 } else { Type::F64 };
    let func_id = builder.declare_function(proto.name, proto.params.clone(), return_type);
    let entry = builder.append_block(func_id);
    builder.position_at_end(func_id, entry);

    let mut scope = Scope::new();
    for (index, &param_name) in proto.params.iter().enumerate() {
        let slot = builder.build_alloca();
        let incoming = builder.build_param(index as u32);
        builder.build_store(slot, incoming);
        scope.bind(param_name, slot);
    }

    let mut lowerer = Lowerer {
        builder: &mut *builder,
        interner,
        scope,
        current_function: func_id,
    };
    let lowered = lowerer.visit_expr(&function.body);

    match lowered {
        Ok(value) => {
            let ret_value = if return_type == Type::I32 {
                lowerer.builder.build_fptosi(value)
            } else {
                value
            };
            if !lowerer.builder.is_terminated() {
                lowerer.builder.build_ret(Some(ret_value));
            }
            Ok(())
        }
        Err(err) => {
            builder.remove_function(func_id);
            Err(err)
        }
    }
}

/// A bare top-level expression is wrapped in a synthesized nullary
/// function, per spec §3's "wrapped as an anonymous function by
/// convention" - the one place this core invents a name the source text
/// never wrote.
fn lower_anonymous_expr<B: IrBuilder>(
    expr: &Expr,
    interner: &mut Interner,
    builder: &mut B,
    counter: &mut u32,
) -> Result<(), LowerError> {
    let name_text = format!("__anon_expr${}", counter);
    *counter += 1;

    // The anonymous wrapper's name can never collide with a source-level
    // `AlreadyDefined` check, since no parsed item can have typed its
    // dollar sign; still interned through the one real `Interner` so a
    // later `resolve` call on it works like any other symbol's would.
    let name = interner.intern(&name_text);

    let func_id = builder.declare_function(name, vec![], Type::F64);
    let entry = builder.append_block(func_id);
    builder.position_at_end(func_id, entry);

    let mut lowerer = Lowerer {
        builder,
        interner: &*interner,
        scope: Scope::new(),
        current_function: func_id,
    };
    let lowered = lowerer.visit_expr(expr);

    match lowered {
        Ok(value) => {
            if !lowerer.builder.is_terminated() {
                lowerer.builder.build_ret(Some(value));
            }
            Ok(())
        }
        Err(err) => {
            let builder = lowerer.builder;
            builder.remove_function(func_id);
            Err(err)
        }
    }
}

struct Lowerer<'b, 'i, B: IrBuilder> {
    builder: &'b mut B,
    interner: &'i Interner,
    scope: Scope,
    current_function: FunctionId,
}

impl<'b, 'i, B: IrBuilder> Lowerer<'b, 'i, B> {
    /// `cond != 0.0`, expressed with the instruction set spec §4.5 actually
    /// grants us (no dedicated not-equal comparison): `cond * cond` is
    /// never negative and is zero only when `cond` is, so `0.0 < cond*cond`
    /// is exactly the truth this core needs for `if`/`for`.
    fn nonzero_test(&mut self, value: Value) -> Value {
        let squared = self.builder.build_fmul(value, value);
        let zero = self.builder.build_const_f64(0.0);
        self.builder.build_fcmp_ult(zero, squared)
    }

    fn resolve_and_call(&mut self, name: Symbol, args: Vec<Value>, span: Span) -> Result<Value, LowerError> {
        let Some(callee) = self.builder.lookup_function(name) else {
            return Err(LowerError::UnknownFunction {
                name: self.interner.resolve(name).to_string(),
                span,
            });
        };
        let expected = self.builder.function_arity(callee);
        if expected != args.len() {
            return Err(LowerError::ArityMismatch {
                name: self.interner.resolve(name).to_string(),
                expected,
                got: args.len(),
                span,
            });
        }
        Ok(self.builder.build_call(callee, args))
    }
}

impl<'b, 'i, B: IrBuilder> Visitor for Lowerer<'b, 'i, B> {
    type Output = Result<Value, LowerError>;

    fn visit_variable(&mut self, name: Symbol, span: Span) -> Self::Output {
        match self.scope.lookup(name) {
            Some(slot) => Ok(self.builder.build_load(slot)),
            None => Err(LowerError::UnknownSymbol {
                name: self.interner.resolve(name).to_string(),
                span,
            }),
        }
    }

    fn visit_literal(&mut self, value: f64, _span: Span) -> Self::Output {
        Ok(self.builder.build_const_f64(value))
    }

    fn visit_unary(&mut self, op: Symbol, operand: &Expr, span: Span) -> Self::Output {
        let operand_value = self.visit_expr(operand)?;
        self.resolve_and_call(op, vec![operand_value], span)
    }

    fn visit_binary(&mut self, op: Symbol, lhs: &Expr, rhs: &Expr, span: Span) -> Self::Output {
        if self.interner.resolve(op) == "=" {
            return self.lower_assignment(lhs, rhs, span);
        }

        let lhs_value = self.visit_expr(lhs)?;
        let rhs_value = self.visit_expr(rhs)?;

        match self.interner.resolve(op) {
            "+" => Ok(self.builder.build_fadd(lhs_value, rhs_value)),
            "-" => Ok(self.builder.build_fsub(lhs_value, rhs_value)),
            "*" => Ok(self.builder.build_fmul(lhs_value, rhs_value)),
            "<" => {
                let cmp = self.builder.build_fcmp_ult(lhs_value, rhs_value);
                Ok(self.builder.build_uitofp(cmp))
            }
            _ => self.resolve_and_call(op, vec![lhs_value, rhs_value], span),
        }
    }

    fn visit_call(&mut self, callee: Symbol, args: &[Expr], span: Span) -> Self::Output {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.visit_expr(arg)?);
        }
        self.resolve_and_call(callee, arg_values, span)
    }

    fn visit_conditional(&mut self, cond: &Expr, then_arm: &Expr, else_arm: &Expr, _span: Span) -> Self::Output {
        let cond_value = self.visit_expr(cond)?;
        let test = self.nonzero_test(cond_value);

        let function = self.current_function;
        let then_block = self.builder.append_block(function);
        let else_block = self.builder.append_block(function);
        let join_block = self.builder.append_block(function);

        self.builder.build_condbr(test, then_block, else_block);

        self.builder.position_at_end(function, then_block);
        let then_value = self.visit_expr(then_arm)?;
        let then_end = self.builder.current_block();
        if !self.builder.is_terminated() {
            self.builder.build_br(join_block);
        }

        self.builder.position_at_end(function, else_block);
        let else_value = self.visit_expr(else_arm)?;
        let else_end = self.builder.current_block();
        if !self.builder.is_terminated() {
            self.builder.build_br(join_block);
        }

        self.builder.position_at_end(function, join_block);
        Ok(self.builder.build_phi(vec![(then_value, then_end), (else_value, else_end)]))
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_for(
        &mut self,
        induction_name: Symbol,
        init: &Expr,
        cond: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        _span: Span,
    ) -> Self::Output {
        let function = self.current_function;

        let init_value = self.visit_expr(init)?;
        let slot = self.builder.build_alloca();
        self.builder.build_store(slot, init_value);

        let loop_block = self.builder.append_block(function);
        self.builder.build_br(loop_block);
        self.builder.position_at_end(function, loop_block);

        self.scope.push_frame();
        self.scope.bind(induction_name, slot);

        let result = self.lower_for_body(slot, cond, step, body, loop_block, function);

        self.scope.pop_frame();
        result
    }

    fn visit_let(&mut self, bindings: &[LetBinding], body: &Expr, _span: Span) -> Self::Output {
        self.scope.push_frame();

        for binding in bindings {
            let init_value = match &binding.init {
                Some(init) => match self.visit_expr(init) {
                    Ok(value) => value,
                    Err(err) => {
                        self.scope.pop_frame();
                        return Err(err);
                    }
                },
                None => self.builder.build_const_f64(0.0),
            };
            let slot = self.builder.build_alloca();
            self.builder.build_store(slot, init_value);
            self.scope.bind(binding.name, slot);
        }

        let result = self.visit_expr(body);
        self.scope.pop_frame();
        result
    }

    fn visit_error(&mut self, message: &str, span: Span) -> Self::Output {
        Err(LowerError::SourceError {
            message: message.to_string(),
            span,
        })
    }
}

impl<'b, 'i, B: IrBuilder> Lowerer<'b, 'i, B> {
    fn lower_assignment(&mut self, lhs: &Expr, rhs: &Expr, span: Span) -> Result<Value, LowerError> {
        let Expr::Variable(name, var_span) = lhs else {
            return Err(LowerError::BadAssignment { span });
        };
        let Some(slot) = self.scope.lookup(*name) else {
            return Err(LowerError::UnknownSymbol {
                name: self.interner.resolve(*name).to_string(),
                span: *var_span,
            });
        };
        let rhs_value = self.visit_expr(rhs)?;
        self.builder.build_store(slot, rhs_value);
        Ok(rhs_value)
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_for_body(
        &mut self,
        slot: Value,
        cond: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        loop_block: ksc_ir::BlockId,
        function: FunctionId,
    ) -> Result<Value, LowerError> {
        self.visit_expr(body)?;

        let step_value = match step {
            Some(step_expr) => self.visit_expr(step_expr)?,
            None => self.builder.build_const_f64(1.0),
        };
        let current = self.builder.build_load(slot);
        let next = self.builder.build_fadd(current, step_value);
        self.builder.build_store(slot, next);

        let cond_value = self.visit_expr(cond)?;
        let test = self.nonzero_test(cond_value);

        let after_block = self.builder.append_block(function);
        self.builder.build_condbr(test, loop_block, after_block);
        self.builder.position_at_end(function, after_block);

        Ok(self.builder.build_const_f64(0.0))
    }
}
