//! Open recursion over the closed AST (spec §9: "a sum-typed AST with an
//! operation dispatched by tag match" in place of the donor's
//! double-dispatch visitor).
//!
//! `ksc-lower` is the one real implementor: each `visit_*` method lowers its
//! node and returns the `Value` it produces. The default body of `visit_expr`
//! just dispatches on the tag, so an implementor only needs to override the
//! variants it cares about - in practice, all of them, since lowering gives
//! every variant distinct behavior.

use crate::ast::Expr;

pub trait Visitor {
    type Output;

    fn visit_expr(&mut self, expr: &Expr) -> Self::Output {
        match expr {
            Expr::Variable(name, span) => self.visit_variable(*name, *span),
            Expr::Literal(value, span) => self.visit_literal(*value, *span),
            Expr::UnaryExpr { op, operand, span } => self.visit_unary(*op, operand, *span),
            Expr::BinExpr { op, lhs, rhs, span } => self.visit_binary(*op, lhs, rhs, *span),
            Expr::CallExpr { callee, args, span } => self.visit_call(*callee, args, *span),
            Expr::ConditionalExpr {
                cond,
                then_arm,
                else_arm,
                span,
            } => self.visit_conditional(cond, then_arm, else_arm, *span),
            Expr::ForExpr {
                induction_name,
                init,
                cond,
                step,
                body,
                span,
            } => self.visit_for(*induction_name, init, cond, step.as_deref(), body, *span),
            Expr::LetExpr {
                bindings,
                body,
                span,
            } => self.visit_let(bindings, body, *span),
            Expr::Error(message, span) => self.visit_error(message, *span),
        }
    }

    fn visit_variable(&mut self, name: ksc_util::Symbol, span: ksc_util::Span) -> Self::Output;
    fn visit_literal(&mut self, value: f64, span: ksc_util::Span) -> Self::Output;
    fn visit_unary(
        &mut self,
        op: ksc_util::Symbol,
        operand: &Expr,
        span: ksc_util::Span,
    ) -> Self::Output;
    fn visit_binary(
        &mut self,
        op: ksc_util::Symbol,
        lhs: &Expr,
        rhs: &Expr,
        span: ksc_util::Span,
    ) -> Self::Output;
    fn visit_call(
        &mut self,
        callee: ksc_util::Symbol,
        args: &[Expr],
        span: ksc_util::Span,
    ) -> Self::Output;
    fn visit_conditional(
        &mut self,
        cond: &Expr,
        then_arm: &Expr,
        else_arm: &Expr,
        span: ksc_util::Span,
    ) -> Self::Output;
    #[allow(clippy::too_many_arguments)]
    fn visit_for(
        &mut self,
        induction_name: ksc_util::Symbol,
        init: &Expr,
        cond: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        span: ksc_util::Span,
    ) -> Self::Output;
    fn visit_let(
        &mut self,
        bindings: &[crate::ast::LetBinding],
        body: &Expr,
        span: ksc_util::Span,
    ) -> Self::Output;
    fn visit_error(&mut self, message: &str, span: ksc_util::Span) -> Self::Output;
}
