//! The AST (spec §3): a closed sum type, each node owning its children.
//!
//! `Expr` covers everything that produces a value; `Item` covers the
//! top-level forms a source file is made of. There is no separate statement
//! hierarchy - the "Fax" donor language's `Item`/`Stmt`/`Expr`/`Type` split
//! does not apply here, since this surface language has exactly one type
//! (`f64`) and no statements that are not also expressions.

use ksc_util::{Span, Symbol};

/// A function (or operator) signature: name, declared parameters.
#[derive(Debug, Clone)]
pub struct Prototype {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    /// `Some(n)` when this prototype declares a user operator at
    /// precedence `n` (`def operator SPELLING n(...)` /
    /// `extern operator SPELLING n(...)`); `None` for an ordinary
    /// function name.
    pub operator_precedence: Option<i64>,
    pub span: Span,
}

impl Prototype {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A top-level form.
#[derive(Debug, Clone)]
pub enum Item {
    Function(Function),
    Extern(Extern),
    /// A bare top-level expression - the host test fixtures evaluate these
    /// directly (spec §3); `ksc` wraps none of them implicitly.
    Expr(Expr),
    /// The lexer or parser could not produce a well-formed item; carries a
    /// human-readable message (spec §4.3's "fail the whole unit" policy).
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub proto: Prototype,
    pub body: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Extern {
    pub proto: Prototype,
    pub span: Span,
}

/// One `let` binding: a name with an optional initializer.
#[derive(Debug, Clone)]
pub struct LetBinding {
    pub name: Symbol,
    pub init: Option<Expr>,
}

/// Everything that produces an `f64` value.
#[derive(Debug, Clone)]
pub enum Expr {
    Variable(Symbol, Span),
    Literal(f64, Span),
    UnaryExpr {
        op: Symbol,
        operand: Box<Expr>,
        span: Span,
    },
    BinExpr {
        op: Symbol,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    CallExpr {
        callee: Symbol,
        args: Vec<Expr>,
        span: Span,
    },
    ConditionalExpr {
        cond: Box<Expr>,
        then_arm: Box<Expr>,
        else_arm: Box<Expr>,
        span: Span,
    },
    ForExpr {
        induction_name: Symbol,
        init: Box<Expr>,
        cond: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
        span: Span,
    },
    LetExpr {
        bindings: Vec<LetBinding>,
        body: Box<Expr>,
        span: Span,
    },
    /// A malformed production that still needs a placeholder node so the
    /// parent production can keep a `Box<Expr>` field (§4.3: a failed
    /// sub-production yields a null node the caller propagates upward).
    Error(String, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Variable(_, span)
            | Expr::Literal(_, span)
            | Expr::UnaryExpr { span, .. }
            | Expr::BinExpr { span, .. }
            | Expr::CallExpr { span, .. }
            | Expr::ConditionalExpr { span, .. }
            | Expr::ForExpr { span, .. }
            | Expr::LetExpr { span, .. }
            | Expr::Error(_, span) => *span,
        }
    }
}
