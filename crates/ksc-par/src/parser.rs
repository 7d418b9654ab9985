//! The recursive-descent, Pratt-precedence parser (spec §4.3).
//!
//! `Parser` drives a `Lexer` directly - one token of lookahead at a time -
//! rather than pre-tokenizing into a `Vec<Token>`; spec §4.1 already
//! establishes that one-token lookahead is all the grammar ever needs, so
//! buffering the whole token stream up front would just be wasted memory.

use ksc_lex::{Lexer, Token};
use ksc_util::{Diagnostic, Handler, Interner, Span, Symbol};

use crate::ast::{Expr, Extern, Function, Item, LetBinding, Prototype};
use crate::error::ParseError;
use crate::optable::OperatorTable;

pub struct Parser<'src, 'intern> {
    lexer: Lexer<'src, 'intern>,
    optable: OperatorTable,
    handler: Handler,
}

impl<'src, 'intern> Parser<'src, 'intern> {
    pub fn new(source: &'src str, interner: &'intern mut Interner) -> Self {
        let optable = OperatorTable::new(interner);
        let lexer = Lexer::new(source, interner);
        Self {
            lexer,
            optable,
            handler: Handler::new(),
        }
    }

    /// Parse every top-level form, returning it alongside the diagnostics
    /// accumulated along the way (spec §4.3's "fail the whole unit" policy:
    /// on any failure the forest is discarded down to a single `Error`
    /// item).
    pub fn parse_program(mut self) -> (Vec<Item>, Handler) {
        let mut items = Vec::new();
        loop {
            match self.current() {
                Token::Empty => break,
                Token::Invalid(message) => {
                    self.handler.report(Diagnostic::lex_error(message.clone(), self.span()));
                    items.clear();
                    items.push(Item::Error(message));
                    break;
                }
                Token::Def => {
                    if let Some(function) = self.parse_function() {
                        items.push(Item::Function(function));
                    } else {
                        items.clear();
                        items.push(Item::Error(self.failure_message()));
                        break;
                    }
                }
                Token::Extern => {
                    if let Some(ext) = self.parse_extern() {
                        items.push(Item::Extern(ext));
                    } else {
                        items.clear();
                        items.push(Item::Error(self.failure_message()));
                        break;
                    }
                }
                _ => {
                    if let Some(expr) = self.parse_expr() {
                        items.push(Item::Expr(expr));
                    } else {
                        items.clear();
                        items.push(Item::Error(self.failure_message()));
                        break;
                    }
                }
            }
        }
        (items, self.handler)
    }

    fn failure_message(&self) -> String {
        self.handler
            .first_error()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "parse error".to_string())
    }

    // -- token-stream helpers -------------------------------------------

    fn current(&self) -> Token {
        self.lexer.current().clone()
    }

    fn span(&self) -> Span {
        self.lexer.span()
    }

    fn advance(&mut self) {
        self.lexer.next();
    }

    fn eat_punct(&mut self, c: u8) -> bool {
        if matches!(self.current(), Token::Punct(b) if b == c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: u8, what: &'static str) -> Option<()> {
        if self.eat_punct(c) {
            Some(())
        } else {
            self.error(ParseError::Expected {
                expected: what,
                span: self.span(),
            });
            None
        }
    }

    fn error(&mut self, err: ParseError) {
        self.handler.report(Diagnostic::error(err.to_string(), err.span()));
    }

    /// If the current token could name an infix/prefix operator (a
    /// single-byte `Punct`, interned on the fly, or an `Identifier` whose
    /// text happens to match a declared operator spelling), return its
    /// symbol. Spec §4.3 step 1: "form its spelling (single-byte string
    /// for `Punct`, name for `Identifier`)".
    fn current_operator_symbol(&mut self) -> Option<Symbol> {
        match self.current() {
            Token::Punct(b) => {
                let spelling = (b as char).to_string();
                Some(self.lexer.interner_mut().intern(&spelling))
            }
            Token::Identifier(sym) => Some(sym),
            _ => None,
        }
    }

    // -- items ------------------------------------------------------------

    fn parse_prototype(&mut self) -> Option<Prototype> {
        let start = self.span();
        let (name, operator_precedence) = match self.current() {
            Token::Identifier(sym) => {
                self.advance();
                (sym, None)
            }
            Token::Operator(sym) => {
                self.advance();
                if let Token::Number(n) = self.current() {
                    self.advance();
                    let precedence = n as i64;
                    self.optable.install(sym, precedence);
                    (sym, Some(precedence))
                } else {
                    self.optable.install_prefix(sym);
                    (sym, None)
                }
            }
            _ => {
                self.error(ParseError::UnexpectedToken {
                    message: "expected a function name or operator declaration".to_string(),
                    span: self.span(),
                });
                return None;
            }
        };

        self.expect_punct(b'(', "(")?;
        let mut params = Vec::new();
        if let Token::Identifier(p) = self.current() {
            params.push(p);
            self.advance();
            while self.eat_punct(b',') {
                match self.current() {
                    Token::Identifier(p) => {
                        params.push(p);
                        self.advance();
                    }
                    _ => {
                        self.error(ParseError::Expected {
                            expected: "identifier",
                            span: self.span(),
                        });
                        return None;
                    }
                }
            }
        }
        for (i, p) in params.iter().enumerate() {
            if params[..i].contains(p) {
                self.error(ParseError::DuplicateParam { span: self.span() });
                return None;
            }
        }
        self.expect_punct(b')', ")")?;
        let end = self.span();
        Some(Prototype {
            name,
            params,
            operator_precedence,
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_function(&mut self) -> Option<Function> {
        let start = self.span();
        self.advance(); // 'def'
        let proto = self.parse_prototype()?;
        let body = self.parse_expr()?;
        let end = body.span();
        Some(Function {
            proto,
            body: Box::new(body),
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_extern(&mut self) -> Option<Extern> {
        let start = self.span();
        self.advance(); // 'extern'
        let proto = self.parse_prototype()?;
        let end = proto.span;
        Some(Extern {
            span: Span::new(start.start, end.end),
            proto,
        })
    }

    // -- expressions --------------------------------------------------------

    pub fn parse_expr(&mut self) -> Option<Expr> {
        let lhs = self.parse_unary()?;
        self.parse_bin_rhs(0, lhs)
    }

    fn parse_bin_rhs(&mut self, min_prec: i64, mut lhs: Expr) -> Option<Expr> {
        loop {
            let Some(op) = self.current_operator_symbol() else {
                return Some(lhs);
            };
            let Some(prec) = self.optable.lookup(op) else {
                return Some(lhs);
            };
            if prec < min_prec {
                return Some(lhs);
            }
            self.advance();

            let mut rhs = self.parse_unary()?;

            if let Some(next_op) = self.current_operator_symbol() {
                if let Some(next_prec) = self.optable.lookup(next_op) {
                    if next_prec > prec {
                        rhs = self.parse_bin_rhs(prec + 1, rhs)?;
                    }
                }
            }

            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::BinExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        match self.current() {
            Token::Punct(c) if c != b'(' => {
                let start = self.span();
                self.advance();
                let op = self.lexer.interner_mut().intern(&(c as char).to_string());
                let operand = self.parse_unary()?;
                let span = Span::new(start.start, operand.span().end);
                Some(Expr::UnaryExpr {
                    op,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.current() {
            Token::Punct(b'(') => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(b')', ")")?;
                Some(inner)
            }
            Token::Number(value) => {
                let span = self.span();
                self.advance();
                Some(Expr::Literal(value, span))
            }
            Token::Identifier(name) => {
                let start = self.span();
                self.advance();
                if self.eat_punct(b'(') {
                    let mut args = Vec::new();
                    if !matches!(self.current(), Token::Punct(b')')) {
                        args.push(self.parse_expr()?);
                        while self.eat_punct(b',') {
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect_punct(b')', ")")?;
                    let end = self.span();
                    Some(Expr::CallExpr {
                        callee: name,
                        args,
                        span: Span::new(start.start, end.end),
                    })
                } else {
                    Some(Expr::Variable(name, start))
                }
            }
            Token::If => self.parse_conditional(),
            Token::For => self.parse_for(),
            Token::Let => self.parse_let(),
            Token::Invalid(message) => {
                self.handler.report(Diagnostic::lex_error(message.clone(), self.span()));
                None
            }
            _ => {
                self.error(ParseError::UnexpectedToken {
                    message: "expected an expression".to_string(),
                    span: self.span(),
                });
                None
            }
        }
    }

    fn parse_conditional(&mut self) -> Option<Expr> {
        let start = self.span();
        self.advance(); // 'if'
        self.expect_punct(b'(', "(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(b')', ")")?;
        if !matches!(self.current(), Token::Then) {
            self.error(ParseError::Expected {
                expected: "then",
                span: self.span(),
            });
            return None;
        }
        self.advance();
        let then_arm = self.parse_expr()?;
        if !matches!(self.current(), Token::Else) {
            self.error(ParseError::Expected {
                expected: "else",
                span: self.span(),
            });
            return None;
        }
        self.advance();
        let else_arm = self.parse_expr()?;
        let end = else_arm.span();
        Some(Expr::ConditionalExpr {
            cond: Box::new(cond),
            then_arm: Box::new(then_arm),
            else_arm: Box::new(else_arm),
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_for(&mut self) -> Option<Expr> {
        let start = self.span();
        self.advance(); // 'for'
        let induction_name = match self.current() {
            Token::Identifier(sym) => {
                self.advance();
                sym
            }
            _ => {
                self.error(ParseError::Expected {
                    expected: "identifier",
                    span: self.span(),
                });
                return None;
            }
        };
        self.expect_punct(b'=', "=")?;
        let init = self.parse_expr()?;
        self.expect_punct(b',', ",")?;
        let cond = self.parse_expr()?;
        let step = if self.eat_punct(b',') {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        if !matches!(self.current(), Token::In) {
            self.error(ParseError::Expected {
                expected: "in",
                span: self.span(),
            });
            return None;
        }
        self.advance();
        let body = self.parse_expr()?;
        let end = body.span();
        Some(Expr::ForExpr {
            induction_name,
            init: Box::new(init),
            cond: Box::new(cond),
            step,
            body: Box::new(body),
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_let(&mut self) -> Option<Expr> {
        let start = self.span();
        self.advance(); // 'let'
        let mut bindings = Vec::new();
        loop {
            let name = match self.current() {
                Token::Identifier(sym) => {
                    self.advance();
                    sym
                }
                _ => break,
            };
            let init = if self.eat_punct(b'=') {
                Some(self.parse_expr()?)
            } else {
                None
            };
            bindings.push(LetBinding { name, init });
            if matches!(self.current(), Token::In) {
                break;
            }
        }
        if bindings.is_empty() {
            self.error(ParseError::Expected {
                expected: "identifier",
                span: self.span(),
            });
            return None;
        }
        if !matches!(self.current(), Token::In) {
            self.error(ParseError::Expected {
                expected: "in",
                span: self.span(),
            });
            return None;
        }
        self.advance();
        let body = self.parse_expr()?;
        let end = body.span();
        Some(Expr::LetExpr {
            bindings,
            body: Box::new(body),
            span: Span::new(start.start, end.end),
        })
    }
}
