//! ksc-par - the recursive-descent, Pratt-precedence parser (§4.2-§4.3).
//!
//! Drives a [`ksc_lex::Lexer`] one token of lookahead at a time, consulting
//! and mutating an [`optable::OperatorTable`] as it goes, and produces a
//! forest of [`ast::Item`]s - the unit `ksc-lower` consumes.

pub mod ast;
pub mod error;
pub mod optable;
pub mod parser;
pub mod visitor;

pub use ast::{Expr, Extern, Function, Item, LetBinding, Prototype};
pub use error::ParseError;
pub use optable::OperatorTable;
pub use parser::Parser;
pub use visitor::Visitor;
