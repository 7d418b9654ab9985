//! The one lexical error kind (spec §7): a malformed token.
//!
//! The lexer itself never returns this - it hands back `Token::Invalid`
//! like any other token (§4.1). `LexError` is what a caller builds from an
//! `Invalid` token once it decides the token is fatal (the parser, on
//! seeing one at top level; see `ksc-par`).

use ksc_util::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
