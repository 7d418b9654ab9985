//! The lowering-error kinds spec §7 names: `UnknownSymbol`,
//! `UnknownFunction`, `ArityMismatch`, `BadAssignment`, `AlreadyDefined`,
//! and `VerifierError` (re-exported from `ksc-ir` and wrapped here so a
//! caller only has to match one enum per compile phase).

use ksc_ir::VerifyError;
use ksc_util::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("use of undeclared variable `{name}` at {span:?}")]
    UnknownSymbol { name: String, span: Span },

    #[error("call to undeclared function `{name}` at {span:?}")]
    UnknownFunction { name: String, span: Span },

    #[error("`{name}` expects {expected} argument(s), got {got} at {span:?}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("left-hand side of `=` must be a variable at {span:?}")]
    BadAssignment { span: Span },

    #[error("function `{name}` is already defined at {span:?}")]
    AlreadyDefined { name: String, span: Span },

    #[error("an earlier parse error surfaced as this item: {message}")]
    SourceError { message: String, span: Span },

    #[error(transparent)]
    Verifier(#[from] VerifyError),
}

impl LowerError {
    pub fn span(&self) -> Option<Span> {
        match self {
            LowerError::UnknownSymbol { span, .. }
            | LowerError::UnknownFunction { span, .. }
            | LowerError::ArityMismatch { span, .. }
            | LowerError::BadAssignment { span }
            | LowerError::AlreadyDefined { span, .. }
            | LowerError::SourceError { span, .. } => Some(*span),
            LowerError::Verifier(_) => None,
        }
    }
}
