//! Diagnostic reporting.
//!
//! [`Diagnostic`] and [`Level`] are the shared vocabulary `ksc-lex`,
//! `ksc-par`, and `ksc-lower` use to describe a problem; [`Handler`]
//! accumulates them for the duration of one `compile` call. The pipeline's
//! first fatal diagnostic becomes the `Err` a caller sees (`ksc::Error`);
//! `Handler` keeps the rest so a downstream collaborator that wants to
//! print everything it found still can.
//!
//! # Examples
//!
//! ```
//! use ksc_util::{Diagnostic, Handler, Level, Span};
//!
//! let mut handler = Handler::new();
//! handler.report(Diagnostic::error("unexpected token", Span::DUMMY));
//! assert!(handler.has_errors());
//! ```

use crate::Span;
use std::fmt;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// Which phase raised a diagnostic. Lexing itself never fails - an invalid
/// token is just `Token::Invalid` flowing downstream - so `Lex` only ever
/// tags the parser's own report of one, at the point it gives up on it
/// (spec §7 still wants a caller able to tell that case apart from an
/// ordinary grammar error).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Lex,
    Parse,
}

/// A single diagnostic message with severity and source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub origin: Origin,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            origin: Origin::Parse,
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// A fatal diagnostic for an invalid token the lexer could not make
    /// sense of (spec §8 scenario 6's malformed-number case).
    pub fn lex_error(message: impl Into<String>, span: Span) -> Self {
        Self {
            origin: Origin::Lex,
            ..Self::error(message, span)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.level, self.span.start, self.span.end, self.message
        )
    }
}

/// Accumulates [`Diagnostic`]s over the lifetime of one compile.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The first reported error, if any - what the facade surfaces as the
    /// overall `Err` of a `compile` call.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.level == Level::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_ignores_warnings() {
        let mut handler = Handler::new();
        handler.report(Diagnostic::warning("unused", Span::DUMMY));
        assert!(!handler.has_errors());
        handler.report(Diagnostic::error("bad token", Span::DUMMY));
        assert!(handler.has_errors());
    }

    #[test]
    fn first_error_skips_leading_warnings() {
        let mut handler = Handler::new();
        handler.report(Diagnostic::warning("w", Span::DUMMY));
        handler.report(Diagnostic::error("e1", Span::new(1, 2)));
        handler.report(Diagnostic::error("e2", Span::new(3, 4)));
        assert_eq!(handler.first_error().unwrap().message, "e1");
    }
}
