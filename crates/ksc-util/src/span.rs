//! Source location tracking.
//!
//! Spec's Non-goals cap this deliberately: "source-location tracking beyond
//! what is needed to report the offending token." There is one source file
//! per compile and nobody downstream needs a line/column table, so a
//! [`Span`] is just the byte-offset range of a token.

/// A byte-offset range into the source string passed to `compile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// The source text this span covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}
