//! String interning.
//!
//! Identifiers and operator spellings are compared and hashed far more
//! often than they are printed, so the lexer hands out a [`Symbol`] - a
//! 4-byte handle into an [`Interner`] - instead of an owned `String`.
//!
//! Unlike a typical compiler's interner, this one is **not** a process-wide
//! global. The core never has more than one compile's worth of work in
//! flight (spec's Non-goals exclude multi-file compilation units), so an
//! interner owned by the compile call is simpler to reason about: no
//! `OnceLock`, no `RwLock`, no leaked strings.

use std::fmt;

use crate::FxHashMap;

/// An interned string. Cheap to copy, compare, and hash.
///
/// Two `Symbol`s from the *same* [`Interner`] are equal iff the strings
/// they name are equal. Symbols from different interners are never
/// meaningfully comparable; this core only ever has one interner alive at
/// a time, so that footgun does not arise in practice.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns the strings behind every [`Symbol`] handed out during one compile.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, u32>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the same [`Symbol`] for repeated calls with
    /// equal strings.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&id) = self.lookup.get(text) {
            return Symbol(id);
        }
        let id = self.strings.len() as u32;
        let owned: Box<str> = text.into();
        self.strings.push(owned.clone());
        self.lookup.insert(owned, id);
        Symbol(id)
    }

    /// Look up `text`'s symbol without interning it, for a caller that only
    /// wants to query an existing name (e.g. `Module::function(name)`'s
    /// string-keyed wrapper) and must not accidentally mint a new one for a
    /// typo'd name.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.lookup.get(text).map(|&id| Symbol(id))
    }

    /// Resolve a symbol back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was not produced by this interner - a Symbol is
    /// only ever meaningful relative to the interner that minted it.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        &self.strings[symbol.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
