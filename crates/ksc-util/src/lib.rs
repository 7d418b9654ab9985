//! ksc-util - Shared foundation types for the Kaleidoscope-family compiler core.
//!
//! Every other `ksc-*` crate depends on this one and nothing else outside
//! its own layer. It provides the pieces that are not specific to lexing,
//! parsing, or lowering, but that all three need:
//!
//! - [`Symbol`] / [`Interner`] - cheap, comparable handles for identifiers
//!   and operator spellings, interned per-compilation (there is no
//!   process-global symbol table; this core never compiles more than one
//!   translation unit at a time).
//! - [`Span`] - a byte-offset range, just enough to name the token an error
//!   is about. There is no line/column table and no multi-file source map:
//!   tracking source locations beyond the offending token is out of scope.
//! - [`diagnostic`] - [`Diagnostic`], [`Level`], and [`Handler`], the shared
//!   vocabulary the lexer, parser, and lowering pass use to report problems.
//! - [`IndexVec`] - a `Vec` indexed by a newtype instead of `usize`, used by
//!   `ksc-ir` to keep basic blocks, instructions, and functions in separate,
//!   non-interchangeable index spaces.

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level, Origin};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::{Interner, Symbol};

pub use rustc_hash::{FxHashMap, FxHashSet};
