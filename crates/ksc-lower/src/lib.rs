//! ksc-lower - the AST-to-IR lowering pass (spec §4.4).
//!
//! Walks the top-level item forest `ksc-par` produces, via the [`Visitor`]
//! open-recursion protocol, and drives an [`ksc_ir::IrBuilder`] to populate
//! a module. This crate has no knowledge of any concrete IR
//! representation - it only ever calls through the trait - which is what
//! lets its unit tests use a bare `ModuleBuilder` while a downstream
//! collaborator could swap in a different arena without touching this
//! crate at all.

mod error;
mod lower;
mod scope;

pub use error::LowerError;
pub use lower::{lower_program, LoweredProgram};
pub use scope::Scope;
