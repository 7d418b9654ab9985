//! ksc-ir - the abstract IR module spec §4.5 describes: a named collection
//! of `f64`-or-`i32` functions, each either a declaration or a body of
//! arena-held basic blocks and instructions.
//!
//! This crate owns three things `ksc-lower` drives and a downstream
//! collaborator consumes: the [`mir`] data model itself, the [`builder`]
//! façade lowering calls to populate it, and the fixed [`opt`] pipeline plus
//! [`verify`] that run once lowering a function finishes. [`dump`] renders a
//! `Module` to the stable text format spec §6 requires for golden tests.

pub mod analysis;
pub mod builder;
pub mod dump;
pub mod ids;
pub mod mir;
pub mod opt;
pub mod types;
pub mod verify;

pub use builder::{IrBuilder, ModuleBuilder};
pub use dump::dump_module;
pub use ids::{BlockId, FunctionId, InstId};
pub use mir::{BasicBlock, Function, Inst, Module, Terminator, Value};
pub use opt::run_pipeline;
pub use types::Type;
pub use verify::{verify_function, VerifyError};
