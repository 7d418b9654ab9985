//! Control-flow analysis shared by the verifier and the optimization
//! pipeline (spec §4.5, §5).

pub mod cfg;

pub use cfg::ControlFlowGraph;
