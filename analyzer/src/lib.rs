#![warn(unused_crate_dependencies)]

// Analysis over bitblast gate networks: which variables a vector depends
// on, what it computes across assignments of them, and how gate expressions
// shrink once inputs with no effect are discovered.

pub mod analysis;
pub mod optimizer;

pub use analysis::{Analysis, AnalysisError};
pub use optimizer::Optimizer;
