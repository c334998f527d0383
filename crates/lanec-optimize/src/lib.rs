// lanec-optimize: optimization passes for the lane IR
//
// Architecture:
// - passes: focused passes that implement FunctionPass
// - pipeline: the ordered pass pipeline and its fixpoint driver

pub mod error;
pub mod passes;
pub mod pipeline;

// Re-export key types for convenience
pub use passes::*;
pub use pipeline::*;
