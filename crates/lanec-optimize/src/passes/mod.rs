// Passes - focused function passes over the lane IR

pub mod fold_constants;
pub mod resolve_compile_time_constants;

pub use fold_constants::*;
pub use resolve_compile_time_constants::*;

use lanec_core::error::Result;
use lanec_core::ir::IrFunction;

/// Interface for passes that transform one function at a time. A pass holds
/// no cross-function state; the function is exclusively owned by the pass for
/// the duration of the call.
pub trait FunctionPass {
    fn name(&self) -> &'static str;

    /// Transform `func` in place. Returns whether anything changed, so the
    /// pipeline driver can decide whether to schedule dependent passes again.
    fn run_on_function(&self, func: &mut IrFunction) -> Result<bool>;
}

pub struct NoopPass;

impl FunctionPass for NoopPass {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn run_on_function(&self, _func: &mut IrFunction) -> Result<bool> {
        Ok(false)
    }
}
