//! Ordered pass pipeline with a bounded fixpoint driver.
//!
//! Probe resolution is cheap and order-sensitive: an early run may not yet
//! see constants that only emerge after folding. The driver therefore
//! iterates the fixpoint set until nothing changes (or the round bound is
//! hit), then runs the last-attempt set exactly once, after which no probe
//! call may survive.

use itertools::Itertools;

use lanec_core::error::Result;
use lanec_core::intrinsics::is_compile_time_constant_probe;
use lanec_core::ir::{IrFunction, IrInstructionKind, IrProgram, IrValue};

use crate::error::internal_error;
use crate::opt_ensure;
use crate::passes::{FoldConstants, FunctionPass, ResolveCompileTimeConstants};

pub const DEFAULT_MAX_ROUNDS: usize = 8;

pub struct Pipeline {
    fixpoint: Vec<Box<dyn FunctionPass>>,
    last: Vec<Box<dyn FunctionPass>>,
    max_rounds: usize,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            fixpoint: Vec::new(),
            last: Vec::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// The standard mid-end schedule: probe resolution interleaved with
    /// folding until a fixpoint, then one guaranteed last attempt.
    pub fn standard() -> Self {
        Self::new()
            .add_pass(Box::new(ResolveCompileTimeConstants::new(false)))
            .add_pass(Box::new(FoldConstants))
            .add_last_pass(Box::new(ResolveCompileTimeConstants::last_attempt()))
            .add_last_pass(Box::new(FoldConstants))
    }

    /// Register a pass in the fixpoint set.
    pub fn add_pass(mut self, pass: Box<dyn FunctionPass>) -> Self {
        self.fixpoint.push(pass);
        self
    }

    /// Register a pass in the set that runs exactly once, after the fixpoint.
    pub fn add_last_pass(mut self, pass: Box<dyn FunctionPass>) -> Self {
        self.last.push(pass);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn run_function(&self, func: &mut IrFunction) -> Result<bool> {
        opt_ensure!(
            self.max_rounds > 0,
            "pipeline must allow at least one round"
        );
        tracing::debug!(
            "running [{}] then [{}] on {}",
            self.fixpoint.iter().map(|pass| pass.name()).join(", "),
            self.last.iter().map(|pass| pass.name()).join(", "),
            func.name
        );

        let mut changed_any = false;
        for round in 0..self.max_rounds {
            let mut changed = false;
            for pass in &self.fixpoint {
                let pass_changed = pass.run_on_function(func)?;
                tracing::trace!(
                    "{} on {}: changed={}",
                    pass.name(),
                    func.name,
                    pass_changed
                );
                changed |= pass_changed;
            }
            changed_any |= changed;
            if !changed {
                tracing::debug!("{} reached fixpoint after {} rounds", func.name, round);
                break;
            }
        }

        for pass in &self.last {
            changed_any |= pass.run_on_function(func)?;
        }

        ensure_no_probes(func)?;
        Ok(changed_any)
    }

    pub fn run_program(&self, program: &mut IrProgram) -> Result<bool> {
        let mut changed = false;
        for func in &mut program.functions {
            changed |= self.run_function(func)?;
        }
        Ok(changed)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Code generation has no lowering for constancy probes; one surviving the
/// last attempt is a pipeline-integration bug, not a recoverable condition.
fn ensure_no_probes(func: &IrFunction) -> Result<()> {
    for block in &func.blocks {
        for instr in &block.instructions {
            if let IrInstructionKind::Call {
                callee: IrValue::Function(name),
                ..
            } = &instr.kind
            {
                if is_compile_time_constant_probe(name) {
                    return Err(internal_error(format!(
                        "probe {} survived the last resolution attempt in {}",
                        name, func.name
                    )));
                }
            }
        }
    }
    Ok(())
}
