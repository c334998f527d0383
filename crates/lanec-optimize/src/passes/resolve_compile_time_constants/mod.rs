//! Resolution of `__is_compile_time_constant_*` probe calls.
//!
//! Runtime-library implementations of target-specific operations carry two
//! code paths, selected on whether a value (usually the execution mask) is
//! known at compile time; they ask through calls to the probe family that
//! survive inlining. This pass answers each probe by walking the chain of
//! producers behind its argument and rewrites the call to a literal boolean
//! so later folding can drop the dead path. A probe the pass cannot decide
//! yet is left in place so a rerun after more inlining and folding gets
//! another chance; the run flagged as the last attempt answers `false` for
//! everything still open, because code generation has no lowering for probes.

use std::collections::HashSet;

use lanec_core::error::Result;
use lanec_core::intrinsics::is_compile_time_constant_probe;
use lanec_core::ir::{
    InstrId, IrFunction, IrInstruction, IrInstructionKind, IrValue, RegisterId,
};

use super::FunctionPass;


/// Producer hops the resolver follows before giving up on a chain.
pub const MAX_PRODUCER_HOPS: usize = 16;

/// Classification of one probe argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The argument is provably built from constants alone.
    ConstantTrue,
    /// The argument is not provably constant and no later run may retry.
    ConstantFalse,
    /// Not decidable yet; legal only before the last attempt.
    Unknown,
}

pub struct ResolveCompileTimeConstants {
    last_try: bool,
}

impl ResolveCompileTimeConstants {
    pub fn new(last_try: bool) -> Self {
        Self { last_try }
    }

    /// The run scheduled after which no probe may survive.
    pub fn last_attempt() -> Self {
        Self::new(true)
    }

    /// Classify the single argument of a probe call.
    pub fn resolve(&self, func: &IrFunction, argument: &IrValue) -> Resolution {
        if is_constant_chain(func, argument) {
            Resolution::ConstantTrue
        } else if self.last_try {
            Resolution::ConstantFalse
        } else {
            Resolution::Unknown
        }
    }

    fn lower_block(&self, func: &mut IrFunction, block_idx: usize) -> Result<bool> {
        // Snapshot the block's probe calls up front; rewrites only replace
        // operands and remove the resolved call, never insert instructions.
        let pending: Vec<(InstrId, Vec<IrValue>)> = func.blocks[block_idx]
            .instructions
            .iter()
            .filter_map(|instr| match &instr.kind {
                IrInstructionKind::Call {
                    callee: IrValue::Function(name),
                    args,
                } if is_compile_time_constant_probe(name) => Some((instr.id, args.clone())),
                _ => None,
            })
            .collect();

        let mut changed = false;
        for (id, args) in pending {
            if args.len() != 1 {
                // Contract violation from upstream inlining; leave the call
                // for the pipeline's post-final check to surface.
                tracing::warn!(
                    "probe call %r{} in {} has {} arguments, expected 1; skipping",
                    id,
                    func.name,
                    args.len()
                );
                continue;
            }
            let literal = match self.resolve(func, &args[0]) {
                Resolution::ConstantTrue => true,
                Resolution::ConstantFalse => false,
                Resolution::Unknown => continue,
            };
            let replaced = func.replace_register_uses(id, &IrValue::bool(literal));
            func.blocks[block_idx]
                .instructions
                .retain(|instr| instr.id != id);
            tracing::debug!(
                "resolved probe %r{} in {} to {} ({} uses rewritten)",
                id,
                func.name,
                literal,
                replaced
            );
            changed = true;
        }
        Ok(changed)
    }
}

impl FunctionPass for ResolveCompileTimeConstants {
    fn name(&self) -> &'static str {
        "resolve-compile-time-constants"
    }

    fn run_on_function(&self, func: &mut IrFunction) -> Result<bool> {
        let mut changed = false;
        for block_idx in 0..func.blocks.len() {
            changed |= self.lower_block(func, block_idx)?;
        }
        Ok(changed)
    }
}

/// Whether every producer reachable from `root` is a constant or an operation
/// over constants. Any data-dependent link in the chain answers no.
fn is_constant_chain(func: &IrFunction, root: &IrValue) -> bool {
    let mut worklist: Vec<&IrValue> = vec![root];
    let mut visited: HashSet<RegisterId> = HashSet::new();

    while let Some(value) = worklist.pop() {
        match value {
            // Literals, constant aggregates, and link-time addresses.
            IrValue::Constant(_)
            | IrValue::Undef(_)
            | IrValue::Global(..)
            | IrValue::Function(_) => {}
            // Parameters carry no compile-time value.
            IrValue::Argument(_) => return false,
            IrValue::Register(id) => {
                if !visited.insert(*id) {
                    continue;
                }
                if visited.len() > MAX_PRODUCER_HOPS {
                    return false;
                }
                let Some(instr) = defining_instruction(func, *id) else {
                    return false;
                };
                if !propagates_constancy(&instr.kind) {
                    return false;
                }
                worklist.extend(instr.kind.operands());
            }
        }
    }
    true
}

/// Operations whose result is constant whenever all operands are constant.
/// Loads, calls, allocas, and phis are opaque: their results depend on state
/// the resolver does not model.
fn propagates_constancy(kind: &IrInstructionKind) -> bool {
    use IrInstructionKind::*;
    matches!(
        kind,
        Add(..)
            | Sub(..)
            | Mul(..)
            | Div(..)
            | Rem(..)
            | And(..)
            | Or(..)
            | Xor(..)
            | Shl(..)
            | Shr(..)
            | Not(..)
            | Eq(..)
            | Ne(..)
            | Lt(..)
            | Le(..)
            | Gt(..)
            | Ge(..)
            | Trunc(..)
            | ZExt(..)
            | SExt(..)
            | Bitcast(..)
            | Splat { .. }
            | Shuffle { .. }
            | ExtractElement { .. }
            | InsertElement { .. }
            | Select { .. }
    )
}

fn defining_instruction(func: &IrFunction, register: RegisterId) -> Option<&IrInstruction> {
    func.blocks
        .iter()
        .flat_map(|block| block.instructions.iter())
        .find(|instr| instr.id == register)
}
