//! Local folding of operations over constants.
//!
//! Kept deliberately small: just enough to consume the booleans produced by
//! probe resolution, so selects and branches over them collapse and the dead
//! code path becomes unreachable for later elimination. Runs interleaved with
//! probe resolution in the pipeline's fixpoint loop; each pass exposes new
//! work for the other.

use lanec_core::error::Result;
use lanec_core::ir::{
    InstrId, IrConstant, IrFunction, IrInstructionKind, IrTerminator, IrValue, Ty,
};

use super::FunctionPass;

pub struct FoldConstants;

impl FunctionPass for FoldConstants {
    fn name(&self) -> &'static str {
        "fold-constants"
    }

    fn run_on_function(&self, func: &mut IrFunction) -> Result<bool> {
        let mut changed = false;

        while let Some((block_idx, id, replacement)) = find_foldable(func) {
            let replaced = func.replace_register_uses(id, &replacement);
            func.blocks[block_idx].instructions.retain(|instr| instr.id != id);
            tracing::trace!(
                "folded %r{} in {} ({} uses rewritten)",
                id,
                func.name,
                replaced
            );
            changed = true;
        }

        for block in &mut func.blocks {
            if let IrTerminator::CondBr {
                condition,
                if_true,
                if_false,
            } = &block.terminator
            {
                if let Some(flag) = condition.as_constant().and_then(IrConstant::as_bool) {
                    let target = if flag { *if_true } else { *if_false };
                    block.terminator = IrTerminator::Br(target);
                    changed = true;
                }
            }
        }

        Ok(changed)
    }
}

fn find_foldable(func: &IrFunction) -> Option<(usize, InstrId, IrValue)> {
    for (block_idx, block) in func.blocks.iter().enumerate() {
        for instr in &block.instructions {
            if let Some(folded) = fold_instruction(&instr.kind) {
                return Some((block_idx, instr.id, folded));
            }
        }
    }
    None
}

fn fold_instruction(kind: &IrInstructionKind) -> Option<IrValue> {
    use IrInstructionKind::*;
    match kind {
        Select {
            condition,
            if_true,
            if_false,
        } => {
            let flag = condition.as_constant()?.as_bool()?;
            Some(if flag {
                if_true.clone()
            } else {
                if_false.clone()
            })
        }
        Add(a, b) => fold_int_binop(a, b, |x, y| Some(x.wrapping_add(y))),
        Sub(a, b) => fold_int_binop(a, b, |x, y| Some(x.wrapping_sub(y))),
        Mul(a, b) => fold_int_binop(a, b, |x, y| Some(x.wrapping_mul(y))),
        // Division folds only for nonzero divisors.
        Div(a, b) => fold_int_binop(a, b, |x, y| (y != 0).then(|| x.wrapping_div(y))),
        Rem(a, b) => fold_int_binop(a, b, |x, y| (y != 0).then(|| x.wrapping_rem(y))),
        And(a, b) => fold_bool_binop(a, b, |x, y| x && y)
            .or_else(|| fold_int_binop(a, b, |x, y| Some(x & y))),
        Or(a, b) => fold_bool_binop(a, b, |x, y| x || y)
            .or_else(|| fold_int_binop(a, b, |x, y| Some(x | y))),
        Xor(a, b) => fold_bool_binop(a, b, |x, y| x ^ y)
            .or_else(|| fold_int_binop(a, b, |x, y| Some(x ^ y))),
        Not(a) => {
            let flag = a.as_constant()?.as_bool()?;
            Some(IrValue::bool(!flag))
        }
        Eq(a, b) => fold_int_cmp(a, b, |x, y| x == y),
        Ne(a, b) => fold_int_cmp(a, b, |x, y| x != y),
        Lt(a, b) => fold_int_cmp(a, b, |x, y| x < y),
        Le(a, b) => fold_int_cmp(a, b, |x, y| x <= y),
        Gt(a, b) => fold_int_cmp(a, b, |x, y| x > y),
        Ge(a, b) => fold_int_cmp(a, b, |x, y| x >= y),
        Splat { value, lanes } => {
            let element = value.as_constant()?.clone();
            let ty = Ty::vector(element.ty(), *lanes);
            Some(IrValue::Constant(IrConstant::Vector(
                vec![element; *lanes as usize],
                ty,
            )))
        }
        _ => None,
    }
}

fn fold_int_binop(
    a: &IrValue,
    b: &IrValue,
    op: impl Fn(i64, i64) -> Option<i64>,
) -> Option<IrValue> {
    let (IrConstant::Int(x, ty), IrConstant::Int(y, _)) = (a.as_constant()?, b.as_constant()?)
    else {
        return None;
    };
    Some(IrValue::Constant(IrConstant::Int(op(*x, *y)?, ty.clone())))
}

fn fold_bool_binop(
    a: &IrValue,
    b: &IrValue,
    op: impl Fn(bool, bool) -> bool,
) -> Option<IrValue> {
    let x = a.as_constant()?.as_bool()?;
    let y = b.as_constant()?.as_bool()?;
    Some(IrValue::bool(op(x, y)))
}

fn fold_int_cmp(a: &IrValue, b: &IrValue, op: impl Fn(i64, i64) -> bool) -> Option<IrValue> {
    let x = a.as_constant()?.as_int()?;
    let y = b.as_constant()?.as_int()?;
    Some(IrValue::bool(op(x, y)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lanec_core::ir::{IrBasicBlock, IrFunctionSignature, IrInstruction};

    use super::*;

    fn int_function() -> IrFunction {
        IrFunction::new(
            "fold_me",
            IrFunctionSignature {
                params: vec![],
                return_type: Ty::I32,
            },
        )
    }

    #[test]
    fn folds_select_on_constant_condition() {
        let mut func = int_function();
        let mut entry = IrBasicBlock::new(0, None);
        entry.add_instruction(IrInstruction::new(
            0,
            IrInstructionKind::Select {
                condition: IrValue::bool(true),
                if_true: IrValue::i32(1),
                if_false: IrValue::i32(2),
            },
        ));
        entry.set_terminator(IrTerminator::Return(Some(IrValue::Register(0))));
        func.add_block(entry);

        assert!(FoldConstants.run_on_function(&mut func).unwrap());
        assert!(func.blocks[0].instructions.is_empty());
        assert_eq!(
            func.blocks[0].terminator,
            IrTerminator::Return(Some(IrValue::i32(1)))
        );
    }

    #[test]
    fn folds_arithmetic_chain_to_literal() {
        let mut func = int_function();
        let mut entry = IrBasicBlock::new(0, None);
        entry.add_instruction(IrInstruction::new(
            0,
            IrInstructionKind::Add(IrValue::i32(2), IrValue::i32(3)),
        ));
        entry.add_instruction(IrInstruction::new(
            1,
            IrInstructionKind::Mul(IrValue::Register(0), IrValue::i32(4)),
        ));
        entry.set_terminator(IrTerminator::Return(Some(IrValue::Register(1))));
        func.add_block(entry);

        assert!(FoldConstants.run_on_function(&mut func).unwrap());
        assert!(func.blocks[0].instructions.is_empty());
        assert_eq!(
            func.blocks[0].terminator,
            IrTerminator::Return(Some(IrValue::i32(20)))
        );
    }

    #[test]
    fn rewrites_condbr_on_constant_to_br() {
        let mut func = int_function();
        let mut entry = IrBasicBlock::new(0, None);
        entry.set_terminator(IrTerminator::CondBr {
            condition: IrValue::bool(false),
            if_true: 1,
            if_false: 2,
        });
        func.add_block(entry);
        let mut then_block = IrBasicBlock::new(1, None);
        then_block.set_terminator(IrTerminator::Return(Some(IrValue::i32(1))));
        func.add_block(then_block);
        let mut else_block = IrBasicBlock::new(2, None);
        else_block.set_terminator(IrTerminator::Return(Some(IrValue::i32(2))));
        func.add_block(else_block);

        assert!(FoldConstants.run_on_function(&mut func).unwrap());
        assert_eq!(func.blocks[0].terminator, IrTerminator::Br(2));
    }

    #[test]
    fn leaves_division_by_zero_alone() {
        let mut func = int_function();
        let mut entry = IrBasicBlock::new(0, None);
        entry.add_instruction(IrInstruction::new(
            0,
            IrInstructionKind::Div(IrValue::i32(1), IrValue::i32(0)),
        ));
        entry.set_terminator(IrTerminator::Return(Some(IrValue::Register(0))));
        func.add_block(entry);

        assert!(!FoldConstants.run_on_function(&mut func).unwrap());
        assert_eq!(func.blocks[0].instructions.len(), 1);
    }

    #[test]
    fn folds_splat_of_literal_to_constant_vector() {
        let mut func = int_function();
        let mut entry = IrBasicBlock::new(0, None);
        entry.add_instruction(IrInstruction::new(
            0,
            IrInstructionKind::Splat {
                value: IrValue::Constant(IrConstant::Bool(true)),
                lanes: 4,
            },
        ));
        entry.add_instruction(IrInstruction::new(
            1,
            IrInstructionKind::Not(IrValue::bool(false)),
        ));
        entry.set_terminator(IrTerminator::Return(Some(IrValue::Register(0))));
        func.add_block(entry);

        assert!(FoldConstants.run_on_function(&mut func).unwrap());
        assert_eq!(
            func.blocks[0].terminator,
            IrTerminator::Return(Some(IrValue::Constant(IrConstant::mask(true, 4))))
        );
    }
}
