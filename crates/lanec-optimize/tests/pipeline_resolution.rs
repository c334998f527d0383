use pretty_assertions::assert_eq;

use lanec_core::error::Error;
use lanec_core::intrinsics::is_compile_time_constant_probe;
use lanec_core::ir::{
    IrBasicBlock, IrConstant, IrFunction, IrFunctionSignature, IrInstruction, IrInstructionKind,
    IrTerminator, IrValue, Ty,
};
use lanec_optimize::{FunctionPass, Pipeline, ResolveCompileTimeConstants};

fn probe(id: u32, arg: IrValue) -> IrInstruction {
    IrInstruction::new(
        id,
        IrInstructionKind::Call {
            callee: IrValue::Function("__is_compile_time_constant_mask".into()),
            args: vec![arg],
        },
    )
    .with_ty(Ty::I1)
}

fn count_probes(func: &IrFunction) -> usize {
    func.blocks
        .iter()
        .flat_map(|block| block.instructions.iter())
        .filter(|instr| {
            matches!(
                &instr.kind,
                IrInstructionKind::Call {
                    callee: IrValue::Function(name),
                    ..
                } if is_compile_time_constant_probe(name)
            )
        })
        .count()
}

/// The runtime-library idiom: probe the mask, branch to a fast path when it
/// is known at compile time.
fn two_path_function(mask: IrValue) -> IrFunction {
    let mut func = IrFunction::new(
        "masked_store",
        IrFunctionSignature {
            params: vec![Ty::mask(4)],
            return_type: Ty::I32,
        },
    );
    let mut entry = IrBasicBlock::new(0, Some("entry".into()));
    entry.add_instruction(probe(0, mask));
    entry.set_terminator(IrTerminator::CondBr {
        condition: IrValue::Register(0),
        if_true: 1,
        if_false: 2,
    });
    func.add_block(entry);

    let mut fast = IrBasicBlock::new(1, Some("fast_path".into()));
    fast.set_terminator(IrTerminator::Return(Some(IrValue::i32(1))));
    func.add_block(fast);

    let mut general = IrBasicBlock::new(2, Some("general_path".into()));
    general.set_terminator(IrTerminator::Return(Some(IrValue::i32(2))));
    func.add_block(general);
    func
}

#[test]
fn constant_mask_specializes_to_fast_path() {
    let mut func = two_path_function(IrValue::Constant(IrConstant::mask(true, 4)));

    let changed = Pipeline::standard().run_function(&mut func).unwrap();

    assert!(changed);
    assert_eq!(count_probes(&func), 0);
    assert_eq!(func.blocks[0].terminator, IrTerminator::Br(1));
}

#[test]
fn runtime_mask_specializes_to_general_path() {
    let mut func = two_path_function(IrValue::Argument(0));

    let changed = Pipeline::standard().run_function(&mut func).unwrap();

    assert!(changed);
    assert_eq!(count_probes(&func), 0);
    assert_eq!(func.blocks[0].terminator, IrTerminator::Br(2));
}

#[test]
fn folding_between_rounds_unblocks_a_probe() {
    // The probe in bb0 sees a select whose condition is another probe's
    // still-unresolved result; only after that probe resolves and the select
    // folds does the chain become provably constant. Takes two rounds.
    let mut func = IrFunction::new(
        "staged",
        IrFunctionSignature {
            params: vec![Ty::mask(4)],
            return_type: Ty::I1,
        },
    );

    let mut first = IrBasicBlock::new(0, None);
    first.add_instruction(probe(0, IrValue::Register(2)));
    first.set_terminator(IrTerminator::Br(1));
    func.add_block(first);

    let mut second = IrBasicBlock::new(1, None);
    second.add_instruction(probe(1, IrValue::Constant(IrConstant::mask(true, 4))));
    second.add_instruction(IrInstruction::new(
        2,
        IrInstructionKind::Select {
            condition: IrValue::Register(1),
            if_true: IrValue::i32(1),
            if_false: IrValue::i32(2),
        },
    ));
    second.set_terminator(IrTerminator::Return(Some(IrValue::Register(0))));
    func.add_block(second);

    let changed = Pipeline::standard().run_function(&mut func).unwrap();

    assert!(changed);
    assert_eq!(count_probes(&func), 0);
    assert_eq!(
        func.blocks[1].terminator,
        IrTerminator::Return(Some(IrValue::bool(true)))
    );
}

#[test]
fn pipeline_is_idempotent_on_resolved_function() {
    let mut func = two_path_function(IrValue::Constant(IrConstant::mask(false, 4)));

    let pipeline = Pipeline::standard();
    assert!(pipeline.run_function(&mut func).unwrap());
    let resolved = func.clone();

    assert!(!pipeline.run_function(&mut func).unwrap());
    assert_eq!(func, resolved);
}

#[test]
fn probe_count_is_non_increasing_across_partial_runs() {
    let mut func = IrFunction::new(
        "mixed",
        IrFunctionSignature {
            params: vec![Ty::mask(4), Ty::I32],
            return_type: Ty::Void,
        },
    );
    let mut entry = IrBasicBlock::new(0, None);
    entry.add_instruction(probe(0, IrValue::Constant(IrConstant::mask(true, 4))));
    entry.add_instruction(probe(1, IrValue::Argument(0)));
    entry.add_instruction(probe(2, IrValue::Argument(1)));
    entry.set_terminator(IrTerminator::Return(None));
    func.add_block(entry);

    // A lone non-final attempt resolves the constant probe and defers the rest.
    let early = ResolveCompileTimeConstants::new(false);
    assert!(early.run_on_function(&mut func).unwrap());
    assert_eq!(count_probes(&func), 2);

    // Re-running resolves nothing further; the count never grows.
    assert!(!early.run_on_function(&mut func).unwrap());
    assert_eq!(count_probes(&func), 2);

    // The full pipeline closes out the remainder.
    Pipeline::standard().run_function(&mut func).unwrap();
    assert_eq!(count_probes(&func), 0);
}

#[test]
fn surviving_probe_is_a_fatal_pipeline_error() {
    let mut func = IrFunction::new(
        "broken",
        IrFunctionSignature {
            params: vec![Ty::mask(4)],
            return_type: Ty::Void,
        },
    );
    let mut entry = IrBasicBlock::new(0, None);
    // Wrong arity: upstream inlining contract violation, skipped by the
    // resolver even on the last attempt.
    entry.add_instruction(IrInstruction::new(
        0,
        IrInstructionKind::Call {
            callee: IrValue::Function("__is_compile_time_constant_mask".into()),
            args: vec![IrValue::Argument(0), IrValue::bool(true)],
        },
    ));
    entry.set_terminator(IrTerminator::Return(None));
    func.add_block(entry);

    let result = Pipeline::standard().run_function(&mut func);
    assert!(matches!(result, Err(Error::Internal(_))));
}
