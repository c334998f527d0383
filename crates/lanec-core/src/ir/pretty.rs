use std::fmt::{self, Formatter};

use itertools::Itertools;

use crate::pretty::{PrettyCtx, PrettyPrintable};

use super::{
    IrBasicBlock, IrConstant, IrFunction, IrGlobal, IrInstruction, IrInstructionKind, IrProgram,
    IrTerminator, IrValue, Ty,
};

impl PrettyPrintable for IrProgram {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        ctx.writeln(f, "ir::Program {")?;
        ctx.with_indent(|ctx| {
            if !self.globals.is_empty() {
                ctx.writeln(f, "globals:")?;
                ctx.with_indent(|ctx| {
                    for global in &self.globals {
                        write_global(global, f, ctx)?;
                    }
                    Ok(())
                })?;
            }

            for (idx, func) in self.functions.iter().enumerate() {
                func.fmt_pretty(f, ctx)?;
                if idx + 1 < self.functions.len() {
                    writeln!(f)?;
                }
            }
            Ok(())
        })?;
        ctx.writeln(f, "}")
    }
}

impl PrettyPrintable for IrFunction {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        let params = self
            .signature
            .params
            .iter()
            .enumerate()
            .map(|(idx, ty)| format!("arg{}: {}", idx, format_type(ty)))
            .join(", ");
        ctx.writeln(
            f,
            format!(
                "fn {}({}) -> {} {{",
                self.name,
                params,
                format_type(&self.signature.return_type)
            ),
        )?;
        ctx.with_indent(|ctx| {
            for block in &self.blocks {
                write_block(block, f, ctx)?;
            }
            Ok(())
        })?;
        ctx.writeln(f, "}")
    }
}

fn write_global(global: &IrGlobal, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
    let mut line = format!("@{}: {}", global.name, format_type(&global.ty));
    if global.is_constant {
        line.push_str(" const");
    }
    if let Some(initializer) = &global.initializer {
        line.push_str(" = ");
        line.push_str(&format_constant(initializer));
    }
    ctx.writeln(f, line)
}

fn write_block(block: &IrBasicBlock, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
    let mut header = format!("bb{}", block.id);
    if let Some(label) = &block.label {
        header.push_str(&format!(" // label: {}", label));
    }
    ctx.writeln(f, header + ":")?;
    ctx.with_indent(|ctx| {
        for instr in &block.instructions {
            let mut line = summarize_instruction(instr);
            if ctx.options.show_types {
                if let Some(ty) = &instr.ty {
                    line.push_str(&format!(" : {}", format_type(ty)));
                }
            }
            ctx.writeln(f, line)?;
        }
        ctx.writeln(f, summarize_terminator(&block.terminator))
    })
}

fn summarize_instruction(instr: &IrInstruction) -> String {
    use IrInstructionKind::*;

    let mnemonic = |op: &str, operands: &[&IrValue]| {
        format!(
            "%r{} = {} {}",
            instr.id,
            op,
            operands.iter().map(|value| format_value(value)).join(", ")
        )
    };

    match &instr.kind {
        Add(a, b) => mnemonic("add", &[a, b]),
        Sub(a, b) => mnemonic("sub", &[a, b]),
        Mul(a, b) => mnemonic("mul", &[a, b]),
        Div(a, b) => mnemonic("div", &[a, b]),
        Rem(a, b) => mnemonic("rem", &[a, b]),
        And(a, b) => mnemonic("and", &[a, b]),
        Or(a, b) => mnemonic("or", &[a, b]),
        Xor(a, b) => mnemonic("xor", &[a, b]),
        Shl(a, b) => mnemonic("shl", &[a, b]),
        Shr(a, b) => mnemonic("shr", &[a, b]),
        Not(a) => mnemonic("not", &[a]),
        Eq(a, b) => mnemonic("eq", &[a, b]),
        Ne(a, b) => mnemonic("ne", &[a, b]),
        Lt(a, b) => mnemonic("lt", &[a, b]),
        Le(a, b) => mnemonic("le", &[a, b]),
        Gt(a, b) => mnemonic("gt", &[a, b]),
        Ge(a, b) => mnemonic("ge", &[a, b]),
        Trunc(a, ty) => format!("%r{} = trunc {} to {}", instr.id, format_value(a), format_type(ty)),
        ZExt(a, ty) => format!("%r{} = zext {} to {}", instr.id, format_value(a), format_type(ty)),
        SExt(a, ty) => format!("%r{} = sext {} to {}", instr.id, format_value(a), format_type(ty)),
        Bitcast(a, ty) => format!(
            "%r{} = bitcast {} to {}",
            instr.id,
            format_value(a),
            format_type(ty)
        ),
        Load { address } => mnemonic("load", &[address]),
        Store { value, address } => format!(
            "store {}, {}",
            format_value(value),
            format_value(address)
        ),
        Alloca { ty } => format!("%r{} = alloca {}", instr.id, format_type(ty)),
        Splat { value, lanes } => format!(
            "%r{} = splat {} x{}",
            instr.id,
            format_value(value),
            lanes
        ),
        Shuffle { vector, control } => mnemonic("shuffle", &[vector, control]),
        ExtractElement { vector, index } => mnemonic("extractelement", &[vector, index]),
        InsertElement {
            vector,
            element,
            index,
        } => mnemonic("insertelement", &[vector, element, index]),
        Select {
            condition,
            if_true,
            if_false,
        } => mnemonic("select", &[condition, if_true, if_false]),
        Phi { incoming } => format!(
            "%r{} = phi {}",
            instr.id,
            incoming
                .iter()
                .map(|(value, block)| format!("[{}, bb{}]", format_value(value), block))
                .join(", ")
        ),
        Call { callee, args } => format!(
            "%r{} = call {}({})",
            instr.id,
            format_value(callee),
            args.iter().map(|arg| format_value(arg)).join(", ")
        ),
    }
}

fn summarize_terminator(terminator: &IrTerminator) -> String {
    match terminator {
        IrTerminator::Return(Some(value)) => format!("ret {}", format_value(value)),
        IrTerminator::Return(None) => "ret void".to_string(),
        IrTerminator::Br(target) => format!("br bb{}", target),
        IrTerminator::CondBr {
            condition,
            if_true,
            if_false,
        } => format!(
            "condbr {}, bb{}, bb{}",
            format_value(condition),
            if_true,
            if_false
        ),
        IrTerminator::Unreachable => "unreachable".to_string(),
    }
}

fn format_value(value: &IrValue) -> String {
    match value {
        IrValue::Register(id) => format!("%r{}", id),
        IrValue::Constant(constant) => format_constant(constant),
        IrValue::Argument(idx) => format!("arg{}", idx),
        IrValue::Global(name, _) => format!("@{}", name),
        IrValue::Function(name) => format!("@{}", name),
        IrValue::Undef(ty) => format!("undef {}", format_type(ty)),
    }
}

fn format_constant(constant: &IrConstant) -> String {
    match constant {
        IrConstant::Int(value, ty) => format!("{} {}", format_type(ty), value),
        IrConstant::UInt(value, ty) => format!("{} {}", format_type(ty), value),
        IrConstant::Float(value, ty) => format!("{} {}", format_type(ty), value),
        IrConstant::Bool(value) => format!("i1 {}", value),
        IrConstant::Vector(elements, ty) => format!(
            "{} <{}>",
            format_type(ty),
            elements.iter().map(format_constant).join(", ")
        ),
        IrConstant::Null(ty) => format!("{} null", format_type(ty)),
        IrConstant::Undef(ty) => format!("{} undef", format_type(ty)),
    }
}

fn format_type(ty: &Ty) -> String {
    match ty {
        Ty::I1 => "i1".to_string(),
        Ty::I8 => "i8".to_string(),
        Ty::I16 => "i16".to_string(),
        Ty::I32 => "i32".to_string(),
        Ty::I64 => "i64".to_string(),
        Ty::F32 => "f32".to_string(),
        Ty::F64 => "f64".to_string(),
        Ty::Ptr(inner) => format!("ptr<{}>", format_type(inner)),
        Ty::Vector(element, lanes) => format!("<{} x {}>", lanes, format_type(element)),
        Ty::Void => "void".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ir::{IrFunctionSignature, IrTerminator};
    use crate::pretty::{pretty, PrettyOptions};

    use super::*;

    #[test]
    fn prints_function_with_probe_call() {
        let mut func = IrFunction::new(
            "masked_store",
            IrFunctionSignature {
                params: vec![Ty::mask(4)],
                return_type: Ty::Void,
            },
        );
        let mut entry = IrBasicBlock::new(0, Some("entry".into()));
        entry.add_instruction(
            IrInstruction::new(
                0,
                IrInstructionKind::Call {
                    callee: IrValue::Function("__is_compile_time_constant_mask".into()),
                    args: vec![IrValue::Argument(0)],
                },
            )
            .with_ty(Ty::I1),
        );
        entry.set_terminator(IrTerminator::Return(None));
        func.add_block(entry);

        let text = pretty(&func, PrettyOptions::default()).to_string();
        assert_eq!(
            text,
            "fn masked_store(arg0: <4 x i1>) -> void {\n    bb0 // label: entry:\n        %r0 = call @__is_compile_time_constant_mask(arg0) : i1\n        ret void\n}\n"
        );
    }
}
