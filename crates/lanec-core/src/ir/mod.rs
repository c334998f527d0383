pub mod ident;
pub mod pretty;
pub mod ty;

use serde::{Deserialize, Serialize};

pub use ident::Symbol;
pub use ty::Ty;

pub type InstrId = u32;
pub type RegisterId = u32;
pub type BlockId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
    pub globals: Vec<IrGlobal>,
}

/// The unit of analysis for function passes. Owned by the enclosing
/// compilation unit; passes mutate it in place and never create or destroy it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunction {
    pub name: Symbol,
    pub signature: IrFunctionSignature,
    pub blocks: Vec<IrBasicBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunctionSignature {
    pub params: Vec<Ty>,
    pub return_type: Ty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrBasicBlock {
    pub id: BlockId,
    pub label: Option<Symbol>,
    pub instructions: Vec<IrInstruction>,
    pub terminator: IrTerminator,
}

/// An instruction and the SSA register it defines: `IrValue::Register(id)`
/// refers to this instruction's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrInstruction {
    pub id: InstrId,
    pub kind: IrInstructionKind,
    pub ty: Option<Ty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrInstructionKind {
    // Arithmetic operations
    Add(IrValue, IrValue),
    Sub(IrValue, IrValue),
    Mul(IrValue, IrValue),
    Div(IrValue, IrValue),
    Rem(IrValue, IrValue),

    // Bitwise operations
    And(IrValue, IrValue),
    Or(IrValue, IrValue),
    Xor(IrValue, IrValue),
    Shl(IrValue, IrValue),
    Shr(IrValue, IrValue),
    Not(IrValue),

    // Comparison operations
    Eq(IrValue, IrValue),
    Ne(IrValue, IrValue),
    Lt(IrValue, IrValue),
    Le(IrValue, IrValue),
    Gt(IrValue, IrValue),
    Ge(IrValue, IrValue),

    // Type conversion operations
    Trunc(IrValue, Ty),
    ZExt(IrValue, Ty),
    SExt(IrValue, Ty),
    Bitcast(IrValue, Ty),

    // Memory operations
    Load {
        address: IrValue,
    },
    Store {
        value: IrValue,
        address: IrValue,
    },
    Alloca {
        ty: Ty,
    },

    // Vector operations
    Splat {
        value: IrValue,
        lanes: u32,
    },
    Shuffle {
        vector: IrValue,
        control: IrValue,
    },
    ExtractElement {
        vector: IrValue,
        index: IrValue,
    },
    InsertElement {
        vector: IrValue,
        element: IrValue,
        index: IrValue,
    },

    // Control flow helpers
    Select {
        condition: IrValue,
        if_true: IrValue,
        if_false: IrValue,
    },
    Phi {
        incoming: Vec<(IrValue, BlockId)>,
    },

    // Function operations
    Call {
        callee: IrValue,
        args: Vec<IrValue>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrTerminator {
    Return(Option<IrValue>),
    Br(BlockId),
    CondBr {
        condition: IrValue,
        if_true: BlockId,
        if_false: BlockId,
    },
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrValue {
    // SSA registers
    Register(RegisterId),

    // Constants
    Constant(IrConstant),

    // Function parameters
    Argument(u32),

    // Global references
    Global(Symbol, Ty),

    // Function references
    Function(Symbol),

    // Undefined value
    Undef(Ty),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrConstant {
    Int(i64, Ty),
    UInt(u64, Ty),
    Float(f64, Ty),
    Bool(bool),
    Vector(Vec<IrConstant>, Ty),
    Null(Ty),
    Undef(Ty),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrGlobal {
    pub name: Symbol,
    pub ty: Ty,
    pub initializer: Option<IrConstant>,
    pub is_constant: bool,
}

// Implementation helpers
impl IrProgram {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: IrFunction) {
        self.functions.push(function);
    }

    pub fn add_global(&mut self, global: IrGlobal) {
        self.globals.push(global);
    }

    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|func| func.name == name)
    }
}

impl Default for IrProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl IrFunction {
    pub fn new(name: impl Into<Symbol>, signature: IrFunctionSignature) -> Self {
        Self {
            name: name.into(),
            signature,
            blocks: Vec::new(),
        }
    }

    pub fn add_block(&mut self, block: IrBasicBlock) {
        self.blocks.push(block);
    }

    pub fn block(&self, id: BlockId) -> Option<&IrBasicBlock> {
        self.blocks.iter().find(|bb| bb.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut IrBasicBlock> {
        self.blocks.iter_mut().find(|bb| bb.id == id)
    }

    /// Replace every use of `register` in instruction operands and
    /// terminators with `replacement`. Returns the number of uses rewritten.
    pub fn replace_register_uses(&mut self, register: RegisterId, replacement: &IrValue) -> usize {
        let mut replaced = 0;
        for block in &mut self.blocks {
            for instr in &mut block.instructions {
                instr.kind.for_each_operand_mut(|operand| {
                    if *operand == IrValue::Register(register) {
                        *operand = replacement.clone();
                        replaced += 1;
                    }
                });
            }
            block.terminator.for_each_operand_mut(|operand| {
                if *operand == IrValue::Register(register) {
                    *operand = replacement.clone();
                    replaced += 1;
                }
            });
        }
        replaced
    }

    /// Number of uses of `register` across all instruction operands and
    /// terminators.
    pub fn register_use_count(&self, register: RegisterId) -> usize {
        let mut uses = 0;
        for block in &self.blocks {
            for instr in &block.instructions {
                uses += instr
                    .kind
                    .operands()
                    .into_iter()
                    .filter(|operand| **operand == IrValue::Register(register))
                    .count();
            }
            uses += block
                .terminator
                .operands()
                .into_iter()
                .filter(|operand| **operand == IrValue::Register(register))
                .count();
        }
        uses
    }
}

impl IrBasicBlock {
    pub fn new(id: BlockId, label: Option<Symbol>) -> Self {
        Self {
            id,
            label,
            instructions: Vec::new(),
            terminator: IrTerminator::Unreachable,
        }
    }

    pub fn add_instruction(&mut self, instruction: IrInstruction) {
        self.instructions.push(instruction);
    }

    pub fn set_terminator(&mut self, terminator: IrTerminator) {
        self.terminator = terminator;
    }
}

impl IrInstruction {
    pub fn new(id: InstrId, kind: IrInstructionKind) -> Self {
        Self { id, kind, ty: None }
    }

    pub fn with_ty(mut self, ty: Ty) -> Self {
        self.ty = Some(ty);
        self
    }
}

impl IrInstructionKind {
    /// The value operands of this instruction, in syntactic order.
    pub fn operands(&self) -> Vec<&IrValue> {
        use IrInstructionKind::*;
        match self {
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Rem(a, b) | And(a, b) | Or(a, b)
            | Xor(a, b) | Shl(a, b) | Shr(a, b) | Eq(a, b) | Ne(a, b) | Lt(a, b) | Le(a, b)
            | Gt(a, b) | Ge(a, b) => vec![a, b],
            Not(a) | Trunc(a, _) | ZExt(a, _) | SExt(a, _) | Bitcast(a, _) => vec![a],
            Load { address } => vec![address],
            Store { value, address } => vec![value, address],
            Alloca { .. } => Vec::new(),
            Splat { value, .. } => vec![value],
            Shuffle { vector, control } => vec![vector, control],
            ExtractElement { vector, index } => vec![vector, index],
            InsertElement {
                vector,
                element,
                index,
            } => vec![vector, element, index],
            Select {
                condition,
                if_true,
                if_false,
            } => vec![condition, if_true, if_false],
            Phi { incoming } => incoming.iter().map(|(value, _)| value).collect(),
            Call { callee, args } => {
                let mut operands = vec![callee];
                operands.extend(args.iter());
                operands
            }
        }
    }

    pub fn for_each_operand_mut(&mut self, mut visit: impl FnMut(&mut IrValue)) {
        use IrInstructionKind::*;
        match self {
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Rem(a, b) | And(a, b) | Or(a, b)
            | Xor(a, b) | Shl(a, b) | Shr(a, b) | Eq(a, b) | Ne(a, b) | Lt(a, b) | Le(a, b)
            | Gt(a, b) | Ge(a, b) => {
                visit(a);
                visit(b);
            }
            Not(a) | Trunc(a, _) | ZExt(a, _) | SExt(a, _) | Bitcast(a, _) => visit(a),
            Load { address } => visit(address),
            Store { value, address } => {
                visit(value);
                visit(address);
            }
            Alloca { .. } => {}
            Splat { value, .. } => visit(value),
            Shuffle { vector, control } => {
                visit(vector);
                visit(control);
            }
            ExtractElement { vector, index } => {
                visit(vector);
                visit(index);
            }
            InsertElement {
                vector,
                element,
                index,
            } => {
                visit(vector);
                visit(element);
                visit(index);
            }
            Select {
                condition,
                if_true,
                if_false,
            } => {
                visit(condition);
                visit(if_true);
                visit(if_false);
            }
            Phi { incoming } => {
                for (value, _) in incoming {
                    visit(value);
                }
            }
            Call { callee, args } => {
                visit(callee);
                for arg in args {
                    visit(arg);
                }
            }
        }
    }
}

impl IrTerminator {
    pub fn operands(&self) -> Vec<&IrValue> {
        match self {
            IrTerminator::Return(Some(value)) => vec![value],
            IrTerminator::Return(None) => Vec::new(),
            IrTerminator::Br(_) => Vec::new(),
            IrTerminator::CondBr { condition, .. } => vec![condition],
            IrTerminator::Unreachable => Vec::new(),
        }
    }

    pub fn for_each_operand_mut(&mut self, mut visit: impl FnMut(&mut IrValue)) {
        match self {
            IrTerminator::Return(Some(value)) => visit(value),
            IrTerminator::CondBr { condition, .. } => visit(condition),
            IrTerminator::Return(None) | IrTerminator::Br(_) | IrTerminator::Unreachable => {}
        }
    }
}

impl IrValue {
    pub fn bool(value: bool) -> IrValue {
        IrValue::Constant(IrConstant::Bool(value))
    }

    pub fn i32(value: i64) -> IrValue {
        IrValue::Constant(IrConstant::Int(value, Ty::I32))
    }

    pub fn as_constant(&self) -> Option<&IrConstant> {
        match self {
            IrValue::Constant(constant) => Some(constant),
            _ => None,
        }
    }
}

impl IrConstant {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IrConstant::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            IrConstant::Int(value, _) => Some(*value),
            _ => None,
        }
    }

    /// A mask constant with every lane set to `value`.
    pub fn mask(value: bool, lanes: u32) -> IrConstant {
        IrConstant::Vector(vec![IrConstant::Bool(value); lanes as usize], Ty::mask(lanes))
    }

    pub fn ty(&self) -> Ty {
        match self {
            IrConstant::Int(_, ty)
            | IrConstant::UInt(_, ty)
            | IrConstant::Float(_, ty)
            | IrConstant::Vector(_, ty)
            | IrConstant::Null(ty)
            | IrConstant::Undef(ty) => ty.clone(),
            IrConstant::Bool(_) => Ty::I1,
        }
    }
}
