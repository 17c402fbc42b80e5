mod translate;

#[cfg(test)]
mod tests;

pub use translate::{ExpressionCompiler, NoFreshCode, OpcodeTranslator};

use crate::error::BridgeError;
use derive_more::Deref;

///
/// Opcode
///
/// Closed instruction set of the foreign expression evaluator. Raw codes
/// outside this set cannot be translated; decoding one is an
/// unsupported-construct failure naming the code.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum Opcode {
    NoOp = 0,
    /// Push a constant-pool entry.
    PushConst = 1,
    /// Push a variable level.
    PushVar = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    AddVar = 7,
    SubVar = 8,
    MulVar = 9,
    DivVar = 10,
    AddConst = 11,
    SubConst = 12,
    MulConst = 13,
    DivConst = 14,
    /// Negate the stack top.
    Neg = 15,
    /// Push a negated variable level. Has no constant counterpart.
    NegVar = 16,
    /// Call an intrinsic function; the argument is the intrinsic id.
    Call = 17,
    /// Store the stack top into a row; the argument is 1 + active row.
    Store = 18,
}

///
/// ArgKind
///
/// What an instruction's argument indexes into.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    None,
    Constant,
    Variable,
    Function,
    Row,
}

impl Opcode {
    #[must_use]
    pub const fn decode(raw: u16) -> Option<Self> {
        let op = match raw {
            0 => Self::NoOp,
            1 => Self::PushConst,
            2 => Self::PushVar,
            3 => Self::Add,
            4 => Self::Sub,
            5 => Self::Mul,
            6 => Self::Div,
            7 => Self::AddVar,
            8 => Self::SubVar,
            9 => Self::MulVar,
            10 => Self::DivVar,
            11 => Self::AddConst,
            12 => Self::SubConst,
            13 => Self::MulConst,
            14 => Self::DivConst,
            15 => Self::Neg,
            16 => Self::NegVar,
            17 => Self::Call,
            18 => Self::Store,
            _ => return None,
        };
        Some(op)
    }

    #[must_use]
    pub const fn encode(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub const fn arg_kind(self) -> ArgKind {
        match self {
            Self::NoOp | Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Neg => ArgKind::None,
            Self::PushConst
            | Self::AddConst
            | Self::SubConst
            | Self::MulConst
            | Self::DivConst => ArgKind::Constant,
            Self::PushVar | Self::AddVar | Self::SubVar | Self::MulVar | Self::DivVar
            | Self::NegVar => ArgKind::Variable,
            Self::Call => ArgKind::Function,
            Self::Store => ArgKind::Row,
        }
    }

    /// Constant-valued counterpart of a variable-referencing opcode.
    ///
    /// `NegVar` is the one variable opcode without a counterpart; a stream
    /// that needs one fails translation.
    #[must_use]
    pub const fn constant_counterpart(self) -> Option<Self> {
        match self {
            Self::PushVar => Some(Self::PushConst),
            Self::AddVar => Some(Self::AddConst),
            Self::SubVar => Some(Self::SubConst),
            Self::MulVar => Some(Self::MulConst),
            Self::DivVar => Some(Self::DivConst),
            _ => None,
        }
    }
}

///
/// Intrinsic
///
/// Functions callable through [`Opcode::Call`].
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Intrinsic {
    Exp = 1,
    Log = 2,
    Sin = 3,
    Cos = 4,
    Sqrt = 5,
    Abs = 6,
    Power = 7,
}

impl Intrinsic {
    pub const COUNT: i32 = 7;

    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        let f = match id {
            1 => Self::Exp,
            2 => Self::Log,
            3 => Self::Sin,
            4 => Self::Cos,
            5 => Self::Sqrt,
            6 => Self::Abs,
            7 => Self::Power,
            _ => return None,
        };
        Some(f)
    }

    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

///
/// ConstPool
///
/// Shared pool of constants referenced by 1-based instruction arguments.
/// One pool serves every bytecode stream of an export.
///

#[derive(Debug, Default, Deref)]
pub struct ConstPool(Vec<f64>);

impl ConstPool {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Pool reference of `x`, interning it if absent. References are
    /// 1-based; equality is bitwise so distinct NaN payloads stay distinct.
    pub fn intern(&mut self, x: f64) -> i32 {
        let found = self
            .0
            .iter()
            .position(|entry| entry.to_bits() == x.to_bits());
        let index = found.unwrap_or_else(|| {
            self.0.push(x);
            self.0.len() - 1
        });

        i32::try_from(index + 1).unwrap_or(i32::MAX)
    }

    /// Entry behind a 1-based pool reference.
    #[must_use]
    pub fn entry(&self, arg: i32) -> Option<f64> {
        let index = usize::try_from(arg.checked_sub(1)?).ok()?;
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

///
/// Instr
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Instr {
    pub op: Opcode,
    pub arg: i32,
}

impl Instr {
    #[must_use]
    pub const fn new(op: Opcode, arg: i32) -> Self {
        Self { op, arg }
    }
}

///
/// Bytecode
///
/// One row's translated instruction stream. The trailing instruction is
/// always a store targeting 1 + the row's active index; translation
/// enforces this before the stream leaves the crate.
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytecode {
    instrs: Vec<Instr>,
}

impl Bytecode {
    #[must_use]
    pub(crate) fn from_instrs(instrs: Vec<Instr>) -> Self {
        Self { instrs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    #[must_use]
    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Raw instruction codes in the foreign convention.
    #[must_use]
    pub fn raw_codes(&self) -> Vec<u16> {
        self.instrs.iter().map(|i| i.op.encode()).collect()
    }

    /// Raw instruction arguments in the foreign convention.
    #[must_use]
    pub fn raw_args(&self) -> Vec<i32> {
        self.instrs.iter().map(|i| i.arg).collect()
    }

    /// Check every argument range and the trailing store target.
    ///
    /// Always performed, always fatal; this check is never demoted to a
    /// debug assertion.
    pub fn validate(
        &self,
        pool_len: usize,
        active_var_count: usize,
        active_row: usize,
    ) -> Result<(), BridgeError> {
        let Some(last) = self.instrs.last() else {
            return Err(BridgeError::bytecode_structural(
                "instruction stream is empty",
            ));
        };
        if last.op != Opcode::Store {
            return Err(BridgeError::bytecode_structural(format!(
                "instruction stream must end in a store, found {:?}",
                last.op
            )));
        }

        let pool_max = i32::try_from(pool_len).unwrap_or(i32::MAX);
        let var_max = i32::try_from(active_var_count).unwrap_or(i32::MAX);
        let row_target = i32::try_from(active_row + 1).unwrap_or(i32::MAX);

        for (pos, instr) in self.instrs.iter().enumerate() {
            match instr.op.arg_kind() {
                ArgKind::None => {}
                ArgKind::Constant => {
                    if instr.arg < 1 || instr.arg > pool_max {
                        return Err(BridgeError::bytecode_range(format!(
                            "instruction {pos}: constant argument {} outside pool range [1, {pool_max}]",
                            instr.arg
                        )));
                    }
                }
                ArgKind::Variable => {
                    if instr.arg < 1 || instr.arg > var_max {
                        return Err(BridgeError::bytecode_range(format!(
                            "instruction {pos}: variable argument {} outside active range [1, {var_max}]",
                            instr.arg
                        )));
                    }
                }
                ArgKind::Function => {
                    if Intrinsic::from_id(instr.arg).is_none() {
                        return Err(BridgeError::bytecode_range(format!(
                            "instruction {pos}: unknown intrinsic id {}",
                            instr.arg
                        )));
                    }
                }
                ArgKind::Row => {
                    if instr.arg != row_target {
                        return Err(BridgeError::bytecode_range(format!(
                            "instruction {pos}: store targets row argument {}, expected {row_target}",
                            instr.arg
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
