use crate::{
    bytecode::{ArgKind, Bytecode, ConstPool, Instr, Opcode},
    error::BridgeError,
    index::ActiveMap,
    model::{Equation, ExprSource, RawCode},
};

///
/// ExpressionCompiler
///
/// Collaborator that compiles a row's expression representation into the
/// foreign bytecode convention. Only the output contract is consumed here:
/// instruction/argument arrays plus code length, with variable arguments
/// already in 1-based active numbering and constants interned into the
/// shared pool.
///

pub trait ExpressionCompiler {
    fn compile(
        &self,
        equation_total: usize,
        variables: &ActiveMap,
        pool: &mut ConstPool,
    ) -> Result<RawCode, BridgeError>;
}

///
/// NoFreshCode
///
/// Stub compiler for callers whose rows are all inherited. Invoking it is
/// an unsupported-construct failure.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoFreshCode;

impl ExpressionCompiler for NoFreshCode {
    fn compile(
        &self,
        equation_total: usize,
        _variables: &ActiveMap,
        _pool: &mut ConstPool,
    ) -> Result<RawCode, BridgeError> {
        Err(BridgeError::bytecode_unsupported(format!(
            "no expression compiler bound, cannot compile fresh code for equation {equation_total}"
        )))
    }
}

///
/// OpcodeTranslator
///
/// Turns one row's code source into a validated instruction stream.
///
/// Inherited streams are copied with every variable argument remapped from
/// 1-based total to 1-based active numbering; a variable filtered out of
/// the active space is folded into the constant pool at its current level,
/// through the opcode's constant counterpart. Fresh streams come from the
/// expression compiler already in active numbering.
///
/// Either way the trailing store is rewritten to target 1 + the row's
/// active index, and the full range validation of [`Bytecode::validate`]
/// runs before the stream is returned.
///

pub struct OpcodeTranslator<'a> {
    variable_levels: &'a [f64],
    variables: &'a ActiveMap,
}

impl<'a> OpcodeTranslator<'a> {
    #[must_use]
    pub const fn new(variable_levels: &'a [f64], variables: &'a ActiveMap) -> Self {
        Self {
            variable_levels,
            variables,
        }
    }

    /// Translate one quadratic or nonlinear row.
    pub fn translate(
        &self,
        equation_total: usize,
        equation: &Equation,
        active_row: usize,
        pool: &mut ConstPool,
        compiler: &dyn ExpressionCompiler,
    ) -> Result<Bytecode, BridgeError> {
        let raw = match &equation.source {
            ExprSource::None => {
                return Err(BridgeError::bytecode_structural(format!(
                    "equation {equation_total} is classified {:?} but carries no code source",
                    equation.order
                )));
            }
            ExprSource::Inherited(raw) => self.remap_inherited(equation_total, raw, pool)?,
            ExprSource::Fresh => {
                let compiled = compiler.compile(equation_total, self.variables, pool)?;
                Self::decode_fresh(equation_total, &compiled)?
            }
        };

        let code = Self::seal(raw, active_row)?;
        code.validate(pool.len(), self.variables.active_count(), active_row)?;

        Ok(code)
    }

    /// Copy an ancestor stream, remapping variable arguments.
    fn remap_inherited(
        &self,
        equation_total: usize,
        raw: &RawCode,
        pool: &mut ConstPool,
    ) -> Result<Vec<Instr>, BridgeError> {
        if raw.codes.len() != raw.args.len() {
            return Err(BridgeError::bytecode_structural(format!(
                "equation {equation_total}: instruction and argument arrays differ in length ({} vs {})",
                raw.codes.len(),
                raw.args.len()
            )));
        }

        let mut out = Vec::with_capacity(raw.len());
        for (pos, (&code, &arg)) in raw.codes.iter().zip(&raw.args).enumerate() {
            let op = Opcode::decode(code).ok_or_else(|| {
                BridgeError::bytecode_unsupported(format!(
                    "equation {equation_total}: unknown opcode {code} at instruction {pos}"
                ))
            })?;

            if op.arg_kind() == ArgKind::Variable {
                out.push(self.remap_variable(equation_total, pos, op, arg, pool)?);
            } else {
                out.push(Instr::new(op, arg));
            }
        }

        Ok(out)
    }

    fn remap_variable(
        &self,
        equation_total: usize,
        pos: usize,
        op: Opcode,
        arg: i32,
        pool: &mut ConstPool,
    ) -> Result<Instr, BridgeError> {
        let total = usize::try_from(arg - 1).map_err(|_| {
            BridgeError::bytecode_range(format!(
                "equation {equation_total}: variable argument {arg} at instruction {pos} is not positive"
            ))
        })?;
        if total >= self.variables.total_len() {
            return Err(BridgeError::bytecode_range(format!(
                "equation {equation_total}: variable argument {arg} at instruction {pos} outside the total space [1, {}]",
                self.variables.total_len()
            )));
        }

        match self.variables.active_of(total) {
            Some(active) => Ok(Instr::new(
                op,
                i32::try_from(active + 1).unwrap_or(i32::MAX),
            )),
            None => {
                // The referenced variable is filtered out; fold it in as a
                // constant at its current level.
                let counterpart = op.constant_counterpart().ok_or_else(|| {
                    BridgeError::bytecode_unsupported(format!(
                        "equation {equation_total}: opcode {op:?} references deleted variable {total} and has no constant counterpart"
                    ))
                })?;
                let level = self.variable_levels.get(total).copied().unwrap_or(0.0);
                Ok(Instr::new(counterpart, pool.intern(level)))
            }
        }
    }

    /// Decode a freshly compiled stream; no remapping, the compiler already
    /// emits active numbering.
    fn decode_fresh(equation_total: usize, raw: &RawCode) -> Result<Vec<Instr>, BridgeError> {
        if raw.codes.len() != raw.args.len() {
            return Err(BridgeError::bytecode_structural(format!(
                "equation {equation_total}: compiler returned instruction and argument arrays of differing length ({} vs {})",
                raw.codes.len(),
                raw.args.len()
            )));
        }

        raw.codes
            .iter()
            .zip(&raw.args)
            .enumerate()
            .map(|(pos, (&code, &arg))| {
                Opcode::decode(code)
                    .map(|op| Instr::new(op, arg))
                    .ok_or_else(|| {
                        BridgeError::bytecode_unsupported(format!(
                            "equation {equation_total}: compiler emitted unknown opcode {code} at instruction {pos}"
                        ))
                    })
            })
            .collect()
    }

    /// Rewrite the trailing store to target this row's active index.
    fn seal(mut instrs: Vec<Instr>, active_row: usize) -> Result<Bytecode, BridgeError> {
        let Some(last) = instrs.last_mut() else {
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
        last.arg = i32::try_from(active_row + 1).unwrap_or(i32::MAX);

        Ok(Bytecode::from_instrs(instrs))
    }
}
