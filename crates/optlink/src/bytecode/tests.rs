use crate::{
    bytecode::{
        Bytecode, ConstPool, ExpressionCompiler, Instr, Intrinsic, NoFreshCode, Opcode,
        OpcodeTranslator,
    },
    error::{BridgeError, ErrorClass, ErrorOrigin},
    index::ActiveMap,
    model::{Equation, ExprOrder, ExprSource, RawCode},
};

fn inherited(codes: &[Opcode], args: &[i32]) -> ExprSource {
    ExprSource::Inherited(RawCode {
        codes: codes.iter().map(|op| op.encode()).collect(),
        args: args.to_vec(),
    })
}

fn nonlinear_equation(source: ExprSource) -> Equation {
    Equation::equality(0.0).with_code(ExprOrder::Nonlinear, source)
}

#[test]
fn opcode_raw_codes_round_trip() {
    for raw in 0..=18u16 {
        let op = Opcode::decode(raw).unwrap();
        assert_eq!(op.encode(), raw);
    }
    assert_eq!(Opcode::decode(19), None);
}

#[test]
fn every_variable_opcode_but_negvar_has_a_constant_counterpart() {
    assert_eq!(
        Opcode::PushVar.constant_counterpart(),
        Some(Opcode::PushConst)
    );
    assert_eq!(Opcode::AddVar.constant_counterpart(), Some(Opcode::AddConst));
    assert_eq!(Opcode::SubVar.constant_counterpart(), Some(Opcode::SubConst));
    assert_eq!(Opcode::MulVar.constant_counterpart(), Some(Opcode::MulConst));
    assert_eq!(Opcode::DivVar.constant_counterpart(), Some(Opcode::DivConst));
    assert_eq!(Opcode::NegVar.constant_counterpart(), None);
    assert_eq!(Opcode::Add.constant_counterpart(), None);
}

#[test]
fn pool_interning_deduplicates_bitwise() {
    let mut pool = ConstPool::new();
    let a = pool.intern(2.5);
    let b = pool.intern(2.5);
    let c = pool.intern(-2.5);
    assert_eq!(a, 1);
    assert_eq!(b, 1);
    assert_eq!(c, 2);
    assert_eq!(pool.entry(a), Some(2.5));
    assert_eq!(pool.entry(0), None);
    assert_eq!(pool.entry(3), None);

    // 0.0 and -0.0 differ bitwise and intern separately.
    assert_ne!(pool.intern(0.0), pool.intern(-0.0));
}

#[test]
fn validate_rejects_out_of_range_arguments() {
    let code = Bytecode::from_instrs(vec![
        Instr::new(Opcode::PushConst, 2),
        Instr::new(Opcode::Store, 1),
    ]);
    let err = code.validate(1, 4, 0).unwrap_err();
    assert_eq!(err.class, ErrorClass::Range);
    assert_eq!(err.origin, ErrorOrigin::Bytecode);

    let code = Bytecode::from_instrs(vec![
        Instr::new(Opcode::PushVar, 5),
        Instr::new(Opcode::Store, 1),
    ]);
    assert!(code.validate(0, 4, 0).is_err());

    let code = Bytecode::from_instrs(vec![
        Instr::new(Opcode::Call, Intrinsic::COUNT + 1),
        Instr::new(Opcode::Store, 1),
    ]);
    assert!(code.validate(0, 4, 0).is_err());
}

#[test]
fn validate_requires_a_trailing_store_on_the_own_row() {
    let empty = Bytecode::from_instrs(vec![]);
    assert_eq!(empty.validate(0, 0, 0).unwrap_err().class, ErrorClass::Structural);

    let no_store = Bytecode::from_instrs(vec![Instr::new(Opcode::Add, 0)]);
    assert!(no_store.validate(0, 0, 0).is_err());

    let wrong_row = Bytecode::from_instrs(vec![Instr::new(Opcode::Store, 3)]);
    assert_eq!(wrong_row.validate(0, 0, 1).unwrap_err().class, ErrorClass::Range);

    let ok = Bytecode::from_instrs(vec![Instr::new(Opcode::Store, 2)]);
    ok.validate(0, 0, 1).unwrap();
}

#[test]
fn inherited_streams_are_remapped_to_active_numbering() {
    // Variables 0..4; variable 1 dropped.
    let levels = [0.0, 7.5, 0.0, 0.0];
    let vars = ActiveMap::build(4, |t| t != 1);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    // push x2, add x3, store (total numbering, 1-based args).
    let equ = nonlinear_equation(inherited(
        &[Opcode::PushVar, Opcode::AddVar, Opcode::Store],
        &[3, 4, 9],
    ));
    let code = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap();

    // x2 -> active 1, x3 -> active 2; store rewritten to own row.
    assert_eq!(
        code.instrs(),
        &[
            Instr::new(Opcode::PushVar, 2),
            Instr::new(Opcode::AddVar, 3),
            Instr::new(Opcode::Store, 1),
        ]
    );
}

#[test]
fn deleted_variables_fold_into_the_constant_pool() {
    let levels = [0.0, 7.5, 0.0];
    let vars = ActiveMap::build(3, |t| t != 1);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    // push x0, mul x1 (deleted), store.
    let equ = nonlinear_equation(inherited(
        &[Opcode::PushVar, Opcode::MulVar, Opcode::Store],
        &[1, 2, 1],
    ));
    let code = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap();

    assert_eq!(
        code.instrs(),
        &[
            Instr::new(Opcode::PushVar, 1),
            Instr::new(Opcode::MulConst, 1),
            Instr::new(Opcode::Store, 1),
        ]
    );
    // The constant is the deleted variable's current level.
    assert_eq!(pool.entry(1), Some(7.5));
}

#[test]
fn negvar_of_a_deleted_variable_fails_translation() {
    let levels = [1.0];
    let vars = ActiveMap::build(1, |_| false);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(inherited(&[Opcode::NegVar, Opcode::Store], &[1, 1]));
    let err = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(err.message.contains("NegVar"));
}

#[test]
fn unknown_inherited_opcode_is_unsupported_by_name() {
    let levels = [0.0];
    let vars = ActiveMap::build(1, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(ExprSource::Inherited(RawCode {
        codes: vec![99, Opcode::Store.encode()],
        args: vec![0, 1],
    }));
    let err = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(err.message.contains("99"));
}

#[test]
fn mismatched_code_and_argument_arrays_are_structural() {
    let levels = [0.0];
    let vars = ActiveMap::build(1, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(ExprSource::Inherited(RawCode {
        codes: vec![Opcode::Store.encode()],
        args: vec![],
    }));
    let err = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Structural);
}

struct SquareCompiler;

impl ExpressionCompiler for SquareCompiler {
    fn compile(
        &self,
        _equation_total: usize,
        variables: &ActiveMap,
        pool: &mut ConstPool,
    ) -> Result<RawCode, BridgeError> {
        // x0^2 - c, already in active numbering.
        let active = i32::try_from(variables.active_of(0).unwrap() + 1).unwrap();
        let c = pool.intern(4.0);
        Ok(RawCode {
            codes: vec![
                Opcode::PushVar.encode(),
                Opcode::MulVar.encode(),
                Opcode::SubConst.encode(),
                Opcode::Store.encode(),
            ],
            args: vec![active, active, c, 0],
        })
    }
}

#[test]
fn fresh_streams_come_from_the_compiler_and_are_sealed() {
    let levels = [2.0];
    let vars = ActiveMap::build(1, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(ExprSource::Fresh);
    let code = translator
        .translate(0, &equ, 5, &mut pool, &SquareCompiler)
        .unwrap();

    assert_eq!(code.len(), 4);
    // Trailing store targets 1 + active row regardless of compiler output.
    assert_eq!(code.instrs().last(), Some(&Instr::new(Opcode::Store, 6)));
}

#[test]
fn fresh_translation_without_a_compiler_is_unsupported() {
    let levels = [0.0];
    let vars = ActiveMap::build(1, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(ExprSource::Fresh);
    let err = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn rows_without_a_code_source_cannot_be_translated() {
    let levels = [0.0];
    let vars = ActiveMap::build(1, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(ExprSource::None);
    let err = translator
        .translate(0, &equ, 0, &mut pool, &NoFreshCode)
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Structural);
}

#[test]
fn validate_row_check_accepts_the_sealed_stream() {
    // The sealed stream satisfies the evaluator's contract: trailing store
    // argument equals 1 + the row's active index.
    let levels = [0.0, 0.0];
    let vars = ActiveMap::build(2, |_| true);
    let translator = OpcodeTranslator::new(&levels, &vars);
    let mut pool = ConstPool::new();

    let equ = nonlinear_equation(inherited(
        &[Opcode::PushVar, Opcode::Store],
        &[2, 7],
    ));
    for active_row in [0usize, 3, 11] {
        let code = translator
            .translate(0, &equ, active_row, &mut pool, &NoFreshCode)
            .unwrap();
        let target = i32::try_from(active_row + 1).unwrap();
        assert_eq!(code.raw_args().last(), Some(&target));
    }
}
