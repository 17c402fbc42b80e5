use crate::{
    bytecode::NoFreshCode,
    error::{ErrorClass, ErrorOrigin},
    export::{ActiveSpaces, ExportPhase, JacobianScratch, ModelExporter, basis},
    import::SolutionImporter,
    model::{BasisStatus, Equation, Model, Sense, Variable},
    object::{CapabilityTable, DenseModelObject, EntryPoint, SolverLibrary},
    value::is_not_available,
};

fn reference_model(sense: Sense) -> Model {
    let mut model = Model::new(sense);
    let x1 = model.push_variable(Variable::continuous(0.0, 10.0));
    let x2 = model.push_variable(Variable::continuous(0.0, 10.0));
    let x3 = model.push_variable(Variable::free());
    let e1 = model.push_equation(Equation::equality(5.0));
    let e2 = model.push_equation(Equation::greater_eq(0.0));

    model.connect(x1, e1, 1.0, false).unwrap();
    model.connect(x2, e1, 1.0, false).unwrap();
    model.connect(x1, e2, 1.0, false).unwrap();
    model.connect(x3, e2, -1.0, false).unwrap();

    model
}

fn exported(model: &Model) -> (DenseModelObject, ActiveSpaces) {
    let library = SolverLibrary::new();
    let mut object = DenseModelObject::new(library.attach(), 2, 3, 0);
    let mut exporter = ModelExporter::new(model);
    let mut scratch = JacobianScratch::new();
    let outcome = exporter
        .export(&mut object, &mut scratch, |_| true, |_| true, &NoFreshCode)
        .unwrap();
    assert_eq!(exporter.phase(), ExportPhase::Finalized);
    (object, outcome.spaces)
}

fn solve_reference(object: &mut DenseModelObject) {
    // Solved point: x1=3, x2=2, x3=1; e1 marginal 0.5, e2 marginal 0.
    object
        .store_col_solution(0, 3.0, 0.0, BasisStatus::Unset)
        .unwrap();
    object
        .store_col_solution(1, 2.0, 0.0, BasisStatus::Unset)
        .unwrap();
    object
        .store_col_solution(2, 1.0, 0.0, BasisStatus::Unset)
        .unwrap();
    object
        .store_row_solution(0, 5.0, 0.5, BasisStatus::Unset)
        .unwrap();
    object
        .store_row_solution(1, 2.0, 0.0, BasisStatus::Unset)
        .unwrap();
}

#[test]
fn export_then_import_reproduces_the_solved_point() {
    let mut model = reference_model(Sense::Minimize);
    let (mut object, spaces) = exported(&model);
    solve_reference(&mut object);

    SolutionImporter::new(&spaces)
        .import(&mut model, &object)
        .unwrap();

    let tol = 1.0e-9;
    assert!((model.variables()[0].level - 3.0).abs() < tol);
    assert!((model.variables()[1].level - 2.0).abs() < tol);
    assert!((model.variables()[2].level - 1.0).abs() < tol);
    assert!((model.equations()[0].marginal - 0.5).abs() < tol);
    assert!(model.equations()[1].marginal.abs() < tol);

    // Reconciling the imported point lands each item where its bounds say.
    let sense = model.sense();
    let tol = 1.0e-6;
    assert_eq!(
        basis::reconcile_variable(&model.variables()[0], sense, tol),
        BasisStatus::SuperBasic
    );
    assert_eq!(
        basis::reconcile_variable(&model.variables()[2], sense, tol),
        BasisStatus::SuperBasic
    );
    assert_eq!(
        basis::reconcile_equation(&model.equations()[0], sense, tol),
        BasisStatus::Lower
    );
    assert_eq!(
        basis::reconcile_equation(&model.equations()[1], sense, tol),
        BasisStatus::SuperBasic
    );
}

#[test]
fn maximization_negates_every_imported_marginal() {
    let mut min_model = reference_model(Sense::Minimize);
    let (mut object, spaces) = exported(&min_model);
    object
        .store_col_solution(0, 3.0, 1.25, BasisStatus::Basic)
        .unwrap();
    object
        .store_col_solution(1, 2.0, -0.75, BasisStatus::Lower)
        .unwrap();
    object
        .store_col_solution(2, 1.0, 0.0, BasisStatus::SuperBasic)
        .unwrap();
    object
        .store_row_solution(0, 5.0, 0.5, BasisStatus::Lower)
        .unwrap();
    object
        .store_row_solution(1, 2.0, -2.0, BasisStatus::Basic)
        .unwrap();

    SolutionImporter::new(&spaces)
        .import(&mut min_model, &object)
        .unwrap();

    // Same raw values, importing under the opposite sense.
    let mut max_model = reference_model(Sense::Maximize);
    SolutionImporter::new(&spaces)
        .import(&mut max_model, &object)
        .unwrap();

    for (min_var, max_var) in min_model.variables().iter().zip(max_model.variables()) {
        assert_eq!(max_var.marginal, -min_var.marginal);
        assert_eq!(max_var.level, min_var.level);
        assert_eq!(max_var.basis, min_var.basis);
    }
    for (min_equ, max_equ) in min_model.equations().iter().zip(max_model.equations()) {
        assert_eq!(max_equ.marginal, -min_equ.marginal);
    }
}

#[test]
fn not_available_marginals_keep_their_marker_under_maximization() {
    let mut model = reference_model(Sense::Maximize);
    let (mut object, spaces) = exported(&model);
    solve_reference(&mut object);
    object
        .store_col_solution(2, 1.0, DenseModelObject::NOT_AVAILABLE, BasisStatus::Unset)
        .unwrap();

    SolutionImporter::new(&spaces)
        .import(&mut model, &object)
        .unwrap();

    assert!(is_not_available(model.variables()[2].marginal));
}

#[test]
fn dropped_items_come_back_not_available_and_unset() {
    let mut model = reference_model(Sense::Minimize);
    model.graph_mut().detach_equation(1);

    let library = SolverLibrary::new();
    let mut object = DenseModelObject::new(library.attach(), 1, 2, 0);
    let mut exporter = ModelExporter::new(&model);
    let mut scratch = JacobianScratch::new();
    let outcome = exporter
        .export(
            &mut object,
            &mut scratch,
            |v| v != 2,
            |e| e != 1,
            &NoFreshCode,
        )
        .unwrap();

    object
        .store_col_solution(0, 3.0, 0.0, BasisStatus::Basic)
        .unwrap();
    object
        .store_col_solution(1, 2.0, 0.0, BasisStatus::Basic)
        .unwrap();
    object
        .store_row_solution(0, 5.0, 0.5, BasisStatus::Lower)
        .unwrap();

    // Pre-set values on the dropped items must be overwritten.
    model.variables_mut()[2].level = 9.0;
    model.variables_mut()[2].basis = BasisStatus::Basic;

    SolutionImporter::new(&outcome.spaces)
        .import(&mut model, &object)
        .unwrap();

    assert_eq!(model.variables()[0].level, 3.0);
    assert!(is_not_available(model.variables()[2].level));
    assert!(is_not_available(model.variables()[2].marginal));
    assert_eq!(model.variables()[2].basis, BasisStatus::Unset);
    assert!(is_not_available(model.equations()[1].level));
    assert_eq!(model.equations()[1].basis, BasisStatus::Unset);
}

#[test]
fn shape_disagreement_is_a_structural_import_error() {
    let model = reference_model(Sense::Minimize);
    let (_, spaces) = exported(&model);

    let library = SolverLibrary::new();
    let other = DenseModelObject::new(library.attach(), 0, 0, 0);
    let mut target = reference_model(Sense::Minimize);
    let err = SolutionImporter::new(&spaces)
        .import(&mut target, &other)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Structural);
    assert_eq!(err.origin, ErrorOrigin::Import);
}

#[test]
fn missing_read_entry_point_fails_by_symbol() {
    let model = reference_model(Sense::Minimize);
    let (_, spaces) = exported(&model);

    let library = SolverLibrary::new();
    let object = DenseModelObject::with_capabilities(
        library.attach(),
        0,
        0,
        0,
        CapabilityTable::with_missing(&[EntryPoint::ReadCols]),
    );
    let mut target = reference_model(Sense::Minimize);
    let err = SolutionImporter::new(&spaces)
        .import(&mut target, &object)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(err.message.contains("readcol"));
}
