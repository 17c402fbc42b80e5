use crate::model::{BasisStatus, Equation, Model, RelKind, Sense, VarKind, Variable};

#[test]
fn pushing_grows_the_graph_shape() {
    let mut model = Model::new(Sense::Minimize);
    let x = model.push_variable(Variable::continuous(0.0, 10.0));
    let e = model.push_equation(Equation::equality(5.0));

    model.connect(x, e, 1.0, false).unwrap();
    assert_eq!(model.graph().edge_count(), 1);
    assert_eq!(model.graph().variable_count(), 1);
    assert_eq!(model.graph().equation_count(), 1);

    // Later growth keeps earlier edges intact.
    let y = model.push_variable(Variable::free());
    model.connect(y, e, -1.0, true).unwrap();
    assert_eq!(model.graph().edge_count(), 2);
}

#[test]
fn objective_must_reference_an_existing_variable() {
    let mut model = Model::new(Sense::Maximize);
    assert!(model.set_objective(0).is_err());
    assert!(!model.is_optimization());

    let z = model.push_variable(Variable::free());
    model.set_objective(z).unwrap();
    assert!(model.is_optimization());
    assert_eq!(model.objective(), Some(z));
}

#[test]
fn sense_sign_flips_for_maximization() {
    assert_eq!(Sense::Minimize.sign(), 1.0);
    assert_eq!(Sense::Maximize.sign(), -1.0);
}

#[test]
fn variable_constructors_set_the_expected_kind_and_bounds() {
    let b = Variable::binary();
    assert_eq!(b.kind, VarKind::Binary);
    assert_eq!((b.lower, b.upper), (0.0, 1.0));
    assert_eq!(b.basis, BasisStatus::Unset);
    assert_eq!(b.scale, 1.0);
    assert_eq!(b.priority, 1.0);

    let f = Variable::free();
    assert_eq!(f.lower, f64::NEG_INFINITY);
    assert_eq!(f.upper, f64::INFINITY);
    assert!(VarKind::Sos1.is_sos());
    assert!(!VarKind::Continuous.is_sos());
}

#[test]
fn only_the_first_four_relational_kinds_are_supported() {
    for kind in [
        RelKind::Equality,
        RelKind::GreaterEq,
        RelKind::LessEq,
        RelKind::Free,
    ] {
        assert!(kind.is_supported());
    }
    for kind in [RelKind::External, RelKind::Conic, RelKind::Logical] {
        assert!(!kind.is_supported());
    }
}
