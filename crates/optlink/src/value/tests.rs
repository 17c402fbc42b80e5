use crate::value::{NOT_AVAILABLE, Sentinels, Value, is_not_available, to_external, to_internal};
use proptest::prelude::*;

const SENTINELS: Sentinels = Sentinels {
    plus_inf: 1.0e300,
    minus_inf: -1.0e300,
    not_available: 2.0e300,
};

#[test]
fn sentinels_map_to_themselves_in_both_directions() {
    assert_eq!(to_internal(SENTINELS.plus_inf, &SENTINELS), f64::INFINITY);
    assert_eq!(
        to_internal(SENTINELS.minus_inf, &SENTINELS),
        f64::NEG_INFINITY
    );
    assert!(is_not_available(to_internal(
        SENTINELS.not_available,
        &SENTINELS
    )));

    assert_eq!(to_external(f64::INFINITY, &SENTINELS), SENTINELS.plus_inf);
    assert_eq!(
        to_external(f64::NEG_INFINITY, &SENTINELS),
        SENTINELS.minus_inf
    );
    assert_eq!(to_external(NOT_AVAILABLE, &SENTINELS), SENTINELS.not_available);
}

#[test]
fn not_available_marker_is_distinct_from_plain_nan() {
    assert!(NOT_AVAILABLE.is_nan());
    assert!(is_not_available(NOT_AVAILABLE));
    assert!(!is_not_available(f64::NAN));
}

#[test]
fn plain_nan_encodes_as_zero() {
    // Non-finite values outside the three conventions collapse to 0.0.
    assert_eq!(to_external(f64::NAN, &SENTINELS), 0.0);
    assert_eq!(Value::classify(f64::NAN), Value::Finite(0.0));
}

#[test]
fn finite_values_pass_through_unchanged() {
    for x in [0.0, -0.0, 1.5, -2.25e10, f64::MIN_POSITIVE, 1.0e299] {
        assert_eq!(to_external(x, &SENTINELS), x);
        assert_eq!(to_internal(x, &SENTINELS), x);
    }
}

#[test]
fn classify_tags_each_convention() {
    assert_eq!(Value::classify(3.5), Value::Finite(3.5));
    assert_eq!(Value::classify(f64::INFINITY), Value::PlusInf);
    assert_eq!(Value::classify(f64::NEG_INFINITY), Value::MinusInf);
    assert_eq!(Value::classify(NOT_AVAILABLE), Value::NotAvailable);
}

fn arb_sentinels() -> impl Strategy<Value = Sentinels> {
    // Distinct reserved magnitudes well outside the finite test range.
    (1..=4u8).prop_map(|salt| {
        let base = f64::from(salt).mul_add(1.0e297, 1.0e300);
        Sentinels {
            plus_inf: base,
            minus_inf: -base,
            not_available: 2.0 * base,
        }
    })
}

proptest! {
    #[test]
    fn round_trips_finite_values(
        x in -1.0e30..1.0e30f64,
        sentinels in arb_sentinels(),
    ) {
        prop_assert_eq!(to_internal(to_external(x, &sentinels), &sentinels), x);
    }

    #[test]
    fn external_round_trip_fixes_each_sentinel(sentinels in arb_sentinels()) {
        for raw in [sentinels.plus_inf, sentinels.minus_inf, sentinels.not_available] {
            let through = to_external(to_internal(raw, &sentinels), &sentinels);
            prop_assert_eq!(through, raw);
        }
    }
}
