use crate::model::{BasisStatus, Equation, RelKind, Sense, Variable};

///
/// Basis reconciliation
///
/// Fills in a basis status for items that reach the boundary without one,
/// from bound proximity and multiplier sign. An item whose status is
/// already set keeps it, which makes reconciliation idempotent.
///

/// Basis status of one variable.
#[must_use]
pub fn reconcile_variable(variable: &Variable, sense: Sense, tolerance: f64) -> BasisStatus {
    if variable.basis != BasisStatus::Unset {
        return variable.basis;
    }

    bound_status(
        variable.lower,
        variable.upper,
        variable.level,
        variable.marginal,
        sense,
        tolerance,
    )
}

/// Basis status of one equation. Its relational kind stands in for the
/// two bounds: equality is fixed at the RHS, inequalities carry the RHS
/// as their single bound, free rows have none.
#[must_use]
pub fn reconcile_equation(equation: &Equation, sense: Sense, tolerance: f64) -> BasisStatus {
    if equation.basis != BasisStatus::Unset {
        return equation.basis;
    }

    match equation.kind {
        RelKind::Equality => bound_status(
            equation.rhs,
            equation.rhs,
            equation.level,
            equation.marginal,
            sense,
            tolerance,
        ),
        RelKind::GreaterEq => bound_status(
            equation.rhs,
            f64::INFINITY,
            equation.level,
            equation.marginal,
            sense,
            tolerance,
        ),
        RelKind::LessEq => bound_status(
            f64::NEG_INFINITY,
            equation.rhs,
            equation.level,
            equation.marginal,
            sense,
            tolerance,
        ),
        // Free rows are superbasic unless a status was already assigned.
        RelKind::Free | RelKind::External | RelKind::Conic | RelKind::Logical => {
            BasisStatus::SuperBasic
        }
    }
}

fn bound_status(
    lower: f64,
    upper: f64,
    level: f64,
    marginal: f64,
    sense: Sense,
    tolerance: f64,
) -> BasisStatus {
    match (lower.is_finite(), upper.is_finite()) {
        (true, true) if (lower - upper).abs() < tolerance => {
            // Fixed: the multiplier sign decides which bound carries it.
            if marginal * sense.sign() >= 0.0 {
                BasisStatus::Lower
            } else {
                BasisStatus::Upper
            }
        }
        (true, true) => {
            if (level - lower).abs() < tolerance {
                BasisStatus::Lower
            } else if (level - upper).abs() < tolerance {
                BasisStatus::Upper
            } else {
                BasisStatus::SuperBasic
            }
        }
        (true, false) => {
            if (level - lower).abs() < tolerance {
                BasisStatus::Lower
            } else {
                BasisStatus::SuperBasic
            }
        }
        (false, true) => {
            if (level - upper).abs() < tolerance {
                BasisStatus::Upper
            } else {
                BasisStatus::SuperBasic
            }
        }
        (false, false) => BasisStatus::SuperBasic,
    }
}
