use crate::model::BasisStatus;
use std::fmt;

///
/// VarKind
///
/// Closed set of column kinds accepted by the foreign object.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VarKind {
    Continuous,
    Binary,
    Integer,
    Sos1,
    Sos2,
    SemiContinuous,
    SemiInteger,
}

impl VarKind {
    /// True for the kinds that must carry a SOS group id.
    #[must_use]
    pub const fn is_sos(self) -> bool {
        matches!(self, Self::Sos1 | Self::Sos2)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Continuous => "continuous",
            Self::Binary => "binary",
            Self::Integer => "integer",
            Self::Sos1 => "sos1",
            Self::Sos2 => "sos2",
            Self::SemiContinuous => "semicont",
            Self::SemiInteger => "semiint",
        };
        write!(f, "{label}")
    }
}

///
/// Variable
///
/// One column of the internal model. Levels and marginals use the internal
/// double conventions (IEEE infinities, quiet-NaN "not applicable");
/// conversion to the foreign sentinel doubles happens only at the boundary.
///

#[derive(Clone, Debug)]
pub struct Variable {
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    pub marginal: f64,
    pub basis: BasisStatus,
    /// SOS group id; required for SOS1/SOS2 members, ignored otherwise.
    pub sos_group: Option<u32>,
    /// Complementarity match: total index of the paired equation.
    pub paired_equation: Option<usize>,
    pub scale: f64,
    /// Branching priority passed through to the foreign column entry.
    pub priority: f64,
}

impl Variable {
    #[must_use]
    pub const fn new(kind: VarKind, lower: f64, upper: f64) -> Self {
        Self {
            kind,
            lower,
            upper,
            level: 0.0,
            marginal: 0.0,
            basis: BasisStatus::Unset,
            sos_group: None,
            paired_equation: None,
            scale: 1.0,
            priority: 1.0,
        }
    }

    /// Bounded continuous column.
    #[must_use]
    pub const fn continuous(lower: f64, upper: f64) -> Self {
        Self::new(VarKind::Continuous, lower, upper)
    }

    /// Continuous column unbounded on both sides.
    #[must_use]
    pub const fn free() -> Self {
        Self::new(VarKind::Continuous, f64::NEG_INFINITY, f64::INFINITY)
    }

    #[must_use]
    pub const fn binary() -> Self {
        Self::new(VarKind::Binary, 0.0, 1.0)
    }

    #[must_use]
    pub const fn integer(lower: f64, upper: f64) -> Self {
        Self::new(VarKind::Integer, lower, upper)
    }

    #[must_use]
    pub const fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub const fn with_marginal(mut self, marginal: f64) -> Self {
        self.marginal = marginal;
        self
    }

    #[must_use]
    pub const fn with_sos_group(mut self, group: u32) -> Self {
        self.sos_group = Some(group);
        self
    }

    /// Pair this column with its perpendicular equation.
    #[must_use]
    pub const fn with_paired_equation(mut self, equation: usize) -> Self {
        self.paired_equation = Some(equation);
        self
    }
}
