use crate::model::BasisStatus;
use std::fmt;

///
/// RelKind
///
/// Relational kind of a row. The transcoder supports the first four;
/// external, conic, and logical rows are recognized so they can be
/// rejected by name.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelKind {
    Equality,
    GreaterEq,
    LessEq,
    /// Free (mapping) row; carries no bound.
    Free,
    External,
    Conic,
    Logical,
}

impl RelKind {
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Equality | Self::GreaterEq | Self::LessEq | Self::Free
        )
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Equality => "=e=",
            Self::GreaterEq => "=g=",
            Self::LessEq => "=l=",
            Self::Free => "=n=",
            Self::External => "=x=",
            Self::Conic => "=c=",
            Self::Logical => "=b=",
        };
        write!(f, "{label}")
    }
}

///
/// ExprOrder
///
/// Highest expression order present in a row.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExprOrder {
    Linear,
    Quadratic,
    Nonlinear,
}

impl ExprOrder {
    /// True when the row carries instruction code for the foreign
    /// expression evaluator.
    #[must_use]
    pub const fn has_code(self) -> bool {
        matches!(self, Self::Quadratic | Self::Nonlinear)
    }
}

///
/// RawCode
///
/// Instruction/argument arrays in the foreign evaluator's linear bytecode
/// convention. Produced either by an ancestor model (inherited) or by the
/// expression compiler collaborator (fresh); consumed by translation.
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCode {
    pub codes: Vec<u16>,
    pub args: Vec<i32>,
}

impl RawCode {
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

///
/// ExprSource
///
/// Provenance of a row's nonlinear instruction code.
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExprSource {
    /// Purely linear row; no code.
    #[default]
    None,
    /// Already compiled by an ancestor model under the same bytecode
    /// convention; variable arguments are 1-based total indices and must
    /// be remapped.
    Inherited(RawCode),
    /// Compiled on demand from the expression representation.
    Fresh,
}

///
/// Equation
///
/// One row of the internal model.
///

#[derive(Clone, Debug)]
pub struct Equation {
    pub kind: RelKind,
    pub rhs: f64,
    pub level: f64,
    pub marginal: f64,
    pub basis: BasisStatus,
    pub order: ExprOrder,
    /// Complementarity match: total index of the paired variable.
    pub paired_variable: Option<usize>,
    pub scale: f64,
    pub source: ExprSource,
}

impl Equation {
    #[must_use]
    pub const fn new(kind: RelKind, rhs: f64) -> Self {
        Self {
            kind,
            rhs,
            level: 0.0,
            marginal: 0.0,
            basis: BasisStatus::Unset,
            order: ExprOrder::Linear,
            paired_variable: None,
            scale: 1.0,
            source: ExprSource::None,
        }
    }

    #[must_use]
    pub const fn equality(rhs: f64) -> Self {
        Self::new(RelKind::Equality, rhs)
    }

    #[must_use]
    pub const fn greater_eq(rhs: f64) -> Self {
        Self::new(RelKind::GreaterEq, rhs)
    }

    #[must_use]
    pub const fn less_eq(rhs: f64) -> Self {
        Self::new(RelKind::LessEq, rhs)
    }

    #[must_use]
    pub const fn free_row() -> Self {
        Self::new(RelKind::Free, 0.0)
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

    /// Mark the row quadratic or nonlinear and attach its code source.
    #[must_use]
    pub fn with_code(mut self, order: ExprOrder, source: ExprSource) -> Self {
        self.order = order;
        self.source = source;
        self
    }

    /// Pair this row with its perpendicular variable.
    #[must_use]
    pub const fn with_paired_variable(mut self, variable: usize) -> Self {
        self.paired_variable = Some(variable);
        self
    }
}
