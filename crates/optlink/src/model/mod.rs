mod equation;
mod variable;

#[cfg(test)]
mod tests;

pub use equation::{Equation, ExprOrder, ExprSource, RawCode, RelKind};
pub use variable::{VarKind, Variable};

use crate::{error::BridgeError, graph::IncidenceGraph};
use std::fmt;

///
/// Sense
///
/// Optimization direction. The foreign convention ties marginal sign to
/// minimization; [`Sense::sign`] is the factor that makes internal
/// marginals sense-independent.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Minimize => "min",
            Self::Maximize => "max",
        };
        write!(f, "{label}")
    }
}

///
/// BasisStatus
///
/// Role of a variable or equation at a solved vertex. `Unset` marks an
/// item whose status has not been determined yet; reconciliation fills it
/// from bound proximity and multiplier sign.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BasisStatus {
    #[default]
    Unset,
    Lower,
    Upper,
    Basic,
    SuperBasic,
}

impl fmt::Display for BasisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unset => "unset",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Basic => "basic",
            Self::SuperBasic => "superbasic",
        };
        write!(f, "{label}")
    }
}

///
/// Model
///
/// The internally-held sparse algebraic model: variables, equations, and
/// the incidence graph linking them. Read-only input to an export; the
/// importer writes solved levels, marginals, and basis statuses back into
/// it.
///

#[derive(Debug)]
pub struct Model {
    variables: Vec<Variable>,
    equations: Vec<Equation>,
    graph: IncidenceGraph,
    sense: Sense,
    /// Objective variable, total index. `None` for models that are not of
    /// optimization type (pure complementarity / feasibility systems).
    objective: Option<usize>,
}

impl Model {
    #[must_use]
    pub fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            equations: Vec::new(),
            graph: IncidenceGraph::new(0, 0),
            sense,
            objective: None,
        }
    }

    /// Append a variable, returning its total index.
    pub fn push_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.rebuild_graph_shape();
        self.variables.len() - 1
    }

    /// Append an equation, returning its total index.
    pub fn push_equation(&mut self, equation: Equation) -> usize {
        self.equations.push(equation);
        self.rebuild_graph_shape();
        self.equations.len() - 1
    }

    /// Link a variable into an equation with a Jacobian coefficient.
    pub fn connect(
        &mut self,
        variable: usize,
        equation: usize,
        coefficient: f64,
        nonlinear: bool,
    ) -> Result<(), BridgeError> {
        self.graph.connect(variable, equation, coefficient, nonlinear)
    }

    /// Declare the objective variable, making this an optimization model.
    pub fn set_objective(&mut self, variable: usize) -> Result<(), BridgeError> {
        if variable >= self.variables.len() {
            return Err(BridgeError::graph_structural(format!(
                "objective variable {variable} outside the model (count {})",
                self.variables.len()
            )));
        }
        self.objective = Some(variable);
        Ok(())
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variables_mut(&mut self) -> &mut [Variable] {
        &mut self.variables
    }

    #[must_use]
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    #[must_use]
    pub fn equations_mut(&mut self) -> &mut [Equation] {
        &mut self.equations
    }

    #[must_use]
    pub const fn graph(&self) -> &IncidenceGraph {
        &self.graph
    }

    #[must_use]
    pub fn graph_mut(&mut self) -> &mut IncidenceGraph {
        &mut self.graph
    }

    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }

    #[must_use]
    pub const fn objective(&self) -> Option<usize> {
        self.objective
    }

    #[must_use]
    pub const fn is_optimization(&self) -> bool {
        self.objective.is_some()
    }

    // The graph arena is sized to the model; growing the model extends the
    // (still edge-free) tail of the adjacency lists.
    fn rebuild_graph_shape(&mut self) {
        self.graph.grow(self.variables.len(), self.equations.len());
    }
}
