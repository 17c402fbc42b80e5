
use crate::error::BridgeError;

///
/// IncidenceGraph
///
/// Bipartite adjacency between variables and equations: one arena slot per
/// edge, addressed by index, with separate per-equation (row) and
/// per-variable (column) edge-id lists. Both directions observe the same
/// arena slot, so the coefficient and nonlinearity flag seen from a row
/// traversal and a column traversal of the same pair are identical by
/// construction; [`IncidenceGraph::debug_assert_bidirectional`] re-checks
/// the list bookkeeping in debug builds.
///
/// Traversal order is insertion order; it is not required to be sorted.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncidenceEdge {
    pub variable: usize,
    pub equation: usize,
    pub coefficient: f64,
    pub nonlinear: bool,
}

#[derive(Debug, Default)]
pub struct IncidenceGraph {
    edges: Vec<IncidenceEdge>,
    by_equation: Vec<Vec<usize>>,
    by_variable: Vec<Vec<usize>>,
    /// Equations structurally removed from the graph. A detached equation
    /// has no row list and must also be dropped by any export filter.
    detached: Vec<bool>,
}

impl IncidenceGraph {
    #[must_use]
    pub fn new(variable_count: usize, equation_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            by_equation: vec![Vec::new(); equation_count],
            by_variable: vec![Vec::new(); variable_count],
            detached: vec![false; equation_count],
        }
    }

    /// Extend the adjacency lists to cover at least the given counts.
    /// Existing edges and detachment marks are untouched.
    pub fn grow(&mut self, variable_count: usize, equation_count: usize) {
        if self.by_variable.len() < variable_count {
            self.by_variable.resize_with(variable_count, Vec::new);
        }
        if self.by_equation.len() < equation_count {
            self.by_equation.resize_with(equation_count, Vec::new);
            self.detached.resize(equation_count, false);
        }
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.by_variable.len()
    }

    #[must_use]
    pub fn equation_count(&self) -> usize {
        self.by_equation.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Link one variable into one equation.
    pub fn connect(
        &mut self,
        variable: usize,
        equation: usize,
        coefficient: f64,
        nonlinear: bool,
    ) -> Result<(), BridgeError> {
        if variable >= self.by_variable.len() {
            return Err(BridgeError::graph_structural(format!(
                "edge references variable {variable} outside the model (count {})",
                self.by_variable.len()
            )));
        }
        if equation >= self.by_equation.len() {
            return Err(BridgeError::graph_structural(format!(
                "edge references equation {equation} outside the model (count {})",
                self.by_equation.len()
            )));
        }
        if self.detached[equation] {
            return Err(BridgeError::graph_structural(format!(
                "edge references detached equation {equation}"
            )));
        }

        let id = self.edges.len();
        self.edges.push(IncidenceEdge {
            variable,
            equation,
            coefficient,
            nonlinear,
        });
        self.by_equation[equation].push(id);
        self.by_variable[variable].push(id);

        Ok(())
    }

    /// Structurally remove an equation: unlink all of its edges from both
    /// sides and mark it absent. Any later export must also drop it.
    pub fn detach_equation(&mut self, equation: usize) {
        let Some(row) = self.by_equation.get_mut(equation) else {
            return;
        };

        let removed = std::mem::take(row);
        for id in &removed {
            let variable = self.edges[*id].variable;
            self.by_variable[variable].retain(|e| e != id);
        }
        self.detached[equation] = true;
    }

    #[must_use]
    pub fn is_detached(&self, equation: usize) -> bool {
        self.detached.get(equation).copied().unwrap_or(false)
    }

    /// Number of equations structurally removed from the graph.
    #[must_use]
    pub fn detached_equation_count(&self) -> usize {
        self.detached.iter().filter(|d| **d).count()
    }

    /// Edges of one equation, insertion order.
    pub fn row_edges(&self, equation: usize) -> impl Iterator<Item = &IncidenceEdge> {
        self.by_equation
            .get(equation)
            .into_iter()
            .flatten()
            .map(|id| &self.edges[*id])
    }

    /// Edges of one variable, insertion order.
    pub fn col_edges(&self, variable: usize) -> impl Iterator<Item = &IncidenceEdge> {
        self.by_variable
            .get(variable)
            .into_iter()
            .flatten()
            .map(|id| &self.edges[*id])
    }

    /// Widest row (by edge count) over all equations.
    #[must_use]
    pub fn max_row_width(&self) -> usize {
        self.by_equation.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Widest column (by edge count) over all variables.
    #[must_use]
    pub fn max_col_width(&self) -> usize {
        self.by_variable.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Debug re-check that every edge id appears exactly once in its row
    /// list and exactly once in its column list.
    pub fn debug_assert_bidirectional(&self) {
        #[cfg(debug_assertions)]
        for (id, edge) in self.edges.iter().enumerate() {
            if self.detached[edge.equation] {
                continue;
            }
            debug_assert_eq!(
                self.by_equation[edge.equation]
                    .iter()
                    .filter(|e| **e == id)
                    .count(),
                1,
                "edge {id} must appear exactly once in equation {} row list",
                edge.equation
            );
            debug_assert_eq!(
                self.by_variable[edge.variable]
                    .iter()
                    .filter(|e| **e == id)
                    .count(),
                1,
                "edge {id} must appear exactly once in variable {} column list",
                edge.variable
            );
        }
    }
}
