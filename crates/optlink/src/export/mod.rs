pub mod basis;


use crate::{
    DEFAULT_BASIS_TOLERANCE,
    bytecode::{ConstPool, ExpressionCompiler, OpcodeTranslator},
    error::{BridgeError, ErrorOrigin},
    index::ActiveMap,
    model::Model,
    object::{ColSpec, EntryPoint, RowSpec, SolverObject},
    obs::sink::{self, MetricsEvent},
    value::{Sentinels, to_external},
};
use serde::Serialize;
use std::fmt;

///
/// ExportPhase
///
/// Strictly ordered progress of one export. Every failure lands in
/// `Aborted`; there are no retries and no partial-success state, so the
/// caller discards the foreign object whenever the phase is not
/// `Finalized`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportPhase {
    Start,
    IndexesBuilt,
    RowsAdded,
    ColumnsAdded,
    BytecodeAdded,
    ObjectiveSet,
    Finalized,
    Aborted,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::IndexesBuilt => "indexes_built",
            Self::RowsAdded => "rows_added",
            Self::ColumnsAdded => "columns_added",
            Self::BytecodeAdded => "bytecode_added",
            Self::ObjectiveSet => "objective_set",
            Self::Finalized => "finalized",
            Self::Aborted => "aborted",
        };
        write!(f, "{label}")
    }
}

///
/// ExportOptions
///

#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    /// Tolerance for bound-proximity basis derivation.
    pub basis_tolerance: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            basis_tolerance: DEFAULT_BASIS_TOLERANCE,
        }
    }
}

///
/// JacobianScratch
///
/// Caller-owned buffers for one row's or column's sparse Jacobian triple.
/// They grow to the widest incidence observed and are cleared, not shrunk,
/// between uses; the exporter borrows them for a single call and never
/// retains them.
///

#[derive(Debug, Default)]
pub struct JacobianScratch {
    rows: Vec<usize>,
    vals: Vec<f64>,
    nls: Vec<bool>,
}

impl JacobianScratch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            vals: Vec::new(),
            nls: Vec::new(),
        }
    }

    fn begin(&mut self, width: usize) {
        self.rows.clear();
        self.vals.clear();
        self.nls.clear();
        self.rows.reserve(width);
        self.vals.reserve(width);
        self.nls.reserve(width);
    }

    fn push(&mut self, row: usize, value: f64, nonlinear: bool) {
        self.rows.push(row);
        self.vals.push(value);
        self.nls.push(nonlinear);
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

///
/// ActiveSpaces
///
/// The variable and equation renumberings of one export, handed to the
/// import direction so solved values scatter back through the same maps.
///

#[derive(Debug)]
pub struct ActiveSpaces {
    pub variables: ActiveMap,
    pub equations: ActiveMap,
}

///
/// ExportSummary
///

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ExportSummary {
    pub active_rows: usize,
    pub active_cols: usize,
    pub nonzero_count: usize,
    pub code_instruction_count: usize,
}

///
/// ExportOutcome
///

#[derive(Debug)]
pub struct ExportOutcome {
    pub summary: ExportSummary,
    pub spaces: ActiveSpaces,
}

///
/// ModelExporter
///
/// Runs the six ordered steps that populate a freshly sized foreign
/// object from the internal model: index maps, rows, columns, bytecode,
/// objective, finalize. The model is read-only input; everything built
/// here lives for this one export.
///

pub struct ModelExporter<'a> {
    model: &'a Model,
    options: ExportOptions,
    phase: ExportPhase,
}

impl<'a> ModelExporter<'a> {
    #[must_use]
    pub const fn new(model: &'a Model) -> Self {
        Self::with_options(model, ExportOptions { basis_tolerance: DEFAULT_BASIS_TOLERANCE })
    }

    #[must_use]
    pub const fn with_options(model: &'a Model, options: ExportOptions) -> Self {
        Self {
            model,
            options,
            phase: ExportPhase::Start,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Populate `object` from the model under the given keep filters.
    ///
    /// On any failure the phase transitions to `Aborted` and the object
    /// must be discarded by the caller; it is never reused.
    pub fn export<O: SolverObject>(
        &mut self,
        object: &mut O,
        scratch: &mut JacobianScratch,
        keep_variable: impl FnMut(usize) -> bool,
        keep_equation: impl FnMut(usize) -> bool,
        compiler: &dyn ExpressionCompiler,
    ) -> Result<ExportOutcome, BridgeError> {
        sink::record(MetricsEvent::ExportStart);

        match self.run(object, scratch, keep_variable, keep_equation, compiler) {
            Ok(outcome) => {
                sink::record(MetricsEvent::ExportFinish {
                    rows: outcome.summary.active_rows as u64,
                    cols: outcome.summary.active_cols as u64,
                    nonzeros: outcome.summary.nonzero_count as u64,
                    instructions: outcome.summary.code_instruction_count as u64,
                });
                Ok(outcome)
            }
            Err(err) => {
                self.phase = ExportPhase::Aborted;
                sink::record(MetricsEvent::ExportError {
                    class: err.class,
                    origin: err.origin,
                });
                Err(err)
            }
        }
    }

    fn run<O: SolverObject>(
        &mut self,
        object: &mut O,
        scratch: &mut JacobianScratch,
        keep_variable: impl FnMut(usize) -> bool,
        keep_equation: impl FnMut(usize) -> bool,
        compiler: &dyn ExpressionCompiler,
    ) -> Result<ExportOutcome, BridgeError> {
        object.capabilities().require(EntryPoint::Sentinels)?;
        let sentinels = object.sentinels();

        // 1. index maps + structural verification
        let spaces = self.build_spaces(keep_variable, keep_equation)?;
        self.phase = ExportPhase::IndexesBuilt;

        // 2. rows
        self.add_rows(object, &spaces, &sentinels)?;
        self.phase = ExportPhase::RowsAdded;

        // 3. columns with the authoritative Jacobian structure
        let nonzero_count = self.add_cols(object, scratch, &spaces, &sentinels)?;
        self.phase = ExportPhase::ColumnsAdded;

        // 4. instruction streams for quadratic and nonlinear rows
        let code_instruction_count = self.add_code(object, &spaces, compiler)?;
        self.phase = ExportPhase::BytecodeAdded;

        // 5. objective
        self.set_objective(object, &spaces)?;
        self.phase = ExportPhase::ObjectiveSet;

        // 6. finalize and verify the reported shape
        object.capabilities().require(EntryPoint::Finalize)?;
        object
            .finalize()
            .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))?;
        if object.row_count() != spaces.equations.active_count()
            || object.col_count() != spaces.variables.active_count()
        {
            return Err(BridgeError::export_structural(format!(
                "finalized object reports {}x{}, expected {}x{}",
                object.row_count(),
                object.col_count(),
                spaces.equations.active_count(),
                spaces.variables.active_count()
            )));
        }
        self.phase = ExportPhase::Finalized;

        Ok(ExportOutcome {
            summary: ExportSummary {
                active_rows: spaces.equations.active_count(),
                active_cols: spaces.variables.active_count(),
                nonzero_count,
                code_instruction_count,
            },
            spaces,
        })
    }

    fn build_spaces(
        &self,
        keep_variable: impl FnMut(usize) -> bool,
        keep_equation: impl FnMut(usize) -> bool,
    ) -> Result<ActiveSpaces, BridgeError> {
        let variables = ActiveMap::build(self.model.variables().len(), keep_variable);
        let equations = ActiveMap::build(self.model.equations().len(), keep_equation);

        // Equations structurally removed from the graph must agree with
        // the filter's drop count.
        let detached = self.model.graph().detached_equation_count();
        if detached != equations.dropped_count() {
            return Err(BridgeError::index_structural(format!(
                "{} equations absent from the incidence graph, filter drops {}",
                detached,
                equations.dropped_count()
            )));
        }
        for (total, _) in equations.kept() {
            if self.model.graph().is_detached(total) {
                return Err(BridgeError::index_structural(format!(
                    "kept equation {total} is absent from the incidence graph"
                )));
            }
        }
        self.model.graph().debug_assert_bidirectional();

        Ok(ActiveSpaces {
            variables,
            equations,
        })
    }

    fn add_rows<O: SolverObject>(
        &self,
        object: &mut O,
        spaces: &ActiveSpaces,
        sentinels: &Sentinels,
    ) -> Result<(), BridgeError> {
        object.capabilities().require(EntryPoint::AddRow)?;

        for (total, _) in spaces.equations.kept() {
            let equation = &self.model.equations()[total];
            if !equation.kind.is_supported() {
                return Err(BridgeError::export_unsupported(format!(
                    "relational kind '{}' on equation {total}",
                    equation.kind
                )));
            }

            // Absent pairing or a filtered-out partner both mean no match.
            let paired_column = equation
                .paired_variable
                .and_then(|v| spaces.variables.active_of(v));

            let spec = RowSpec {
                kind: equation.kind,
                paired_column,
                slack: to_external(equation.level, sentinels),
                scale: equation.scale,
                rhs: to_external(equation.rhs, sentinels),
                marginal: to_external(equation.marginal, sentinels),
                basis: basis::reconcile_equation(
                    equation,
                    self.model.sense(),
                    self.options.basis_tolerance,
                ),
                jac_cols: &[],
                jac_vals: &[],
                jac_nl: &[],
            };
            object
                .add_row(&spec)
                .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))?;
        }

        Ok(())
    }

    fn add_cols<O: SolverObject>(
        &self,
        object: &mut O,
        scratch: &mut JacobianScratch,
        spaces: &ActiveSpaces,
        sentinels: &Sentinels,
    ) -> Result<usize, BridgeError> {
        object.capabilities().require(EntryPoint::AddCol)?;

        let graph = self.model.graph();
        let mut nonzero_count = 0;

        for (total, _) in spaces.variables.kept() {
            let variable = &self.model.variables()[total];
            if variable.kind.is_sos() && variable.sos_group.is_none() {
                return Err(BridgeError::export_unsupported(format!(
                    "variable {total} of kind '{}' carries no SOS group",
                    variable.kind
                )));
            }

            scratch.begin(graph.max_col_width() + 1);
            for edge in graph.col_edges(total) {
                if let Some(row_active) = spaces.equations.active_of(edge.equation) {
                    scratch.push(
                        row_active,
                        to_external(edge.coefficient, sentinels),
                        edge.nonlinear,
                    );
                }
            }

            // A matched column with no algebraic occurrence in its paired
            // equation still gets a structural entry: the foreign format
            // is assumed to want a nonzero slot for every matched pair.
            if let Some(paired) = variable.paired_equation
                && let Some(row_active) = spaces.equations.active_of(paired)
                && !graph.col_edges(total).any(|e| e.equation == paired)
            {
                scratch.push(row_active, 0.0, false);
            }

            nonzero_count += scratch.len();

            let spec = ColSpec {
                kind: variable.kind,
                lower: to_external(variable.lower, sentinels),
                level: to_external(variable.level, sentinels),
                upper: to_external(variable.upper, sentinels),
                marginal: to_external(variable.marginal, sentinels),
                basis: basis::reconcile_variable(
                    variable,
                    self.model.sense(),
                    self.options.basis_tolerance,
                ),
                sos_group: variable.sos_group,
                priority: variable.priority,
                scale: variable.scale,
                jac_rows: &scratch.rows,
                jac_vals: &scratch.vals,
                jac_nl: &scratch.nls,
            };
            object
                .add_col(&spec)
                .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))?;
        }

        Ok(nonzero_count)
    }

    fn add_code<O: SolverObject>(
        &self,
        object: &mut O,
        spaces: &ActiveSpaces,
        compiler: &dyn ExpressionCompiler,
    ) -> Result<usize, BridgeError> {
        let levels: Vec<f64> = self.model.variables().iter().map(|v| v.level).collect();
        let translator = OpcodeTranslator::new(&levels, &spaces.variables);
        let mut pool = ConstPool::new();
        let mut instruction_count = 0;

        for (total, active) in spaces.equations.kept() {
            let equation = &self.model.equations()[total];
            if !equation.order.has_code() {
                continue;
            }

            object.capabilities().require(EntryPoint::SetNlCode)?;
            let code = translator.translate(total, equation, active, &mut pool, compiler)?;
            instruction_count += code.len();

            object
                .set_nl_code(active, &code.raw_codes(), &code.raw_args(), pool.as_slice())
                .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))?;
        }

        Ok(instruction_count)
    }

    fn set_objective<O: SolverObject>(
        &self,
        object: &mut O,
        spaces: &ActiveSpaces,
    ) -> Result<(), BridgeError> {
        object.capabilities().require(EntryPoint::SetObjective)?;

        if let Some(total) = self.model.objective() {
            let Some(active) = spaces.variables.active_of(total) else {
                return Err(BridgeError::export_structural(format!(
                    "objective variable {total} is filtered out of the active space"
                )));
            };
            object
                .set_objective(active, self.model.sense())
                .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))
        } else {
            object
                .clear_objective()
                .map_err(|e| BridgeError::external(ErrorOrigin::Export, e.message))
        }
    }
}
