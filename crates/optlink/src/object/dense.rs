use crate::{
    model::{BasisStatus, RelKind, Sense, VarKind},
    object::{CallRejected, CapabilityTable, ColSpec, LibraryHandle, RowSpec, SolverObject},
    value::Sentinels,
};

///
/// DenseModelObject
///
/// Array-backed rendition of the foreign model object: size-fixed at
/// creation, filled in order, finalized once. It is the reference object
/// the crate is exercised against; a production binding wraps the real
/// foreign memory behind the same trait.
///
/// Holding a [`LibraryHandle`] ties the object's lifetime into the
/// library reference count: creation attaches, drop releases.
///

#[derive(Debug)]
struct RowRec {
    kind: RelKind,
    paired_column: Option<usize>,
    scale: f64,
    rhs: f64,
    level: f64,
    marginal: f64,
    basis: BasisStatus,
}

#[derive(Debug)]
struct ColRec {
    kind: VarKind,
    lower: f64,
    upper: f64,
    level: f64,
    marginal: f64,
    basis: BasisStatus,
    sos_group: Option<u32>,
    priority: f64,
    scale: f64,
    jac_rows: Vec<usize>,
    jac_vals: Vec<f64>,
    jac_nl: Vec<bool>,
}

#[derive(Debug)]
enum Objective {
    Unset,
    None,
    Set { column: usize, sense: Sense },
}

#[derive(Debug)]
pub struct DenseModelObject {
    _handle: LibraryHandle,
    capabilities: CapabilityTable,
    row_capacity: usize,
    col_capacity: usize,
    code_capacity: usize,
    rows: Vec<RowRec>,
    cols: Vec<ColRec>,
    code: Vec<Option<(Vec<u16>, Vec<i32>)>>,
    pool: Vec<f64>,
    code_used: usize,
    objective: Objective,
    finalized: bool,
}

impl DenseModelObject {
    /// Reserved double standing for +infinity.
    pub const PLUS_INF: f64 = 1.0e300;
    /// Reserved double standing for -infinity.
    pub const MINUS_INF: f64 = -1.0e300;
    /// Reserved double standing for "value not available".
    pub const NOT_AVAILABLE: f64 = 2.0e300;

    #[must_use]
    pub fn new(handle: LibraryHandle, rows: usize, cols: usize, code_capacity: usize) -> Self {
        Self::with_capabilities(handle, rows, cols, code_capacity, CapabilityTable::complete())
    }

    /// Construct against a binding that resolved only part of the entry
    /// point set.
    #[must_use]
    pub fn with_capabilities(
        handle: LibraryHandle,
        rows: usize,
        cols: usize,
        code_capacity: usize,
        capabilities: CapabilityTable,
    ) -> Self {
        Self {
            _handle: handle,
            capabilities,
            row_capacity: rows,
            col_capacity: cols,
            code_capacity,
            rows: Vec::with_capacity(rows),
            cols: Vec::with_capacity(cols),
            code: std::iter::repeat_with(|| None).take(rows).collect(),
            pool: Vec::new(),
            code_used: 0,
            objective: Objective::Unset,
            finalized: false,
        }
    }

    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[must_use]
    pub fn row_kind(&self, row: usize) -> Option<RelKind> {
        self.rows.get(row).map(|r| r.kind)
    }

    #[must_use]
    pub fn row_paired_column(&self, row: usize) -> Option<usize> {
        self.rows.get(row).and_then(|r| r.paired_column)
    }

    /// One column's Jacobian slice as stored.
    #[must_use]
    pub fn col_jacobian(&self, column: usize) -> Option<(&[usize], &[f64], &[bool])> {
        self.cols
            .get(column)
            .map(|c| (&c.jac_rows[..], &c.jac_vals[..], &c.jac_nl[..]))
    }

    #[must_use]
    pub fn col_sos_group(&self, column: usize) -> Option<u32> {
        self.cols.get(column).and_then(|c| c.sos_group)
    }

    /// One column's stored bounds, in the foreign convention.
    #[must_use]
    pub fn col_bounds(&self, column: usize) -> Option<(f64, f64)> {
        self.cols.get(column).map(|c| (c.lower, c.upper))
    }

    /// One row's instruction stream as stored.
    #[must_use]
    pub fn nl_code(&self, row: usize) -> Option<(&[u16], &[i32])> {
        self.code
            .get(row)
            .and_then(Option::as_ref)
            .map(|(codes, args)| (&codes[..], &args[..]))
    }

    #[must_use]
    pub fn constant_pool(&self) -> &[f64] {
        &self.pool
    }

    #[must_use]
    pub const fn objective_column(&self) -> Option<usize> {
        match self.objective {
            Objective::Set { column, .. } => Some(column),
            Objective::Unset | Objective::None => None,
        }
    }

    /// Write one solved column, the way a solver backend would.
    pub fn store_col_solution(
        &mut self,
        column: usize,
        level: f64,
        marginal: f64,
        basis: BasisStatus,
    ) -> Result<(), CallRejected> {
        let col = self
            .cols
            .get_mut(column)
            .ok_or_else(|| CallRejected::new(format!("column {column} out of range")))?;
        col.level = level;
        col.marginal = marginal;
        col.basis = basis;
        Ok(())
    }

    /// Write one solved row, the way a solver backend would.
    pub fn store_row_solution(
        &mut self,
        row: usize,
        level: f64,
        marginal: f64,
        basis: BasisStatus,
    ) -> Result<(), CallRejected> {
        let rec = self
            .rows
            .get_mut(row)
            .ok_or_else(|| CallRejected::new(format!("row {row} out of range")))?;
        rec.level = level;
        rec.marginal = marginal;
        rec.basis = basis;
        Ok(())
    }

    fn reject_if_finalized(&self) -> Result<(), CallRejected> {
        if self.finalized {
            Err(CallRejected::new("object already finalized"))
        } else {
            Ok(())
        }
    }
}

impl SolverObject for DenseModelObject {
    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn sentinels(&self) -> Sentinels {
        Sentinels {
            plus_inf: Self::PLUS_INF,
            minus_inf: Self::MINUS_INF,
            not_available: Self::NOT_AVAILABLE,
        }
    }

    fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    fn col_capacity(&self) -> usize {
        self.col_capacity
    }

    fn add_row(&mut self, spec: &RowSpec<'_>) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        if self.rows.len() == self.row_capacity {
            return Err(CallRejected::new(format!(
                "row table is full (capacity {})",
                self.row_capacity
            )));
        }
        if spec.jac_cols.len() != spec.jac_vals.len() || spec.jac_cols.len() != spec.jac_nl.len() {
            return Err(CallRejected::new("row Jacobian triple length mismatch"));
        }

        self.rows.push(RowRec {
            kind: spec.kind,
            paired_column: spec.paired_column,
            scale: spec.scale,
            rhs: spec.rhs,
            level: spec.slack,
            marginal: spec.marginal,
            basis: spec.basis,
        });

        Ok(())
    }

    fn add_col(&mut self, spec: &ColSpec<'_>) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        if self.cols.len() == self.col_capacity {
            return Err(CallRejected::new(format!(
                "column table is full (capacity {})",
                self.col_capacity
            )));
        }
        if spec.jac_rows.len() != spec.jac_vals.len() || spec.jac_rows.len() != spec.jac_nl.len() {
            return Err(CallRejected::new("column Jacobian triple length mismatch"));
        }
        if let Some(&bad) = spec.jac_rows.iter().find(|r| **r >= self.row_capacity) {
            return Err(CallRejected::new(format!(
                "column Jacobian references row {bad} outside capacity {}",
                self.row_capacity
            )));
        }

        self.cols.push(ColRec {
            kind: spec.kind,
            lower: spec.lower,
            upper: spec.upper,
            level: spec.level,
            marginal: spec.marginal,
            basis: spec.basis,
            sos_group: spec.sos_group,
            priority: spec.priority,
            scale: spec.scale,
            jac_rows: spec.jac_rows.to_vec(),
            jac_vals: spec.jac_vals.to_vec(),
            jac_nl: spec.jac_nl.to_vec(),
        });

        Ok(())
    }

    fn set_nl_code(
        &mut self,
        row: usize,
        codes: &[u16],
        args: &[i32],
        pool: &[f64],
    ) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        if row >= self.rows.len() {
            return Err(CallRejected::new(format!(
                "code attached to row {row} before the row was added"
            )));
        }
        if codes.len() != args.len() {
            return Err(CallRejected::new("code and argument arrays differ in length"));
        }
        if self.code_used + codes.len() > self.code_capacity {
            return Err(CallRejected::new(format!(
                "nonlinear code capacity exceeded ({} + {} > {})",
                self.code_used,
                codes.len(),
                self.code_capacity
            )));
        }

        self.code_used += codes.len();
        self.code[row] = Some((codes.to_vec(), args.to_vec()));
        self.pool = pool.to_vec();

        Ok(())
    }

    fn set_objective(&mut self, column: usize, sense: Sense) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        if column >= self.col_capacity {
            return Err(CallRejected::new(format!(
                "objective column {column} outside capacity {}",
                self.col_capacity
            )));
        }
        self.objective = Objective::Set { column, sense };
        Ok(())
    }

    fn clear_objective(&mut self) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        self.objective = Objective::None;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CallRejected> {
        self.reject_if_finalized()?;
        if self.rows.len() != self.row_capacity {
            return Err(CallRejected::new(format!(
                "finalize with {} of {} rows added",
                self.rows.len(),
                self.row_capacity
            )));
        }
        if self.cols.len() != self.col_capacity {
            return Err(CallRejected::new(format!(
                "finalize with {} of {} columns added",
                self.cols.len(),
                self.col_capacity
            )));
        }
        if matches!(self.objective, Objective::Unset) {
            return Err(CallRejected::new(
                "finalize before the objective was set or cleared",
            ));
        }

        self.finalized = true;
        Ok(())
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn col_count(&self) -> usize {
        self.cols.len()
    }

    fn col_level(&self, column: usize) -> f64 {
        self.cols.get(column).map_or(Self::NOT_AVAILABLE, |c| c.level)
    }

    fn col_marginal(&self, column: usize) -> f64 {
        self.cols
            .get(column)
            .map_or(Self::NOT_AVAILABLE, |c| c.marginal)
    }

    fn col_basis(&self, column: usize) -> BasisStatus {
        self.cols.get(column).map_or(BasisStatus::Unset, |c| c.basis)
    }

    fn row_level(&self, row: usize) -> f64 {
        self.rows.get(row).map_or(Self::NOT_AVAILABLE, |r| r.level)
    }

    fn row_marginal(&self, row: usize) -> f64 {
        self.rows.get(row).map_or(Self::NOT_AVAILABLE, |r| r.marginal)
    }

    fn row_basis(&self, row: usize) -> BasisStatus {
        self.rows.get(row).map_or(BasisStatus::Unset, |r| r.basis)
    }
}
