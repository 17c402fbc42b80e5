mod capability;
mod dense;
mod library;


pub use capability::{Capability, CapabilityTable, EntryPoint};
pub use dense::DenseModelObject;
pub use library::{LibraryHandle, LibraryState, SolverLibrary};

use crate::{
    model::{BasisStatus, RelKind, Sense, VarKind},
    value::Sentinels,
};
use thiserror::Error as ThisError;

///
/// CallRejected
///
/// A rejection raised by the foreign object. The message crosses the
/// boundary verbatim; classification happens on the caller's side.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct CallRejected {
    pub message: String,
}

impl CallRejected {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// RowSpec
///
/// Arguments of the per-row add entry. The Jacobian triple here is a
/// placeholder; the authoritative structure arrives with the columns.
///

#[derive(Debug)]
pub struct RowSpec<'a> {
    pub kind: RelKind,
    /// Active index of the complementarity-matched column, if any.
    pub paired_column: Option<usize>,
    pub slack: f64,
    pub scale: f64,
    pub rhs: f64,
    pub marginal: f64,
    pub basis: BasisStatus,
    pub jac_cols: &'a [usize],
    pub jac_vals: &'a [f64],
    pub jac_nl: &'a [bool],
}

///
/// ColSpec
///
/// Arguments of the per-column add entry, including the column's slice of
/// the sparse Jacobian in parallel (active row, value, nonlinear) arrays.
///

#[derive(Debug)]
pub struct ColSpec<'a> {
    pub kind: VarKind,
    pub lower: f64,
    pub level: f64,
    pub upper: f64,
    pub marginal: f64,
    pub basis: BasisStatus,
    pub sos_group: Option<u32>,
    pub priority: f64,
    pub scale: f64,
    pub jac_rows: &'a [usize],
    pub jac_vals: &'a [f64],
    pub jac_nl: &'a [bool],
}

///
/// SolverObject
///
/// Consumed contract of the foreign model object: size-fixed at creation,
/// filled row-by-row and column-by-column, finalized once, then read back
/// after a solve. All doubles crossing this trait are in the foreign
/// convention (sentinel doubles, not IEEE infinities).
///

pub trait SolverObject {
    /// Per-binding record of which entry points resolved.
    fn capabilities(&self) -> &CapabilityTable;

    /// The three reserved doubles of this binding.
    fn sentinels(&self) -> Sentinels;

    fn row_capacity(&self) -> usize;
    fn col_capacity(&self) -> usize;

    fn add_row(&mut self, spec: &RowSpec<'_>) -> Result<(), CallRejected>;
    fn add_col(&mut self, spec: &ColSpec<'_>) -> Result<(), CallRejected>;

    /// Attach one row's instruction stream. The shared constant pool is
    /// re-sent with every call; the object keeps the latest copy.
    fn set_nl_code(
        &mut self,
        row: usize,
        codes: &[u16],
        args: &[i32],
        pool: &[f64],
    ) -> Result<(), CallRejected>;

    fn set_objective(&mut self, column: usize, sense: Sense) -> Result<(), CallRejected>;

    /// Mark the object as carrying no objective (complementarity and
    /// feasibility models).
    fn clear_objective(&mut self) -> Result<(), CallRejected>;

    fn finalize(&mut self) -> Result<(), CallRejected>;

    // getters, mirrored from the setters, used by the import direction
    fn row_count(&self) -> usize;
    fn col_count(&self) -> usize;
    fn col_level(&self, column: usize) -> f64;
    fn col_marginal(&self, column: usize) -> f64;
    fn col_basis(&self, column: usize) -> BasisStatus;
    fn row_level(&self, row: usize) -> f64;
    fn row_marginal(&self, row: usize) -> f64;
    fn row_basis(&self, row: usize) -> BasisStatus;
}
