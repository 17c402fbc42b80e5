//! Core runtime for optlink: the bridge between a sparse algebraic
//! optimization model and an externally-owned row/column solver model
//! object, plus the ergonomics exported via the `prelude`.

// public exports are one module level down
pub mod bytecode;
pub mod error;
pub mod export;
pub mod graph;
pub mod import;
pub mod index;
pub mod model;
pub mod object;
pub mod obs;
pub mod value;

///
/// CONSTANTS
///

/// Default tolerance used when deriving a basis status from bound proximity.
///
/// Callers can override it per export; this default keeps level/bound
/// comparisons stable across the usual solver feasibility tolerances.
pub const DEFAULT_BASIS_TOLERANCE: f64 = 1.0e-6;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, exporters, objects, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{BasisStatus, Equation, ExprOrder, Model, RelKind, Sense, VarKind, Variable},
        value::Value,
    };
}
