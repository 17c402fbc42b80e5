#[cfg(test)]
mod tests;

use crate::{
    error::BridgeError,
    export::ActiveSpaces,
    model::{BasisStatus, Model, Sense},
    object::{EntryPoint, SolverObject},
    obs::sink::{self, MetricsEvent},
    value::{NOT_AVAILABLE, Sentinels, is_not_available, to_internal},
};

///
/// SolutionImporter
///
/// Reads a solved foreign object back into the internal model: levels,
/// marginals, and basis statuses, scattered through the inverse of the
/// export's active maps. Read-only on the object; the maps themselves are
/// not mutated. Items the export dropped receive the internal "not
/// applicable" value and an unset basis.
///
/// The foreign convention ties marginal sign to minimization; under a
/// maximizing model every imported marginal is negated so the internal
/// convention stays sense-independent.
///

pub struct SolutionImporter<'a> {
    spaces: &'a ActiveSpaces,
}

impl<'a> SolutionImporter<'a> {
    #[must_use]
    pub const fn new(spaces: &'a ActiveSpaces) -> Self {
        Self { spaces }
    }

    pub fn import<O: SolverObject>(
        &self,
        model: &mut Model,
        object: &O,
    ) -> Result<(), BridgeError> {
        object.capabilities().require(EntryPoint::Sentinels)?;
        object.capabilities().require(EntryPoint::ReadRows)?;
        object.capabilities().require(EntryPoint::ReadCols)?;

        if object.row_count() != self.spaces.equations.active_count()
            || object.col_count() != self.spaces.variables.active_count()
        {
            return Err(BridgeError::import_structural(format!(
                "object reports {}x{}, active maps expect {}x{}",
                object.row_count(),
                object.col_count(),
                self.spaces.equations.active_count(),
                self.spaces.variables.active_count()
            )));
        }

        let sentinels = object.sentinels();
        let negate = model.sense() == Sense::Maximize;

        for (total, variable) in model.variables_mut().iter_mut().enumerate() {
            match self.spaces.variables.active_of(total) {
                Some(active) => {
                    variable.level = to_internal(object.col_level(active), &sentinels);
                    variable.marginal =
                        import_marginal(object.col_marginal(active), &sentinels, negate);
                    variable.basis = object.col_basis(active);
                }
                None => {
                    variable.level = NOT_AVAILABLE;
                    variable.marginal = NOT_AVAILABLE;
                    variable.basis = BasisStatus::Unset;
                }
            }
        }

        for (total, equation) in model.equations_mut().iter_mut().enumerate() {
            match self.spaces.equations.active_of(total) {
                Some(active) => {
                    equation.level = to_internal(object.row_level(active), &sentinels);
                    equation.marginal =
                        import_marginal(object.row_marginal(active), &sentinels, negate);
                    equation.basis = object.row_basis(active);
                }
                None => {
                    equation.level = NOT_AVAILABLE;
                    equation.marginal = NOT_AVAILABLE;
                    equation.basis = BasisStatus::Unset;
                }
            }
        }

        sink::record(MetricsEvent::ImportFinish {
            rows: self.spaces.equations.active_count() as u64,
            cols: self.spaces.variables.active_count() as u64,
        });

        Ok(())
    }
}

fn import_marginal(raw: f64, sentinels: &Sentinels, negate: bool) -> f64 {
    let marginal = to_internal(raw, sentinels);
    // The "not applicable" marker carries no sign; only real marginals
    // flip under maximization.
    if negate && !is_not_available(marginal) {
        -marginal
    } else {
        marginal
    }
}
