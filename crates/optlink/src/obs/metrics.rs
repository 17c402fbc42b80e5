use serde::Serialize;
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<MetricsSnapshot> = RefCell::new(MetricsSnapshot::default());
}

///
/// ErrorCounters
///
/// Export/import failures by classification.
///

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ErrorCounters {
    pub structural: u64,
    pub unsupported: u64,
    pub external: u64,
    pub range: u64,
}

///
/// MetricsSnapshot
///
/// Cumulative counters of the process-local metrics state. Cheap to copy
/// and serializable for endpoint plumbing.
///

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct MetricsSnapshot {
    pub exports_started: u64,
    pub exports_finished: u64,
    pub export_errors: u64,
    pub rows_emitted: u64,
    pub cols_emitted: u64,
    pub nonzeros_emitted: u64,
    pub instructions_emitted: u64,
    pub imports_finished: u64,
    pub rows_imported: u64,
    pub cols_imported: u64,
    pub errors: ErrorCounters,
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut MetricsSnapshot) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

pub(crate) fn report() -> MetricsSnapshot {
    STATE.with(|state| *state.borrow())
}

pub(crate) fn reset_all() {
    STATE.with(|state| *state.borrow_mut() = MetricsSnapshot::default());
}
