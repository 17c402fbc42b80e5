//! Metrics sink boundary.
//!
//! Export and import logic MUST NOT depend on `obs::metrics` directly.
//! All instrumentation flows through MetricsEvent and MetricsSink; this
//! module is the only bridge between execution logic and the process-local
//! metrics state. Instrumentation never affects execution semantics.

use crate::{
    error::{ErrorClass, ErrorOrigin},
    obs::metrics,
};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ExportStart,
    ExportFinish {
        rows: u64,
        cols: u64,
        nonzeros: u64,
        instructions: u64,
    },
    ExportError {
        class: ErrorClass,
        origin: ErrorOrigin,
    },
    ImportFinish {
        rows: u64,
        cols: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExportStart => {
                metrics::with_state_mut(|m| {
                    m.exports_started = m.exports_started.saturating_add(1);
                });
            }

            MetricsEvent::ExportFinish {
                rows,
                cols,
                nonzeros,
                instructions,
            } => {
                metrics::with_state_mut(|m| {
                    m.exports_finished = m.exports_finished.saturating_add(1);
                    m.rows_emitted = m.rows_emitted.saturating_add(rows);
                    m.cols_emitted = m.cols_emitted.saturating_add(cols);
                    m.nonzeros_emitted = m.nonzeros_emitted.saturating_add(nonzeros);
                    m.instructions_emitted = m.instructions_emitted.saturating_add(instructions);
                });
            }

            MetricsEvent::ExportError { class, origin: _ } => {
                metrics::with_state_mut(|m| {
                    m.export_errors = m.export_errors.saturating_add(1);
                    let slot = match class {
                        ErrorClass::Structural => &mut m.errors.structural,
                        ErrorClass::Unsupported => &mut m.errors.unsupported,
                        ErrorClass::External => &mut m.errors.external,
                        ErrorClass::Range => &mut m.errors.range,
                    };
                    *slot = slot.saturating_add(1);
                });
            }

            MetricsEvent::ImportFinish { rows, cols } => {
                metrics::with_state_mut(|m| {
                    m.imports_finished = m.imports_finished.saturating_add(1);
                    m.rows_imported = m.rows_imported.saturating_add(rows);
                    m.cols_imported = m.cols_imported.saturating_add(cols);
                });
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous override is restored on all exits, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(Rc::clone(&sink)));
    let _guard = Guard(previous);

    f()
}
