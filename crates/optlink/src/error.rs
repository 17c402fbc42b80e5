use std::fmt;
use thiserror::Error as ThisError;

///
/// BridgeError
///
/// Structured runtime error with a stable internal classification.
/// Every error is fatal to the in-progress export or import; there is no
/// retry or partial-success path, and the caller must discard any partially
/// built solver object.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct BridgeError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl BridgeError {
    /// Construct a BridgeError with an explicit classification.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an index-origin structural inconsistency.
    pub(crate) fn index_structural(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Structural, ErrorOrigin::Index, message)
    }

    /// Construct a graph-origin structural inconsistency.
    pub(crate) fn graph_structural(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Structural, ErrorOrigin::Graph, message)
    }

    /// Construct an export-origin structural inconsistency.
    pub(crate) fn export_structural(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Structural, ErrorOrigin::Export, message)
    }

    /// Construct an import-origin structural inconsistency.
    pub(crate) fn import_structural(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Structural, ErrorOrigin::Import, message)
    }

    /// Construct an export-origin unsupported-construct error.
    /// The message must name the offending symbol.
    pub(crate) fn export_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Export, message)
    }

    /// Construct a bytecode-origin unsupported-construct error.
    pub(crate) fn bytecode_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Bytecode, message)
    }

    /// Construct an object-origin unsupported-construct error.
    pub(crate) fn object_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Object, message)
    }

    /// Construct a bytecode-origin structural inconsistency.
    pub(crate) fn bytecode_structural(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Structural, ErrorOrigin::Bytecode, message)
    }

    /// Construct a bytecode-origin range error.
    ///
    /// Range validation is always checked and always fatal; it is never
    /// downgraded to a debug-only assertion.
    pub(crate) fn bytecode_range(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Range, ErrorOrigin::Bytecode, message)
    }

    /// Wrap a rejection from the foreign object, message passed through
    /// verbatim.
    pub(crate) fn external(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::External, origin, message)
    }

    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self.class, ErrorClass::Structural)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Index maps and the incidence graph disagree about the model shape.
    Structural,
    /// Relational kind, variable kind, opcode, or foreign entry point
    /// outside the supported closed set.
    Unsupported,
    /// The foreign object rejected a call.
    External,
    /// A bytecode argument fell outside its valid index range.
    Range,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Structural => "structural",
            Self::Unsupported => "unsupported",
            Self::External => "external",
            Self::Range => "range",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Index,
    Graph,
    Bytecode,
    Object,
    Export,
    Import,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Index => "index",
            Self::Graph => "graph",
            Self::Bytecode => "bytecode",
            Self::Object => "object",
            Self::Export => "export",
            Self::Import => "import",
        };
        write!(f, "{label}")
    }
}
