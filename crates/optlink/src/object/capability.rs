use crate::error::BridgeError;

///
/// EntryPoint
///
/// The foreign entry points this crate calls. One capability slot exists
/// per entry point; version-sensitive bindings may leave some unresolved.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryPoint {
    Sentinels,
    AddRow,
    AddCol,
    SetNlCode,
    SetObjective,
    Finalize,
    ReadRows,
    ReadCols,
}

impl EntryPoint {
    pub const ALL: [Self; 8] = [
        Self::Sentinels,
        Self::AddRow,
        Self::AddCol,
        Self::SetNlCode,
        Self::SetObjective,
        Self::Finalize,
        Self::ReadRows,
        Self::ReadCols,
    ];

    /// Exported symbol name of this entry point.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Sentinels => "getsentinels",
            Self::AddRow => "addrow",
            Self::AddCol => "addcol",
            Self::SetNlCode => "setnlcode",
            Self::SetObjective => "setobjective",
            Self::Finalize => "finalize",
            Self::ReadRows => "readrow",
            Self::ReadCols => "readcol",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Sentinels => 0,
            Self::AddRow => 1,
            Self::AddCol => 2,
            Self::SetNlCode => 3,
            Self::SetObjective => 4,
            Self::Finalize => 5,
            Self::ReadRows => 6,
            Self::ReadCols => 7,
        }
    }
}

///
/// Capability
///
/// Resolution state of one entry point: bound to the real symbol, or a
/// documented stub that fails when required.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    Bound,
    Missing,
}

///
/// CapabilityTable
///
/// Built once per library binding; consulted before each foreign call so
/// a missing symbol surfaces as an unsupported-construct error naming it,
/// never as a crash inside the foreign side.
///

#[derive(Clone, Debug)]
pub struct CapabilityTable {
    slots: [Capability; EntryPoint::ALL.len()],
}

impl CapabilityTable {
    /// Table of a binding that resolved every entry point.
    #[must_use]
    pub const fn complete() -> Self {
        Self {
            slots: [Capability::Bound; EntryPoint::ALL.len()],
        }
    }

    /// Table of a binding with the given entry points unresolved.
    #[must_use]
    pub fn with_missing(missing: &[EntryPoint]) -> Self {
        let mut table = Self::complete();
        for entry in missing {
            table.slots[entry.slot()] = Capability::Missing;
        }
        table
    }

    #[must_use]
    pub const fn get(&self, entry: EntryPoint) -> Capability {
        self.slots[entry.slot()]
    }

    #[must_use]
    pub const fn is_bound(&self, entry: EntryPoint) -> bool {
        matches!(self.get(entry), Capability::Bound)
    }

    /// Fail with the offending symbol when an entry point is unresolved.
    pub fn require(&self, entry: EntryPoint) -> Result<(), BridgeError> {
        if self.is_bound(entry) {
            Ok(())
        } else {
            Err(BridgeError::object_unsupported(format!(
                "entry point '{}' is not exported by this library build",
                entry.symbol()
            )))
        }
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::complete()
    }
}
