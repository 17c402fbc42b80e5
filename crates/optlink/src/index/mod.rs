
///
/// ActiveMap
///
/// Dense renumbering of one space (variables or equations) under a
/// keep/drop filter. Kept items receive sequential active indices in their
/// original total order; dropped items map to [`Slot::Deleted`].
///
/// Invariants:
/// - active indices are a gap-free, order-preserving permutation of the
///   kept items: `active_count == total_len - dropped_count` exactly;
/// - no duplicate or out-of-range active index is ever produced;
/// - the map is immutable once built and lives for one export only.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    Active(usize),
    Deleted,
}

#[derive(Debug)]
pub struct ActiveMap {
    slots: Vec<Slot>,
    /// Total index of each active item, in active order.
    kept: Vec<usize>,
}

impl ActiveMap {
    /// Build the map in a single linear pass over the total space.
    pub fn build(total_len: usize, mut keep: impl FnMut(usize) -> bool) -> Self {
        let mut slots = Vec::with_capacity(total_len);
        let mut kept = Vec::new();

        for total in 0..total_len {
            if keep(total) {
                slots.push(Slot::Active(kept.len()));
                kept.push(total);
            } else {
                slots.push(Slot::Deleted);
            }
        }

        Self { slots, kept }
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.kept.len()
    }

    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.slots.len() - self.kept.len()
    }

    /// Active index of a total index, or `None` when dropped.
    #[must_use]
    pub fn active_of(&self, total: usize) -> Option<usize> {
        match self.slots.get(total) {
            Some(Slot::Active(active)) => Some(*active),
            _ => None,
        }
    }

    /// Total index of an active index. Inverse of [`Self::active_of`].
    #[must_use]
    pub fn total_of(&self, active: usize) -> Option<usize> {
        self.kept.get(active).copied()
    }

    #[must_use]
    pub fn is_kept(&self, total: usize) -> bool {
        matches!(self.slots.get(total), Some(Slot::Active(_)))
    }

    /// Kept items as `(total, active)` pairs, in total (== active) order.
    pub fn kept(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.kept.iter().copied().enumerate().map(|(a, t)| (t, a))
    }
}
