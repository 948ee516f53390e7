use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Identities of a `(left, right)` pair of composite nodes.
pub(crate) type Pair = (*const (), *const ());

/// Identity pairs currently being compared or merged on the call stack.
///
/// A pair is entered before descending into two composite nodes and left
/// once that level is done. Meeting an entered pair again means the walk
/// has gone round a cycle in both graphs at once. Each pair remembers the
/// stack depth it was entered at.
#[derive(Debug, Default)]
pub(crate) struct PairGuard {
    active: HashMap<Pair, usize>,
}

impl PairGuard {
    /// Returns `false` if the pair is already in flight.
    pub(crate) fn enter(&mut self, pair: Pair) -> bool {
        let depth = self.active.len();
        match self.active.entry(pair) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(depth);
                true
            }
        }
    }

    pub(crate) fn leave(&mut self, pair: Pair) {
        self.active.remove(&pair);
    }

    /// Depth the pair was entered at, if it is in flight.
    pub(crate) fn depth_of(&self, pair: Pair) -> Option<usize> {
        self.active.get(&pair).copied()
    }

    /// Number of pairs in flight.
    pub(crate) fn depth(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
