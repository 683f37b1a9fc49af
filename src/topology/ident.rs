//! Id issue and recycling.

use std::collections::HashMap;

use super::elem::ElemId;

/// Issues element ids and recycles freed ones.
///
/// Ids come from a monotonically increasing counter; freed ids go onto
/// a pending-free list and are handed out again before the counter
/// advances. An id-to-position map over the free list exists only once
/// [`IdGen::reserve`] has needed membership queries, so the hot
/// allocate/free path pays no map maintenance in sessions that never
/// load explicit ids.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    counter: u64,
    free: Vec<ElemId>,
    positions: Option<HashMap<ElemId, usize>>,
}

impl IdGen {
    /// Creates a generator with no issued ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs a generator from persisted state.
    ///
    /// The position map is left unbuilt; it is re-derived on demand.
    #[must_use]
    pub(crate) fn restore(counter: u64, free: Vec<ElemId>) -> Self {
        Self {
            counter,
            free,
            positions: None,
        }
    }

    /// Returns the next available id.
    pub fn next(&mut self) -> ElemId {
        if let Some(id) = self.free.pop() {
            if let Some(map) = self.positions.as_mut() {
                map.remove(&id);
            }
            return id;
        }
        let id = ElemId(self.counter);
        self.counter += 1;
        id
    }

    /// Marks `id` available for reuse.
    ///
    /// Freeing an id that was never issued, or freeing the same id
    /// twice without an intervening [`IdGen::next`]/[`IdGen::reserve`],
    /// is reported and ignored.
    pub fn free(&mut self, id: ElemId) {
        if id.0 >= self.counter {
            log::warn!("ignoring free of never-issued id {id}");
            return;
        }
        if let Some(map) = self.positions.as_ref() {
            if map.contains_key(&id) {
                log::warn!("ignoring double free of id {id}");
                return;
            }
        } else {
            debug_assert!(!self.free.contains(&id), "double free of id {id}");
        }
        self.free.push(id);
        if let Some(map) = self.positions.as_mut() {
            map.insert(id, self.free.len() - 1);
        }
    }

    /// Guarantees `id` will never be handed out again (until re-freed).
    ///
    /// Advances the counter past `id` when needed, or removes `id` from
    /// the pending-free list. Used when loading persisted data with
    /// pre-assigned ids or when duplicating elements by explicit id.
    pub fn reserve(&mut self, id: ElemId) {
        if id.0 >= self.counter {
            self.counter = id.0 + 1;
            return;
        }
        if self.positions.is_none() {
            self.positions = Some(
                self.free
                    .iter()
                    .enumerate()
                    .map(|(i, id)| (*id, i))
                    .collect(),
            );
        }
        let Some(map) = self.positions.as_mut() else {
            return;
        };
        if let Some(pos) = map.remove(&id) {
            self.free.swap_remove(pos);
            if pos < self.free.len() {
                map.insert(self.free[pos], pos);
            }
        }
    }

    /// The value the counter will issue next, absent free-list reuse.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// The pending-free list, oldest first.
    #[must_use]
    pub fn free_list(&self) -> &[ElemId] {
        &self.free
    }

    /// Forgets all issued and freed ids.
    pub fn clear(&mut self) {
        self.counter = 0;
        self.free.clear();
        self.positions = None;
    }
}
