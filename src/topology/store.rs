//! Arena storage for one element kind.

use std::collections::HashSet;

use slotmap::SlotMap;

use crate::error::TopologyError;

use super::elem::{ElemFlags, ElemId, Element};

/// A resizable, type-homogeneous container for one element kind.
///
/// Elements live in a slotmap arena; keys are generational, so a key
/// held past its element's death fails lookup instead of aliasing a
/// new element. When slot retention is configured, freed elements stay
/// in place as tombstones until [`ElemStore::compact`] runs, keeping
/// dense indices stable across deletions.
///
/// Also tracks the editor-facing active/selected/highlighted state for
/// its kind; references to an element are dropped when it is freed.
#[derive(Debug)]
pub struct ElemStore<K: slotmap::Key, T: Element> {
    elems: SlotMap<K, T>,
    retained: Vec<K>,
    retain_slots: bool,
    active: Option<K>,
    highlighted: Option<K>,
    selected: HashSet<K>,
}

impl<K: slotmap::Key, T: Element> ElemStore<K, T> {
    /// Creates an empty store.
    #[must_use]
    pub(crate) fn new(retain_slots: bool) -> Self {
        Self {
            elems: SlotMap::with_key(),
            retained: Vec::new(),
            retain_slots,
            active: None,
            highlighted: None,
            selected: HashSet::new(),
        }
    }

    /// Inserts an element, reusing a tombstoned slot when retention is
    /// on and one is available.
    pub(crate) fn insert(&mut self, mut elem: T) -> K {
        elem.set_index(self.len());
        if self.retain_slots {
            if let Some(key) = self.retained.pop() {
                self.elems[key] = elem;
                return key;
            }
        }
        self.elems.insert(elem)
    }

    /// Frees an element's slot, clearing its owned links first.
    ///
    /// Returns the freed element's id, or `None` if the key was already
    /// dead. The element's active/selected/highlighted state is dropped.
    pub(crate) fn free(&mut self, key: K) -> Option<ElemId> {
        let elem = self.elems.get_mut(key)?;
        if elem.flags().contains(ElemFlags::TOMB) {
            return None;
        }
        let id = elem.id();
        elem.clear_links();
        if self.retain_slots {
            elem.flags_mut().insert(ElemFlags::TOMB);
            self.retained.push(key);
        } else {
            self.elems.remove(key);
        }
        if self.active == Some(key) {
            self.active = None;
        }
        if self.highlighted == Some(key) {
            self.highlighted = None;
        }
        self.selected.remove(&key);
        Some(id)
    }

    /// Returns the element, or an error for dead keys and tombstones.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EntityNotFound`] if the element is not
    /// alive in this store.
    pub fn get(&self, key: K) -> Result<&T, TopologyError> {
        self.elems
            .get(key)
            .filter(|e| !e.flags().contains(ElemFlags::TOMB))
            .ok_or(TopologyError::EntityNotFound(T::KIND))
    }

    /// Mutable variant of [`ElemStore::get`].
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EntityNotFound`] if the element is not
    /// alive in this store.
    pub fn get_mut(&mut self, key: K) -> Result<&mut T, TopologyError> {
        self.elems
            .get_mut(key)
            .filter(|e| !e.flags().contains(ElemFlags::TOMB))
            .ok_or(TopologyError::EntityNotFound(T::KIND))
    }

    /// Returns `true` if `key` refers to a live element.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_ok()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elems.len() - self.retained.len()
    }

    /// Returns `true` if the store holds no live element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates live elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.elems
            .iter()
            .filter(|(_, e)| !e.flags().contains(ElemFlags::TOMB))
    }

    /// Mutable iteration over live elements.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.elems
            .iter_mut()
            .filter(|(_, e)| !e.flags().contains(ElemFlags::TOMB))
    }

    /// Physically removes tombstoned slots.
    ///
    /// Dense indices are renumbered; any raw index held by external
    /// code is invalid after this call (ids remain stable).
    pub fn compact(&mut self) {
        for key in self.retained.drain(..) {
            self.elems.remove(key);
        }
        self.rebuild_indices();
    }

    /// Reassigns dense indices `0..n` in iteration order.
    pub fn rebuild_indices(&mut self) {
        for (i, (_, elem)) in self.iter_mut().enumerate() {
            elem.set_index(i);
        }
    }

    /// The active element of this kind, if any.
    #[must_use]
    pub fn active(&self) -> Option<K> {
        self.active
    }

    /// Sets or clears the active element; dead keys clear it.
    pub fn set_active(&mut self, key: Option<K>) {
        self.active = key.filter(|k| self.contains(*k));
    }

    /// The highlighted element of this kind, if any.
    #[must_use]
    pub fn highlighted(&self) -> Option<K> {
        self.highlighted
    }

    /// Sets or clears the highlighted element; dead keys clear it.
    pub fn set_highlighted(&mut self, key: Option<K>) {
        self.highlighted = key.filter(|k| self.contains(*k));
    }

    /// The selected element set.
    #[must_use]
    pub fn selected(&self) -> &HashSet<K> {
        &self.selected
    }

    /// Adds a live element to the selection.
    pub fn select(&mut self, key: K) {
        if self.contains(key) {
            self.selected.insert(key);
        }
    }

    /// Removes an element from the selection.
    pub fn deselect(&mut self, key: K) {
        self.selected.remove(&key);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Removes every element and all editor state.
    pub(crate) fn clear(&mut self) {
        self.elems.clear();
        self.retained.clear();
        self.active = None;
        self.highlighted = None;
        self.selected.clear();
    }
}

impl<K: slotmap::Key, T: Element + Clone> Clone for ElemStore<K, T> {
    fn clone(&self) -> Self {
        Self {
            elems: self.elems.clone(),
            retained: self.retained.clone(),
            retain_slots: self.retain_slots,
            active: self.active,
            highlighted: self.highlighted,
            selected: self.selected.clone(),
        }
    }
}
