//! Structural-delta notifications.
//!
//! A mesh can carry one journal; every Euler operator reports each
//! primitive element creation and destruction through it, so undo
//! systems and incremental GPU-buffer consumers can replay the exact
//! delta without re-deriving it from the mesh.

use crate::topology::elem::{ElemId, ElemKind};

/// A kind-plus-id reference to an element, stable across the element's
/// lifetime (unlike store keys, which are an in-memory concern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElemRef {
    /// The element's kind.
    pub kind: ElemKind,
    /// The element's id.
    pub id: ElemId,
}

impl ElemRef {
    /// Creates a reference from kind and id.
    #[must_use]
    pub fn new(kind: ElemKind, id: ElemId) -> Self {
        Self { kind, id }
    }
}

/// Receives one notification per primitive element created or destroyed.
///
/// Notifications fire in mutation order; a destroyed element's id may be
/// reused by a later creation when id recycling is enabled.
pub trait DeltaJournal {
    /// Called after an element is created.
    fn created(&mut self, elem: ElemRef);

    /// Called before an element is destroyed.
    fn destroyed(&mut self, elem: ElemRef);
}

/// A journal that records every delta in order; useful for tests and as
/// a building block for undo stacks.
#[derive(Debug, Default)]
pub struct RecordingJournal {
    /// Creations, in order.
    pub created: Vec<ElemRef>,
    /// Destructions, in order.
    pub destroyed: Vec<ElemRef>,
}

impl DeltaJournal for RecordingJournal {
    fn created(&mut self, elem: ElemRef) {
        self.created.push(elem);
    }

    fn destroyed(&mut self, elem: ElemRef) {
        self.destroyed.push(elem);
    }
}
