use crate::customdata::Block;

use super::edge::EdgeKey;
use super::elem::{ElemFlags, ElemId, ElemKind, Element};
use super::face::FaceKey;
use super::vertex::VertKey;

slotmap::new_key_type! {
    /// Live reference to a loop; valid only while the loop is alive.
    pub struct LoopKey;
}

/// One corner of one face boundary.
///
/// A loop starts at `vert` and runs along `edge` to the next loop's
/// vertex, in the face's winding order. `next`/`prev` trace the
/// boundary cycle around the face; `radial_next`/`radial_prev` trace
/// the radial cycle around the edge, across every face using it. A
/// loop is exclusively owned by its face and is never shared between
/// two boundaries.
#[derive(Debug, Clone)]
pub struct Loop {
    /// Stable element id.
    pub id: ElemId,
    /// Element flags.
    pub flags: ElemFlags,
    /// The vertex this corner starts at.
    pub vert: VertKey,
    /// The edge to the next corner's vertex.
    pub edge: EdgeKey,
    /// The owning face.
    pub face: FaceKey,
    /// Next loop around the boundary.
    pub next: LoopKey,
    /// Previous loop around the boundary.
    pub prev: LoopKey,
    /// Next loop around the edge's radial cycle.
    pub radial_next: LoopKey,
    /// Previous loop around the edge's radial cycle.
    pub radial_prev: LoopKey,
    /// Per-corner custom data.
    pub custom: Block,
    /// Cached dense index.
    pub index: usize,
}

impl Loop {
    /// Creates an unlinked loop; the caller splices it into its
    /// boundary and radial cycles.
    #[must_use]
    pub(crate) fn new(id: ElemId, vert: VertKey, edge: EdgeKey, face: FaceKey, custom: Block) -> Self {
        Self {
            id,
            flags: ElemFlags::empty(),
            vert,
            edge,
            face,
            next: LoopKey::default(),
            prev: LoopKey::default(),
            radial_next: LoopKey::default(),
            radial_prev: LoopKey::default(),
            custom,
            index: 0,
        }
    }
}

impl Element for Loop {
    const KIND: ElemKind = ElemKind::Loop;

    fn id(&self) -> ElemId {
        self.id
    }

    fn flags(&self) -> ElemFlags {
        self.flags
    }

    fn flags_mut(&mut self) -> &mut ElemFlags {
        &mut self.flags
    }

    fn custom(&self) -> &Block {
        &self.custom
    }

    fn custom_mut(&mut self) -> &mut Block {
        &mut self.custom
    }

    fn index(&self) -> usize {
        self.index
    }

    fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    fn clear_links(&mut self) {
        self.next = LoopKey::default();
        self.prev = LoopKey::default();
        self.radial_next = LoopKey::default();
        self.radial_prev = LoopKey::default();
    }
}
