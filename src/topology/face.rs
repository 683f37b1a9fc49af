use crate::customdata::Block;
use crate::math::{Point3, Vector3};

use super::elem::{ElemFlags, ElemId, ElemKind, Element};
use super::loops::LoopKey;

slotmap::new_key_type! {
    /// Live reference to a face; valid only while the face is alive.
    pub struct FaceKey;
}

/// One closed loop cycle bounding a face.
#[derive(Debug, Clone, Copy)]
pub struct Boundary {
    /// Entry point into the boundary's loop cycle.
    pub first: LoopKey,
    /// Cached cycle length, maintained by every operator that grows or
    /// shrinks the cycle.
    pub len: usize,
}

/// A topological face.
///
/// `boundaries[0]` is the outer boundary; any further entries are
/// holes. Normal, centroid, and area are derived from the outer
/// boundary and cached.
#[derive(Debug, Clone)]
pub struct Face {
    /// Stable element id.
    pub id: ElemId,
    /// Element flags.
    pub flags: ElemFlags,
    /// Outer boundary first, then holes.
    pub boundaries: Vec<Boundary>,
    /// Cached face normal.
    pub normal: Vector3,
    /// Cached vertex centroid.
    pub centroid: Point3,
    /// Cached face area.
    pub area: f64,
    /// Per-face custom data.
    pub custom: Block,
    /// Cached dense index.
    pub index: usize,
}

impl Face {
    /// Creates a face with no boundaries; the caller builds and
    /// attaches the loop cycles.
    #[must_use]
    pub(crate) fn new(id: ElemId, custom: Block) -> Self {
        Self {
            id,
            flags: ElemFlags::empty(),
            boundaries: Vec::new(),
            normal: Vector3::zeros(),
            centroid: Point3::origin(),
            area: 0.0,
            custom,
            index: 0,
        }
    }

    /// The outer boundary, if the face has one.
    #[must_use]
    pub fn outer(&self) -> Option<&Boundary> {
        self.boundaries.first()
    }

    /// Number of hole boundaries.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }
}

impl Element for Face {
    const KIND: ElemKind = ElemKind::Face;

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
        self.boundaries.clear();
    }
}
