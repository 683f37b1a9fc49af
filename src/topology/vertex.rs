use crate::customdata::Block;
use crate::math::{Point3, Vector3};

use super::edge::EdgeKey;
use super::elem::{ElemFlags, ElemId, ElemKind, Element};

slotmap::new_key_type! {
    /// Live reference to a vertex; valid only while the vertex is alive.
    pub struct VertKey;
}

/// A topological vertex.
///
/// Carries its disk cycle as an unordered, duplicate-free collection of
/// incident edges. The normal is derived from the incident faces and
/// cached.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Stable element id.
    pub id: ElemId,
    /// Element flags.
    pub flags: ElemFlags,
    /// The 3D position of the vertex.
    pub position: Point3,
    /// Cached vertex normal.
    pub normal: Vector3,
    /// The disk cycle: every edge incident to this vertex, in insertion
    /// order. No geometric sorting is guaranteed.
    pub edges: Vec<EdgeKey>,
    /// Per-vertex custom data.
    pub custom: Block,
    /// Cached dense index.
    pub index: usize,
}

impl Vertex {
    /// Creates a vertex at `position` with no incident edges.
    #[must_use]
    pub(crate) fn new(id: ElemId, position: Point3, custom: Block) -> Self {
        Self {
            id,
            flags: ElemFlags::empty(),
            position,
            normal: Vector3::zeros(),
            edges: Vec::new(),
            custom,
            index: 0,
        }
    }

    /// Number of incident edges.
    #[must_use]
    pub fn valence(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no edge is incident to this vertex.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Element for Vertex {
    const KIND: ElemKind = ElemKind::Vertex;

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
        self.edges.clear();
    }
}
