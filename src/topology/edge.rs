use serde::{Deserialize, Serialize};

use crate::customdata::Block;
use crate::math::Point3;

use super::elem::{ElemFlags, ElemId, ElemKind, Element};
use super::loops::LoopKey;
use super::vertex::VertKey;

slotmap::new_key_type! {
    /// Live reference to an edge; valid only while the edge is alive.
    pub struct EdgeKey;
}

/// Curve-control points of a curved edge.
///
/// Present only when the mesh's curve-handle feature is enabled; the
/// edge then evaluates as the cubic Bezier `(v1, h1, h2, v2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeHandles {
    /// Control point nearest `v1`.
    pub h1: Point3,
    /// Control point nearest `v2`.
    pub h2: Point3,
}

/// A topological edge between two vertices.
///
/// The endpoints are unordered as far as connectivity is concerned, but
/// the `v1`/`v2` positions are fixed bookkeeping slots that operators
/// may swap. `radial` is one representative loop of the radial cycle,
/// or `None` for a wire edge with no adjacent face.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Stable element id.
    pub id: ElemId,
    /// Element flags.
    pub flags: ElemFlags,
    /// First endpoint.
    pub v1: VertKey,
    /// Second endpoint.
    pub v2: VertKey,
    /// Entry point into the radial cycle; `None` for wire edges.
    pub radial: Option<LoopKey>,
    /// Optional curve-control points, owned by the edge.
    pub handles: Option<EdgeHandles>,
    /// Cached edge length.
    pub length: f64,
    /// Per-edge custom data.
    pub custom: Block,
    /// Cached dense index.
    pub index: usize,
}

impl Edge {
    /// Creates a wire edge between two vertices.
    #[must_use]
    pub(crate) fn new(id: ElemId, v1: VertKey, v2: VertKey, custom: Block) -> Self {
        Self {
            id,
            flags: ElemFlags::empty(),
            v1,
            v2,
            radial: None,
            handles: None,
            length: 0.0,
            custom,
            index: 0,
        }
    }

    /// Returns `true` if `v` is one of the two endpoints.
    #[must_use]
    pub fn uses(&self, v: VertKey) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, v: VertKey) -> Option<VertKey> {
        if v == self.v1 {
            Some(self.v2)
        } else if v == self.v2 {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Returns `true` if the edge has no adjacent face.
    #[must_use]
    pub fn is_wire(&self) -> bool {
        self.radial.is_none()
    }

    /// Swaps the endpoint `from` for `to`; returns `false` if `from`
    /// was not an endpoint.
    pub(crate) fn replace_end(&mut self, from: VertKey, to: VertKey) -> bool {
        if self.v1 == from {
            self.v1 = to;
            true
        } else if self.v2 == from {
            self.v2 = to;
            true
        } else {
            false
        }
    }
}

impl Element for Edge {
    const KIND: ElemKind = ElemKind::Edge;

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
        self.radial = None;
        self.handles = None;
    }
}
