pub mod cycles;
pub mod edge;
pub mod elem;
pub mod face;
pub mod ident;
pub mod loops;
pub mod store;
pub mod vertex;

pub use cycles::{walk_boundary, walk_radial, MAX_CYCLE_LEN};
pub use edge::{Edge, EdgeHandles, EdgeKey};
pub use elem::{ElemFlags, ElemId, ElemKind, Element};
pub use face::{Boundary, Face, FaceKey};
pub use ident::IdGen;
pub use loops::{Loop, LoopKey};
pub use store::ElemStore;
pub use vertex::{VertKey, Vertex};

use std::fmt;

use crate::customdata::{Block, CustomDataLayout, LayerDescriptor};
use crate::error::Result;
use crate::journal::{DeltaJournal, ElemRef};
use crate::math::polygon_3d::{polygon_area_3d, polygon_centroid_3d, polygon_normal_3d};
use crate::math::{cubic_length, Point3, TOLERANCE};

/// Mesh-wide feature bits, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFeatures(u32);

impl MeshFeatures {
    /// Vertex creation through `MakeVertex` is permitted.
    pub const VERT_CREATE: MeshFeatures = MeshFeatures(1);
    /// Edges may carry curve-control handles.
    pub const CURVE_HANDLES: MeshFeatures = MeshFeatures(1 << 1);
    /// The validator requires a single connected component.
    pub const SINGLE_SHELL: MeshFeatures = MeshFeatures(1 << 2);
    /// Freed element ids are recycled.
    pub const ID_REUSE: MeshFeatures = MeshFeatures(1 << 3);
    /// Freed slots are tombstoned until an explicit compaction pass.
    pub const RETAIN_SLOTS: MeshFeatures = MeshFeatures(1 << 4);

    /// No features enabled.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// The raw bits.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Reconstructs features from raw bits.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns `true` if all bits of `other` are set.
    #[must_use]
    pub fn contains(self, other: MeshFeatures) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two feature sets.
    #[must_use]
    pub fn union(self, other: MeshFeatures) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for MeshFeatures {
    fn default() -> Self {
        Self::VERT_CREATE.union(Self::ID_REUSE)
    }
}

/// Derived-data invalidation bits; consumers clear what they refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    /// Connectivity changed.
    pub const TOPOLOGY: DirtyFlags = DirtyFlags(1);
    /// Positions or cached geometry changed.
    pub const GEOMETRY: DirtyFlags = DirtyFlags(1 << 1);
    /// Cached normals are stale.
    pub const NORMALS: DirtyFlags = DirtyFlags(1 << 2);

    /// No bits set.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if all bits of `other` are set.
    #[must_use]
    pub fn contains(self, other: DirtyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[must_use]
    pub fn union(self, other: DirtyFlags) -> Self {
        Self(self.0 | other.0)
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: DirtyFlags) {
        self.0 |= other.0;
    }
}

/// The mesh aggregate: four element stores, the id generator, feature
/// flags, per-kind custom-data layouts, and the optional delta journal.
///
/// Elements are created and destroyed only through the Euler operators
/// in [`crate::operations`]; the `pub(crate)` allocate/free primitives
/// here are their single entry point, so every mutation assigns ids,
/// notifies the journal, and bumps the update generation consistently.
pub struct Mesh {
    pub(crate) verts: ElemStore<VertKey, Vertex>,
    pub(crate) edges: ElemStore<EdgeKey, Edge>,
    pub(crate) loops: ElemStore<LoopKey, Loop>,
    pub(crate) faces: ElemStore<FaceKey, Face>,
    pub(crate) ids: IdGen,
    pub(crate) features: MeshFeatures,
    pub(crate) vert_layout: CustomDataLayout,
    pub(crate) edge_layout: CustomDataLayout,
    pub(crate) loop_layout: CustomDataLayout,
    pub(crate) face_layout: CustomDataLayout,
    pub(crate) journal: Option<Box<dyn DeltaJournal>>,
    pub(crate) generation: u64,
    pub(crate) dirty: DirtyFlags,
}

impl Mesh {
    /// Creates an empty mesh with the default features.
    #[must_use]
    pub fn new() -> Self {
        Self::with_features(MeshFeatures::default())
    }

    /// Creates an empty mesh with the given features.
    #[must_use]
    pub fn with_features(features: MeshFeatures) -> Self {
        let retain = features.contains(MeshFeatures::RETAIN_SLOTS);
        Self {
            verts: ElemStore::new(retain),
            edges: ElemStore::new(retain),
            loops: ElemStore::new(retain),
            faces: ElemStore::new(retain),
            ids: IdGen::new(),
            features,
            vert_layout: CustomDataLayout::new(),
            edge_layout: CustomDataLayout::new(),
            loop_layout: CustomDataLayout::new(),
            face_layout: CustomDataLayout::new(),
            journal: None,
            generation: 0,
            dirty: DirtyFlags::empty(),
        }
    }

    /// The mesh's feature flags.
    #[must_use]
    pub fn features(&self) -> MeshFeatures {
        self.features
    }

    // --- Accessors ---

    /// Returns the vertex behind `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is dead.
    pub fn vertex(&self, key: VertKey) -> Result<&Vertex> {
        Ok(self.verts.get(key)?)
    }

    /// Mutable variant of [`Mesh::vertex`].
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is dead.
    pub fn vertex_mut(&mut self, key: VertKey) -> Result<&mut Vertex> {
        Ok(self.verts.get_mut(key)?)
    }

    /// Returns the edge behind `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is dead.
    pub fn edge(&self, key: EdgeKey) -> Result<&Edge> {
        Ok(self.edges.get(key)?)
    }

    /// Mutable variant of [`Mesh::edge`].
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is dead.
    pub fn edge_mut(&mut self, key: EdgeKey) -> Result<&mut Edge> {
        Ok(self.edges.get_mut(key)?)
    }

    /// Returns the loop behind `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is dead.
    pub fn face_loop(&self, key: LoopKey) -> Result<&Loop> {
        Ok(self.loops.get(key)?)
    }

    /// Mutable variant of [`Mesh::face_loop`].
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is dead.
    pub fn face_loop_mut(&mut self, key: LoopKey) -> Result<&mut Loop> {
        Ok(self.loops.get_mut(key)?)
    }

    /// Returns the face behind `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is dead.
    pub fn face(&self, key: FaceKey) -> Result<&Face> {
        Ok(self.faces.get(key)?)
    }

    /// Mutable variant of [`Mesh::face`].
    ///
    /// # Errors
    ///
    /// Returns an error if the face is dead.
    pub fn face_mut(&mut self, key: FaceKey) -> Result<&mut Face> {
        Ok(self.faces.get_mut(key)?)
    }

    /// The vertex store.
    #[must_use]
    pub fn vertex_store(&self) -> &ElemStore<VertKey, Vertex> {
        &self.verts
    }

    /// Mutable access to the vertex store's editor state.
    pub fn vertex_store_mut(&mut self) -> &mut ElemStore<VertKey, Vertex> {
        &mut self.verts
    }

    /// The edge store.
    #[must_use]
    pub fn edge_store(&self) -> &ElemStore<EdgeKey, Edge> {
        &self.edges
    }

    /// Mutable access to the edge store's editor state.
    pub fn edge_store_mut(&mut self) -> &mut ElemStore<EdgeKey, Edge> {
        &mut self.edges
    }

    /// The loop store.
    #[must_use]
    pub fn loop_store(&self) -> &ElemStore<LoopKey, Loop> {
        &self.loops
    }

    /// The face store.
    #[must_use]
    pub fn face_store(&self) -> &ElemStore<FaceKey, Face> {
        &self.faces
    }

    /// Mutable access to the face store's editor state.
    pub fn face_store_mut(&mut self) -> &mut ElemStore<FaceKey, Face> {
        &mut self.faces
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live loops.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// The id generator.
    #[must_use]
    pub fn ids(&self) -> &IdGen {
        &self.ids
    }

    // --- Journal and invalidation ---

    /// Installs a delta journal; replaces any previous one.
    pub fn set_journal(&mut self, journal: Box<dyn DeltaJournal>) {
        self.journal = Some(journal);
    }

    /// Removes and returns the installed journal.
    pub fn take_journal(&mut self) -> Option<Box<dyn DeltaJournal>> {
        self.journal.take()
    }

    /// Monotonic update generation; bumped by every structural change.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The pending derived-data invalidation bits.
    #[must_use]
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Clears the invalidation bits after derived data is refreshed.
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::empty();
    }

    pub(crate) fn touch(&mut self, flags: DirtyFlags) {
        self.generation += 1;
        self.dirty.insert(flags);
    }

    fn notify_created(&mut self, kind: ElemKind, id: ElemId) {
        if let Some(journal) = self.journal.as_mut() {
            journal.created(ElemRef::new(kind, id));
        }
    }

    fn notify_destroyed(&mut self, kind: ElemKind, id: ElemId) {
        if let Some(journal) = self.journal.as_mut() {
            journal.destroyed(ElemRef::new(kind, id));
        }
    }

    // --- Allocation / free primitives (operator use only) ---

    pub(crate) fn alloc_vertex(&mut self, position: Point3) -> VertKey {
        let id = self.ids.next();
        let custom = self.vert_layout.default_block();
        let key = self.verts.insert(Vertex::new(id, position, custom));
        self.notify_created(ElemKind::Vertex, id);
        self.touch(DirtyFlags::TOPOLOGY.union(DirtyFlags::GEOMETRY));
        key
    }

    pub(crate) fn alloc_edge(&mut self, v1: VertKey, v2: VertKey) -> Result<EdgeKey> {
        let p1 = self.verts.get(v1)?.position;
        let p2 = self.verts.get(v2)?.position;
        let id = self.ids.next();
        let custom = self.edge_layout.default_block();
        let mut edge = Edge::new(id, v1, v2, custom);
        edge.length = (p2 - p1).norm();
        let key = self.edges.insert(edge);
        self.notify_created(ElemKind::Edge, id);
        self.touch(DirtyFlags::TOPOLOGY);
        Ok(key)
    }

    pub(crate) fn alloc_loop(&mut self, vert: VertKey, edge: EdgeKey, face: FaceKey) -> LoopKey {
        let id = self.ids.next();
        let custom = self.loop_layout.default_block();
        let key = self.loops.insert(Loop::new(id, vert, edge, face, custom));
        self.notify_created(ElemKind::Loop, id);
        self.touch(DirtyFlags::TOPOLOGY);
        key
    }

    pub(crate) fn alloc_face(&mut self) -> FaceKey {
        let id = self.ids.next();
        let custom = self.face_layout.default_block();
        let key = self.faces.insert(Face::new(id, custom));
        self.notify_created(ElemKind::Face, id);
        self.touch(DirtyFlags::TOPOLOGY);
        key
    }

    pub(crate) fn free_vertex(&mut self, key: VertKey) {
        let id = self.verts.get(key).map(|v| v.id).ok();
        if id.is_some() {
            self.verts.free(key);
        }
        self.free_elem_id(ElemKind::Vertex, id);
    }

    pub(crate) fn free_edge(&mut self, key: EdgeKey) {
        let id = self.edges.get(key).map(|e| e.id).ok();
        if id.is_some() {
            self.edges.free(key);
        }
        self.free_elem_id(ElemKind::Edge, id);
    }

    pub(crate) fn free_loop(&mut self, key: LoopKey) {
        let id = self.loops.get(key).map(|l| l.id).ok();
        if id.is_some() {
            self.loops.free(key);
        }
        self.free_elem_id(ElemKind::Loop, id);
    }

    pub(crate) fn free_face(&mut self, key: FaceKey) {
        let id = self.faces.get(key).map(|f| f.id).ok();
        if id.is_some() {
            self.faces.free(key);
        }
        self.free_elem_id(ElemKind::Face, id);
    }

    fn free_elem_id(&mut self, kind: ElemKind, id: Option<ElemId>) {
        let Some(id) = id else {
            log::warn!("ignoring free of dead {kind}");
            return;
        };
        self.notify_destroyed(kind, id);
        if self.features.contains(MeshFeatures::ID_REUSE) {
            self.ids.free(id);
        }
        self.touch(DirtyFlags::TOPOLOGY);
    }

    /// Replaces `edge`'s id with `id`, reserving it in the generator.
    pub(crate) fn reassign_edge_id(&mut self, edge: EdgeKey, id: ElemId) -> Result<()> {
        let current = self.edges.get(edge)?.id;
        if current == id {
            return Ok(());
        }
        self.ids.reserve(id);
        if self.features.contains(MeshFeatures::ID_REUSE) {
            self.ids.free(current);
        }
        self.edges.get_mut(edge)?.id = id;
        Ok(())
    }

    // --- Queries ---

    /// Finds an edge between `v1` and `v2`, scanning the smaller disk.
    ///
    /// With parallel edges present, which one is returned is
    /// unspecified (first in disk order).
    #[must_use]
    pub fn find_edge(&self, v1: VertKey, v2: VertKey) -> Option<EdgeKey> {
        let d1 = self.verts.get(v1).ok()?;
        let d2 = self.verts.get(v2).ok()?;
        let (scan, other) = if d1.edges.len() <= d2.edges.len() {
            (&d1.edges, v2)
        } else {
            (&d2.edges, v1)
        };
        scan.iter()
            .copied()
            .find(|&e| self.edges.get(e).is_ok_and(|edge| edge.uses(other)))
    }

    /// Collects the faces adjacent to `v`, in disk/radial order,
    /// without duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` is dead or a cycle is corrupted.
    pub fn faces_around_vertex(&self, v: VertKey) -> Result<Vec<FaceKey>> {
        let disk = self.verts.get(v)?.edges.clone();
        let mut faces = Vec::new();
        for e in disk {
            for l in walk_radial(self, e)? {
                let f = self.loops.get(l)?.face;
                if !faces.contains(&f) {
                    faces.push(f);
                }
            }
        }
        Ok(faces)
    }

    /// Finds the loop of face `f` starting at vertex `v`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `f` is dead or a boundary is corrupted.
    pub fn loop_of_vertex_in_face(&self, f: FaceKey, v: VertKey) -> Result<Option<LoopKey>> {
        let boundaries = self.faces.get(f)?.boundaries.clone();
        for b in boundaries {
            for l in walk_boundary(self, b.first)? {
                if self.loops.get(l)?.vert == v {
                    return Ok(Some(l));
                }
            }
        }
        Ok(None)
    }

    /// Index of the boundary of `f` whose cycle contains loop `l`.
    pub(crate) fn boundary_index_of(&self, f: FaceKey, l: LoopKey) -> Result<usize> {
        let boundaries = self.faces.get(f)?.boundaries.clone();
        for (i, b) in boundaries.iter().enumerate() {
            if walk_boundary(self, b.first)?.contains(&l) {
                return Ok(i);
            }
        }
        Err(crate::error::TopologyError::StructuralCorruption(format!(
            "loop {} not found in any boundary of its face",
            self.loops.get(l)?.id
        ))
        .into())
    }

    // --- Custom-data layer management ---

    /// The layer layout of one element kind.
    #[must_use]
    pub fn layout(&self, kind: ElemKind) -> &CustomDataLayout {
        match kind {
            ElemKind::Vertex => &self.vert_layout,
            ElemKind::Edge => &self.edge_layout,
            ElemKind::Loop => &self.loop_layout,
            ElemKind::Face => &self.face_layout,
        }
    }

    /// Adds a layer to one element kind, extending every live block,
    /// and returns the layer's index.
    pub fn add_layer(&mut self, kind: ElemKind, descriptor: LayerDescriptor) -> usize {
        let default = crate::customdata::Value::zero(descriptor.kind);
        let index = match kind {
            ElemKind::Vertex => self.vert_layout.add_layer(descriptor),
            ElemKind::Edge => self.edge_layout.add_layer(descriptor),
            ElemKind::Loop => self.loop_layout.add_layer(descriptor),
            ElemKind::Face => self.face_layout.add_layer(descriptor),
        };
        self.for_each_block(kind, |block| block.push_value(default));
        index
    }

    /// Removes a layer by name, shrinking every live block; returns the
    /// removed layer's old index.
    pub fn remove_layer(&mut self, kind: ElemKind, name: &str) -> Option<usize> {
        let index = match kind {
            ElemKind::Vertex => self.vert_layout.remove_layer(name),
            ElemKind::Edge => self.edge_layout.remove_layer(name),
            ElemKind::Loop => self.loop_layout.remove_layer(name),
            ElemKind::Face => self.face_layout.remove_layer(name),
        }?;
        self.for_each_block(kind, |block| block.remove_value(index));
        Some(index)
    }

    fn for_each_block(&mut self, kind: ElemKind, mut apply: impl FnMut(&mut Block)) {
        match kind {
            ElemKind::Vertex => {
                for (_, v) in self.verts.iter_mut() {
                    apply(&mut v.custom);
                }
            }
            ElemKind::Edge => {
                for (_, e) in self.edges.iter_mut() {
                    apply(&mut e.custom);
                }
            }
            ElemKind::Loop => {
                for (_, l) in self.loops.iter_mut() {
                    apply(&mut l.custom);
                }
            }
            ElemKind::Face => {
                for (_, f) in self.faces.iter_mut() {
                    apply(&mut f.custom);
                }
            }
        }
    }

    // --- Derived-data recalculation ---

    /// Recomputes the cached normal, centroid, and area of `f` from its
    /// outer boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if `f` is dead or its boundary is corrupted.
    pub fn recalc_face_geometry(&mut self, f: FaceKey) -> Result<()> {
        let Some(outer) = self.faces.get(f)?.outer().copied() else {
            return Ok(());
        };
        let mut points = Vec::new();
        for l in walk_boundary(self, outer.first)? {
            let v = self.loops.get(l)?.vert;
            points.push(self.verts.get(v)?.position);
        }
        let face = self.faces.get_mut(f)?;
        face.normal = polygon_normal_3d(&points);
        face.centroid = polygon_centroid_3d(&points);
        face.area = polygon_area_3d(&points);
        Ok(())
    }

    /// Recomputes the cached length of `e`, curve-evaluated when
    /// handles are present.
    ///
    /// # Errors
    ///
    /// Returns an error if `e` or an endpoint is dead.
    pub fn recalc_edge_length(&mut self, e: EdgeKey) -> Result<()> {
        let edge = self.edges.get(e)?;
        let (v1, v2, handles) = (edge.v1, edge.v2, edge.handles.clone());
        let p1 = self.verts.get(v1)?.position;
        let p2 = self.verts.get(v2)?.position;
        let length = match handles {
            Some(h) => cubic_length(&p1, &h.h1, &h.h2, &p2),
            None => (p2 - p1).norm(),
        };
        self.edges.get_mut(e)?.length = length;
        Ok(())
    }

    /// Recomputes the cached normal of `v` by averaging adjacent face
    /// normals; zero for vertices with no faces.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` is dead or a cycle is corrupted.
    pub fn recalc_vertex_normal(&mut self, v: VertKey) -> Result<()> {
        let mut sum = crate::math::Vector3::zeros();
        for f in self.faces_around_vertex(v)? {
            sum += self.faces.get(f)?.normal;
        }
        let len = sum.norm();
        self.verts.get_mut(v)?.normal = if len < TOLERANCE { sum } else { sum / len };
        Ok(())
    }

    /// Recomputes every vertex normal.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn recalc_vertex_normals(&mut self) -> Result<()> {
        let keys: Vec<VertKey> = self.verts.iter().map(|(k, _)| k).collect();
        for v in keys {
            self.recalc_vertex_normal(v)?;
        }
        Ok(())
    }

    // --- Bulk operations ---

    /// Removes every element and resets the id generator.
    pub fn clear(&mut self) {
        self.verts.clear();
        self.edges.clear();
        self.loops.clear();
        self.faces.clear();
        self.ids.clear();
        self.touch(DirtyFlags::TOPOLOGY.union(DirtyFlags::GEOMETRY));
    }

    /// Physically removes tombstoned slots from all four stores.
    ///
    /// Dense indices are renumbered; ids and keys of live elements are
    /// unaffected.
    pub fn compact(&mut self) {
        self.verts.compact();
        self.edges.compact();
        self.loops.compact();
        self.faces.compact();
    }

    /// Deep-copies the mesh: elements keep their ids and keys; the
    /// journal is not carried over.
    #[must_use]
    pub fn copy(&self) -> Mesh {
        Mesh {
            verts: self.verts.clone(),
            edges: self.edges.clone(),
            loops: self.loops.clone(),
            faces: self.faces.clone(),
            ids: self.ids.clone(),
            features: self.features,
            vert_layout: self.vert_layout.clone(),
            edge_layout: self.edge_layout.clone(),
            loop_layout: self.loop_layout.clone(),
            face_layout: self.face_layout.clone(),
            journal: None,
            generation: self.generation,
            dirty: self.dirty,
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.verts.len())
            .field("edges", &self.edges.len())
            .field("loops", &self.loops.len())
            .field("faces", &self.faces.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
