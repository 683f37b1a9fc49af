//! Snapshot serialization of a whole mesh.
//!
//! A [`MeshSnapshot`] is a self-contained, serde-serializable value
//! holding everything a mesh needs to survive a save/load round trip:
//! feature bits, id generator state, custom-data layouts, and the
//! elements themselves with cross-references expressed as stable ids
//! instead of slot keys. Derived caches (normals, centroids, areas,
//! edge lengths, dense indices) are not stored; restoring recomputes
//! them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::customdata::{Block, LayerDescriptor};
use crate::error::{Result, SnapshotError};
use crate::math::Point3;
use crate::topology::cycles::{boundary_link, disk_attach, radial_attach};
use crate::topology::{
    walk_boundary, Boundary, Edge, EdgeHandles, EdgeKey, ElemFlags, ElemId, ElemKind, Face, IdGen,
    Loop, LoopKey, Mesh, MeshFeatures, VertKey, Vertex,
};

/// One persisted vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertRecord {
    /// Stable element id.
    pub id: ElemId,
    /// The vertex position.
    pub position: Point3,
    /// Persisted flag bits.
    pub flags: u8,
    /// Per-vertex custom data.
    pub custom: Block,
}

/// One persisted edge; endpoints are vertex ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Stable element id.
    pub id: ElemId,
    /// First endpoint's vertex id.
    pub v1: ElemId,
    /// Second endpoint's vertex id.
    pub v2: ElemId,
    /// Optional curve-control points.
    pub handles: Option<EdgeHandles>,
    /// Persisted flag bits.
    pub flags: u8,
    /// Per-edge custom data.
    pub custom: Block,
}

/// One persisted face corner; references are element ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerRecord {
    /// Stable element id of the loop.
    pub id: ElemId,
    /// The vertex this corner starts at.
    pub vert: ElemId,
    /// The edge to the next corner's vertex.
    pub edge: ElemId,
    /// Persisted flag bits.
    pub flags: u8,
    /// Per-corner custom data.
    pub custom: Block,
}

/// One persisted face with its boundaries in winding order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRecord {
    /// Stable element id.
    pub id: ElemId,
    /// Persisted flag bits.
    pub flags: u8,
    /// Per-face custom data.
    pub custom: Block,
    /// Outer boundary first, then holes; each is a corner cycle.
    pub boundaries: Vec<Vec<CornerRecord>>,
}

/// A complete, id-addressed copy of one mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSnapshot {
    /// The mesh's feature bits.
    pub features: u32,
    /// Id generator counter.
    pub id_counter: u64,
    /// Id generator pending-free list, oldest first.
    pub id_free: Vec<ElemId>,
    /// Vertex custom-data layout.
    pub vertex_layers: Vec<LayerDescriptor>,
    /// Edge custom-data layout.
    pub edge_layers: Vec<LayerDescriptor>,
    /// Loop custom-data layout.
    pub loop_layers: Vec<LayerDescriptor>,
    /// Face custom-data layout.
    pub face_layers: Vec<LayerDescriptor>,
    /// All live vertices.
    pub vertices: Vec<VertRecord>,
    /// All live edges.
    pub edges: Vec<EdgeRecord>,
    /// All live faces with their corners.
    pub faces: Vec<FaceRecord>,
}

fn persisted(flags: ElemFlags) -> u8 {
    flags.bits() & ElemFlags::PERSIST_MASK
}

impl MeshSnapshot {
    /// Captures the mesh into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary cycle is corrupted.
    pub fn capture(mesh: &Mesh) -> Result<Self> {
        let mut vertices = Vec::with_capacity(mesh.vertex_count());
        for (_, v) in mesh.vertex_store().iter() {
            vertices.push(VertRecord {
                id: v.id,
                position: v.position,
                flags: persisted(v.flags),
                custom: v.custom.clone(),
            });
        }

        let mut edges = Vec::with_capacity(mesh.edge_count());
        for (_, e) in mesh.edge_store().iter() {
            edges.push(EdgeRecord {
                id: e.id,
                v1: mesh.vertex(e.v1)?.id,
                v2: mesh.vertex(e.v2)?.id,
                handles: e.handles.clone(),
                flags: persisted(e.flags),
                custom: e.custom.clone(),
            });
        }

        let mut faces = Vec::with_capacity(mesh.face_count());
        for (_, f) in mesh.face_store().iter() {
            let mut boundaries = Vec::with_capacity(f.boundaries.len());
            for b in &f.boundaries {
                let mut corners = Vec::with_capacity(b.len);
                for l in walk_boundary(mesh, b.first)? {
                    let lp = mesh.face_loop(l)?;
                    corners.push(CornerRecord {
                        id: lp.id,
                        vert: mesh.vertex(lp.vert)?.id,
                        edge: mesh.edge(lp.edge)?.id,
                        flags: persisted(lp.flags),
                        custom: lp.custom.clone(),
                    });
                }
                boundaries.push(corners);
            }
            faces.push(FaceRecord {
                id: f.id,
                flags: persisted(f.flags),
                custom: f.custom.clone(),
                boundaries,
            });
        }

        Ok(Self {
            features: mesh.features().bits(),
            id_counter: mesh.ids().counter(),
            id_free: mesh.ids().free_list().to_vec(),
            vertex_layers: mesh.layout(ElemKind::Vertex).layers().to_vec(),
            edge_layers: mesh.layout(ElemKind::Edge).layers().to_vec(),
            loop_layers: mesh.layout(ElemKind::Loop).layers().to_vec(),
            face_layers: mesh.layout(ElemKind::Face).layers().to_vec(),
            vertices,
            edges,
            faces,
        })
    }

    /// Rebuilds a mesh from the snapshot, recomputing all derived
    /// caches.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] variants for duplicate or out-of-range
    /// ids, unresolved cross-references, custom-data blocks that do not
    /// match their layout, and structurally malformed boundaries.
    #[allow(clippy::too_many_lines)]
    pub fn restore(&self) -> Result<Mesh> {
        let mut mesh = Mesh::with_features(MeshFeatures::from_bits(self.features));
        for layer in &self.vertex_layers {
            mesh.vert_layout.add_layer(layer.clone());
        }
        for layer in &self.edge_layers {
            mesh.edge_layout.add_layer(layer.clone());
        }
        for layer in &self.loop_layers {
            mesh.loop_layout.add_layer(layer.clone());
        }
        for layer in &self.face_layers {
            mesh.face_layout.add_layer(layer.clone());
        }

        let free: HashSet<ElemId> = self.id_free.iter().copied().collect();
        if free.len() != self.id_free.len() {
            return Err(SnapshotError::Malformed("free list repeats an id".into()).into());
        }
        for id in &self.id_free {
            if id.0 >= self.id_counter {
                return Err(SnapshotError::Malformed(format!(
                    "free id {id} is beyond the id counter"
                ))
                .into());
            }
        }
        let mut seen: HashSet<ElemId> = HashSet::new();
        let mut claim = |kind: ElemKind, id: ElemId| -> Result<()> {
            if !seen.insert(id) {
                return Err(SnapshotError::DuplicateId { kind, id }.into());
            }
            if id.0 >= self.id_counter {
                return Err(SnapshotError::Malformed(format!(
                    "{kind} id {id} is beyond the id counter"
                ))
                .into());
            }
            if free.contains(&id) {
                return Err(
                    SnapshotError::Malformed(format!("{kind} id {id} is on the free list")).into(),
                );
            }
            Ok(())
        };

        let mut vert_map: HashMap<ElemId, VertKey> = HashMap::new();
        for rec in &self.vertices {
            claim(ElemKind::Vertex, rec.id)?;
            if !mesh.vert_layout.matches(&rec.custom) {
                return Err(SnapshotError::LayerMismatch(format!(
                    "vertex {} carries {} records for {} layers",
                    rec.id,
                    rec.custom.len(),
                    self.vertex_layers.len()
                ))
                .into());
            }
            let mut vert = Vertex::new(rec.id, rec.position, rec.custom.clone());
            vert.flags = ElemFlags::from_bits(rec.flags & ElemFlags::PERSIST_MASK);
            vert_map.insert(rec.id, mesh.verts.insert(vert));
        }

        let resolve_vert = |map: &HashMap<ElemId, VertKey>, id: ElemId| -> Result<VertKey> {
            map.get(&id).copied().ok_or_else(|| {
                SnapshotError::UnresolvedRef {
                    kind: ElemKind::Vertex,
                    id,
                }
                .into()
            })
        };

        let mut edge_map: HashMap<ElemId, EdgeKey> = HashMap::new();
        for rec in &self.edges {
            claim(ElemKind::Edge, rec.id)?;
            if !mesh.edge_layout.matches(&rec.custom) {
                return Err(SnapshotError::LayerMismatch(format!(
                    "edge {} carries {} records for {} layers",
                    rec.id,
                    rec.custom.len(),
                    self.edge_layers.len()
                ))
                .into());
            }
            let v1 = resolve_vert(&vert_map, rec.v1)?;
            let v2 = resolve_vert(&vert_map, rec.v2)?;
            if v1 == v2 {
                return Err(SnapshotError::Malformed(format!(
                    "edge {} joins a vertex to itself",
                    rec.id
                ))
                .into());
            }
            let mut edge = Edge::new(rec.id, v1, v2, rec.custom.clone());
            edge.flags = ElemFlags::from_bits(rec.flags & ElemFlags::PERSIST_MASK);
            edge.handles = rec.handles.clone();
            let key = mesh.edges.insert(edge);
            disk_attach(&mut mesh, key, v1)?;
            disk_attach(&mut mesh, key, v2)?;
            edge_map.insert(rec.id, key);
        }

        for rec in &self.faces {
            claim(ElemKind::Face, rec.id)?;
            if !mesh.face_layout.matches(&rec.custom) {
                return Err(SnapshotError::LayerMismatch(format!(
                    "face {} carries {} records for {} layers",
                    rec.id,
                    rec.custom.len(),
                    self.face_layers.len()
                ))
                .into());
            }
            let mut face = Face::new(rec.id, rec.custom.clone());
            face.flags = ElemFlags::from_bits(rec.flags & ElemFlags::PERSIST_MASK);
            let f = mesh.faces.insert(face);

            for corners in &rec.boundaries {
                if corners.len() < 2 {
                    return Err(SnapshotError::Malformed(format!(
                        "a boundary of face {} has fewer than two corners",
                        rec.id
                    ))
                    .into());
                }
                let mut keys: Vec<LoopKey> = Vec::with_capacity(corners.len());
                for (i, corner) in corners.iter().enumerate() {
                    claim(ElemKind::Loop, corner.id)?;
                    if !mesh.loop_layout.matches(&corner.custom) {
                        return Err(SnapshotError::LayerMismatch(format!(
                            "loop {} carries {} records for {} layers",
                            corner.id,
                            corner.custom.len(),
                            self.loop_layers.len()
                        ))
                        .into());
                    }
                    let vert = resolve_vert(&vert_map, corner.vert)?;
                    let next_vert = resolve_vert(&vert_map, corners[(i + 1) % corners.len()].vert)?;
                    let edge = edge_map.get(&corner.edge).copied().ok_or(
                        SnapshotError::UnresolvedRef {
                            kind: ElemKind::Edge,
                            id: corner.edge,
                        },
                    )?;
                    {
                        let e = mesh.edge(edge)?;
                        if !(e.uses(vert) && e.uses(next_vert)) {
                            return Err(SnapshotError::Malformed(format!(
                                "corner edge {} does not span its corner vertices",
                                corner.edge
                            ))
                            .into());
                        }
                    }
                    let mut lp = Loop::new(corner.id, vert, edge, f, corner.custom.clone());
                    lp.flags = ElemFlags::from_bits(corner.flags & ElemFlags::PERSIST_MASK);
                    keys.push(mesh.loops.insert(lp));
                }
                for i in 0..keys.len() {
                    boundary_link(&mut mesh, keys[i], keys[(i + 1) % keys.len()])?;
                }
                for (&l, corner) in keys.iter().zip(corners) {
                    let edge = edge_map[&corner.edge];
                    radial_attach(&mut mesh, l, edge)?;
                }
                mesh.faces.get_mut(f)?.boundaries.push(Boundary {
                    first: keys[0],
                    len: keys.len(),
                });
            }
        }

        mesh.ids = IdGen::restore(self.id_counter, self.id_free.clone());

        let face_keys: Vec<_> = mesh.faces.iter().map(|(k, _)| k).collect();
        for f in face_keys {
            mesh.recalc_face_geometry(f)?;
        }
        let edge_keys: Vec<_> = mesh.edges.iter().map(|(k, _)| k).collect();
        for e in edge_keys {
            mesh.recalc_edge_length(e)?;
        }
        mesh.recalc_vertex_normals()?;
        Ok(mesh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::customdata::{LayerKind, Value};
    use crate::error::PolykernError;
    use crate::operations::query::ValidateMesh;
    use crate::operations::{MakeEdge, MakeFace, MakeVertex};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn sample_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_layer(
            ElemKind::Vertex,
            LayerDescriptor::new("weight", LayerKind::Float),
        );
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
            p(4.0, 0.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        mesh.vertex_mut(v[0]).unwrap().custom.set(0, Value::Float(2.5));
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeFace::new(vec![v[0], v[2], v[3]]).execute(&mut mesh).unwrap();
        MakeEdge::new(v[1], v[4]).execute(&mut mesh).unwrap();
        mesh
    }

    fn all_ids(mesh: &Mesh) -> HashSet<ElemId> {
        let mut ids = HashSet::new();
        ids.extend(mesh.vertex_store().iter().map(|(_, v)| v.id));
        ids.extend(mesh.edge_store().iter().map(|(_, e)| e.id));
        ids.extend(mesh.loop_store().iter().map(|(_, l)| l.id));
        ids.extend(mesh.face_store().iter().map(|(_, f)| f.id));
        ids
    }

    #[test]
    fn round_trip_preserves_topology_and_ids() {
        let mesh = sample_mesh();
        let snapshot = MeshSnapshot::capture(&mesh).unwrap();
        let restored = snapshot.restore().unwrap();

        assert_eq!(restored.vertex_count(), mesh.vertex_count());
        assert_eq!(restored.edge_count(), mesh.edge_count());
        assert_eq!(restored.loop_count(), mesh.loop_count());
        assert_eq!(restored.face_count(), mesh.face_count());
        assert_eq!(all_ids(&restored), all_ids(&mesh));
        assert_eq!(restored.ids().counter(), mesh.ids().counter());
        assert!(ValidateMesh::check(&restored).unwrap().is_clean());

        // Custom data survives with its layout
        let (_, weighted) = restored
            .vertex_store()
            .iter()
            .find(|(_, v)| v.custom.value(0) == Some(&Value::Float(2.5)))
            .unwrap();
        assert_relative_eq!(weighted.position.x, 0.0);
    }

    #[test]
    fn json_round_trip() {
        let mesh = sample_mesh();
        let snapshot = MeshSnapshot::capture(&mesh).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: MeshSnapshot = serde_json::from_str(&json).unwrap();
        let restored = parsed.restore().unwrap();
        assert_eq!(restored.face_count(), 2);
        assert!(ValidateMesh::check(&restored).unwrap().is_clean());
    }

    #[test]
    fn curved_edges_keep_their_handles() {
        let mut mesh = Mesh::with_features(
            MeshFeatures::default().union(MeshFeatures::CURVE_HANDLES),
        );
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b)
            .with_handles(p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0))
            .execute(&mut mesh)
            .unwrap();
        let length = mesh.edge(e).unwrap().length;

        let restored = MeshSnapshot::capture(&mesh).unwrap().restore().unwrap();
        let (_, edge) = restored.edge_store().iter().next().unwrap();
        assert!(edge.handles.is_some());
        assert_relative_eq!(edge.length, length, epsilon = 1e-12);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut snapshot = MeshSnapshot::capture(&sample_mesh()).unwrap();
        snapshot.vertices[1].id = snapshot.vertices[0].id;
        assert!(matches!(
            snapshot.restore(),
            Err(PolykernError::Snapshot(SnapshotError::DuplicateId { .. }))
        ));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let mut snapshot = MeshSnapshot::capture(&sample_mesh()).unwrap();
        snapshot.edges[0].v1 = ElemId(9999);
        assert!(matches!(
            snapshot.restore(),
            Err(PolykernError::Snapshot(SnapshotError::UnresolvedRef { .. }))
        ));
    }

    #[test]
    fn live_ids_on_the_free_list_are_rejected() {
        let mut snapshot = MeshSnapshot::capture(&sample_mesh()).unwrap();
        snapshot.id_free.push(snapshot.vertices[0].id);
        assert!(matches!(
            snapshot.restore(),
            Err(PolykernError::Snapshot(SnapshotError::Malformed(_)))
        ));
    }

    #[test]
    fn blocks_must_match_their_layout() {
        let mut snapshot = MeshSnapshot::capture(&sample_mesh()).unwrap();
        snapshot
            .vertex_layers
            .push(LayerDescriptor::new("extra", LayerKind::Int));
        assert!(matches!(
            snapshot.restore(),
            Err(PolykernError::Snapshot(SnapshotError::LayerMismatch(_)))
        ));
    }
}
