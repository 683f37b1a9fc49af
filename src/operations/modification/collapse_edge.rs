use crate::error::{Result, TopologyError};
use crate::math::midpoint;
use crate::operations::removal::KillFace;
use crate::topology::cycles::{
    boundary_link, disk_attach, disk_detach, radial_attach, radial_detach,
};
use crate::topology::{
    walk_boundary, walk_radial, EdgeKey, ElemId, ElemKind, FaceKey, LoopKey, Mesh, VertKey,
};

/// The endpoint of an edge a collapse keeps alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    /// Keep `v1`.
    V1,
    /// Keep `v2`.
    V2,
}

/// Collapses an edge, merging its endpoints into one vertex.
///
/// Faces that degenerate below three corners are removed, duplicate
/// parallel edges left by the merge are fused, and faces that end up
/// covering the same vertex set are fused too, so the result stays a
/// consistent mesh. With snapping on (the default), the survivor moves
/// to the edge midpoint and vertex custom data blends evenly.
pub struct CollapseEdge {
    edge: EdgeKey,
    keep: EdgeEnd,
    snap: bool,
}

impl CollapseEdge {
    /// Creates a new `CollapseEdge` operation keeping `v1`.
    #[must_use]
    pub fn new(edge: EdgeKey) -> Self {
        Self {
            edge,
            keep: EdgeEnd::V1,
            snap: true,
        }
    }

    /// Chooses which endpoint survives.
    #[must_use]
    pub fn keep_end(mut self, keep: EdgeEnd) -> Self {
        self.keep = keep;
        self
    }

    /// Enables or disables midpoint snapping and data blending.
    #[must_use]
    pub fn snap(mut self, snap: bool) -> Self {
        self.snap = snap;
        self
    }

    /// Executes the operation, returning the surviving vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is dead or a cycle is corrupted.
    #[allow(clippy::too_many_lines)]
    pub fn execute(&self, mesh: &mut Mesh) -> Result<VertKey> {
        let e = self.edge;
        let (v1, v2) = {
            let edge = mesh.edge(e)?;
            (edge.v1, edge.v2)
        };
        let (keep, dead) = match self.keep {
            EdgeEnd::V1 => (v1, v2),
            EdgeEnd::V2 => (v2, v1),
        };

        if self.snap {
            let p1 = mesh.vertex(v1)?.position;
            let p2 = mesh.vertex(v2)?.position;
            let layout = mesh.layout(ElemKind::Vertex).clone();
            let a = mesh.vertex(keep)?.custom.clone();
            let b = mesh.vertex(dead)?.custom.clone();
            let mut blended = layout.default_block();
            layout.interpolate(&mut blended, &[&a, &b], &[0.5, 0.5]);
            let survivor = mesh.vertex_mut(keep)?;
            survivor.position = midpoint(&p1, &p2);
            survivor.custom = blended;
        }

        // Cut the collapsing edge's corners out of their boundaries,
        // then drop the edge itself
        let mut touched: Vec<FaceKey> = Vec::new();
        for l in walk_radial(mesh, e)? {
            let face = mesh.face_loop(l)?.face;
            excise_corner(mesh, l, self.snap)?;
            if !touched.contains(&face) {
                touched.push(face);
            }
        }
        disk_detach(mesh, e, v1)?;
        disk_detach(mesh, e, v2)?;
        mesh.free_edge(e);

        // Move the dead vertex's remaining edges over to the survivor
        let disk: Vec<EdgeKey> = mesh.vertex(dead)?.edges.clone();
        for de in disk {
            let other = mesh.edge(de)?.other_end(dead).ok_or_else(|| {
                TopologyError::StructuralCorruption(
                    "disk entry does not use its vertex".into(),
                )
            })?;
            if other == keep {
                // A second edge between the endpoints collapses to nothing
                for l in walk_radial(mesh, de)? {
                    let face = mesh.face_loop(l)?.face;
                    excise_corner(mesh, l, false)?;
                    if !touched.contains(&face) {
                        touched.push(face);
                    }
                }
                disk_detach(mesh, de, dead)?;
                disk_detach(mesh, de, keep)?;
                mesh.free_edge(de);
            } else {
                disk_detach(mesh, de, dead)?;
                mesh.edge_mut(de)?.replace_end(dead, keep);
                disk_attach(mesh, de, keep)?;
                mesh.recalc_edge_length(de)?;
            }
        }

        // Corners still naming the dead vertex move to the survivor
        let relink: Vec<LoopKey> = mesh
            .loops
            .iter()
            .filter(|(_, lp)| lp.vert == dead)
            .map(|(k, _)| k)
            .collect();
        for l in relink {
            mesh.loops.get_mut(l)?.vert = keep;
        }

        // Faces squeezed below three corners disappear
        let mut affected = mesh.faces_around_vertex(keep)?;
        for f in touched {
            if mesh.face(f).is_ok() && !affected.contains(&f) {
                affected.push(f);
            }
        }
        for f in affected {
            if mesh.face(f).is_err() {
                continue;
            }
            let degenerate = mesh
                .face(f)?
                .boundaries
                .iter()
                .any(|b| b.len < 3);
            if degenerate {
                KillFace::new(f).execute(mesh)?;
            }
        }

        merge_parallel_edges(mesh, keep)?;
        merge_duplicate_faces(mesh, keep)?;

        mesh.free_vertex(dead);
        for f in mesh.faces_around_vertex(keep)? {
            mesh.recalc_face_geometry(f)?;
        }
        mesh.recalc_vertex_normal(keep)?;
        Ok(keep)
    }
}

/// Removes corner `l` from its boundary, keeping the cycle closed and
/// the cached length current. With `blend` on, the corner's custom data
/// folds evenly into its successor.
fn excise_corner(mesh: &mut Mesh, l: LoopKey, blend: bool) -> Result<()> {
    let (face, prev, next) = {
        let lp = mesh.face_loop(l)?;
        (lp.face, lp.prev, lp.next)
    };
    let bi = mesh.boundary_index_of(face, l)?;
    if blend && next != l {
        let layout = mesh.layout(ElemKind::Loop).clone();
        let a = mesh.face_loop(l)?.custom.clone();
        let b = mesh.face_loop(next)?.custom.clone();
        let mut blended = layout.default_block();
        layout.interpolate(&mut blended, &[&a, &b], &[0.5, 0.5]);
        mesh.face_loop_mut(next)?.custom = blended;
    }
    boundary_link(mesh, prev, next)?;
    {
        let boundary = &mut mesh.face_mut(face)?.boundaries[bi];
        boundary.len = boundary.len.saturating_sub(1);
        if boundary.first == l {
            boundary.first = next;
        }
    }
    radial_detach(mesh, l)?;
    mesh.free_loop(l);
    Ok(())
}

/// Fuses edges in `v`'s disk that share both endpoints, moving radial
/// loops onto the first of each group.
fn merge_parallel_edges(mesh: &mut Mesh, v: VertKey) -> Result<()> {
    let disk = mesh.vertex(v)?.edges.clone();
    let mut seen: Vec<(VertKey, EdgeKey)> = Vec::new();
    for de in disk {
        let Ok(edge) = mesh.edge(de) else { continue };
        let Some(other) = edge.other_end(v) else {
            continue;
        };
        if let Some(&(_, primary)) = seen.iter().find(|(end, _)| *end == other) {
            for l in walk_radial(mesh, de)? {
                radial_detach(mesh, l)?;
                radial_attach(mesh, l, primary)?;
            }
            disk_detach(mesh, de, v)?;
            disk_detach(mesh, de, other)?;
            mesh.free_edge(de);
        } else {
            seen.push((other, de));
        }
    }
    Ok(())
}

/// Fuses faces around `v` that cover the same vertex set, keeping the
/// first of each group.
fn merge_duplicate_faces(mesh: &mut Mesh, v: VertKey) -> Result<()> {
    let candidates = mesh.faces_around_vertex(v)?;
    let mut signatures: Vec<(Vec<ElemId>, FaceKey)> = Vec::new();
    for f in candidates {
        if mesh.face(f).is_err() {
            continue;
        }
        let mut signature = Vec::new();
        for boundary in mesh.face(f)?.boundaries.clone() {
            for l in walk_boundary(mesh, boundary.first)? {
                let vert = mesh.face_loop(l)?.vert;
                signature.push(mesh.vertex(vert)?.id);
            }
        }
        signature.sort_unstable();
        if signatures.iter().any(|(s, _)| *s == signature) {
            KillFace::new(f).execute(mesh)?;
        } else {
            signatures.push((signature, f));
        }
    }
    Ok(())
}
