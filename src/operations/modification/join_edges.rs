use crate::error::{Result, TopologyError};
use crate::operations::removal::KillFace;
use crate::operations::Outcome;
use crate::topology::cycles::{
    boundary_link, disk_attach, disk_detach, radial_attach, radial_detach,
};
use crate::topology::{walk_boundary, walk_radial, EdgeKey, ElemKind, FaceKey, Mesh, VertKey};

/// Removes a valence-two vertex, fusing its two edges into one.
///
/// Every face passing through the vertex loses that corner; triangles
/// spanning both edges and their chord would degenerate and are removed
/// first. The first disk edge survives, re-spanned over the far
/// endpoints; its custom data blends evenly with the dropped edge's.
pub struct JoinEdges {
    vert: VertKey,
}

impl JoinEdges {
    /// Creates a new `JoinEdges` operation.
    #[must_use]
    pub fn new(vert: VertKey) -> Self {
        Self { vert }
    }

    /// Executes the operation, returning the surviving edge.
    ///
    /// Declines (leaving the mesh untouched) if the vertex is dead, not
    /// valence two, if the far endpoints coincide, or if a face visits
    /// the vertex more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<Outcome<EdgeKey>> {
        let Ok(vert) = mesh.vertex(self.vert) else {
            log::warn!("declining join at a dead vertex");
            return Ok(Outcome::NoOp);
        };
        if vert.valence() != 2 {
            log::warn!("declining join at a vertex of valence {}", vert.valence());
            return Ok(Outcome::NoOp);
        }
        let (e1, e2) = (vert.edges[0], vert.edges[1]);
        let a = mesh.edge(e1)?.other_end(self.vert).ok_or_else(|| {
            TopologyError::StructuralCorruption("disk entry does not use its vertex".into())
        })?;
        let b = mesh.edge(e2)?.other_end(self.vert).ok_or_else(|| {
            TopologyError::StructuralCorruption("disk entry does not use its vertex".into())
        })?;
        if a == b {
            log::warn!("declining join whose far endpoints coincide");
            return Ok(Outcome::NoOp);
        }

        // Every face here must pass straight through the vertex
        let mut faces: Vec<FaceKey> = Vec::new();
        for e in [e1, e2] {
            for l in walk_radial(mesh, e)? {
                let f = mesh.face_loop(l)?.face;
                if !faces.contains(&f) {
                    faces.push(f);
                }
            }
        }
        for &f in &faces {
            let mut visits = 0;
            for boundary in mesh.face(f)?.boundaries.clone() {
                for l in walk_boundary(mesh, boundary.first)? {
                    if mesh.face_loop(l)?.vert == self.vert {
                        visits += 1;
                    }
                }
            }
            if visits != 1 {
                log::warn!("declining join; a face visits the vertex {visits} times");
                return Ok(Outcome::NoOp);
            }
        }

        // Triangles over the chord a-b would degenerate; drop them first
        for &f in &faces {
            let spans_both = mesh.face(f)?.boundaries.len() == 1
                && mesh.face(f)?.outer().is_some_and(|o| o.len == 3);
            if spans_both {
                KillFace::new(f).execute(mesh)?;
            }
        }

        // Cut the vertex's corner out of each surviving face
        let survivors: Vec<FaceKey> = faces
            .into_iter()
            .filter(|&f| mesh.face(f).is_ok())
            .collect();
        for &f in &survivors {
            let Some(lv) = mesh.loop_of_vertex_in_face(f, self.vert)? else {
                continue;
            };
            let (prev, next) = {
                let lp = mesh.face_loop(lv)?;
                (lp.prev, lp.next)
            };
            let bi = mesh.boundary_index_of(f, lv)?;
            boundary_link(mesh, prev, next)?;
            {
                let boundary = &mut mesh.face_mut(f)?.boundaries[bi];
                boundary.len = boundary.len.saturating_sub(1);
                if boundary.first == lv {
                    boundary.first = next;
                }
            }
            radial_detach(mesh, lv)?;
            mesh.free_loop(lv);
        }

        // Blend the dropped edge's data into the survivor, then re-span
        {
            let layout = mesh.layout(ElemKind::Edge).clone();
            let c1 = mesh.edge(e1)?.custom.clone();
            let c2 = mesh.edge(e2)?.custom.clone();
            let mut blended = layout.default_block();
            layout.interpolate(&mut blended, &[&c1, &c2], &[0.5, 0.5]);
            mesh.edge_mut(e1)?.custom = blended;
        }
        disk_detach(mesh, e1, self.vert)?;
        mesh.edge_mut(e1)?.replace_end(self.vert, b);
        disk_attach(mesh, e1, b)?;
        // Two fused curves have no exact single-cubic form
        mesh.edge_mut(e1)?.handles = None;

        // Corners left on the dropped edge move to the fused one
        for l in walk_radial(mesh, e2)? {
            radial_detach(mesh, l)?;
            radial_attach(mesh, l, e1)?;
        }
        disk_detach(mesh, e2, self.vert)?;
        disk_detach(mesh, e2, b)?;
        mesh.free_edge(e2);
        mesh.free_vertex(self.vert);
        mesh.recalc_edge_length(e1)?;
        for f in survivors {
            if mesh.face(f).is_ok() {
                mesh.recalc_face_geometry(f)?;
            }
        }
        Ok(Outcome::Done(e1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::query::ValidateMesh;
    use crate::operations::{MakeEdge, MakeFace, MakeVertex};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn joining_a_wire_chain() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let v = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        MakeEdge::new(a, v).execute(&mut mesh).unwrap();
        MakeEdge::new(v, b).execute(&mut mesh).unwrap();

        let joined = JoinEdges::new(v).execute(&mut mesh).unwrap().done().unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.edge_count(), 1);
        let edge = mesh.edge(joined).unwrap();
        assert!(edge.uses(a) && edge.uses(b));
        assert!((edge.length - 3.0).abs() < 1e-12);
    }

    #[test]
    fn faces_lose_the_pass_through_corner() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        let f = MakeFace::new(v.clone()).execute(&mut mesh).unwrap();

        // v1 sits flat between v0 and v2 on the pentagon rim
        let outcome = JoinEdges::new(v[1]).execute(&mut mesh).unwrap();
        assert!(!outcome.is_noop());
        assert_eq!(mesh.face(f).unwrap().outer().unwrap().len, 4);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }

    #[test]
    fn wrong_valence_declines() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        MakeEdge::new(a, b).execute(&mut mesh).unwrap();
        assert!(JoinEdges::new(a).execute(&mut mesh).unwrap().is_noop());
        assert_eq!(mesh.edge_count(), 1);
    }

    #[test]
    fn chord_triangles_are_removed() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let v = MakeVertex::new(p(1.0, 1.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(2.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        MakeFace::new(vec![a, v, b]).execute(&mut mesh).unwrap();

        let joined = JoinEdges::new(v).execute(&mut mesh).unwrap().done().unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.vertex_count(), 2);
        // The chord and the fused edge remain as wire
        assert_eq!(mesh.edge_count(), 2);
        assert!(mesh.edge(joined).unwrap().is_wire());
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }
}
