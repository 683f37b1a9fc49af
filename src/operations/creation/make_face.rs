use crate::error::{OperationError, Result};
use crate::topology::cycles::{boundary_link, disk_attach, radial_attach};
use crate::topology::{Boundary, FaceKey, Mesh, VertKey};

/// Creates a face over a cycle of vertices, with optional holes.
///
/// Boundary edges are reused where they already exist and created
/// otherwise; the vertex order fixes the face's winding. Hole
/// boundaries wind independently of the outer boundary.
pub struct MakeFace {
    verts: Vec<VertKey>,
    holes: Vec<Vec<VertKey>>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation over the outer boundary.
    #[must_use]
    pub fn new(verts: Vec<VertKey>) -> Self {
        Self {
            verts,
            holes: Vec::new(),
        }
    }

    /// Adds a hole boundary.
    #[must_use]
    pub fn with_hole(mut self, hole: Vec<VertKey>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Executes the operation, returning the new face.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::DegenerateInput`] if the outer boundary
    /// has fewer than two vertices or a hole fewer than three,
    /// [`OperationError::DuplicateVertex`] if any boundary repeats a
    /// vertex, or an error if a vertex is dead. All checks run before
    /// any mutation.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<FaceKey> {
        if self.verts.len() < 2 {
            return Err(OperationError::DegenerateInput(
                "face boundary needs at least two vertices".into(),
            )
            .into());
        }
        for hole in &self.holes {
            if hole.len() < 3 {
                return Err(OperationError::DegenerateInput(
                    "hole boundary needs at least three vertices".into(),
                )
                .into());
            }
        }
        for boundary in std::iter::once(&self.verts).chain(self.holes.iter()) {
            for (i, &v) in boundary.iter().enumerate() {
                let id = mesh.vertex(v)?.id;
                if boundary[..i].contains(&v) {
                    return Err(OperationError::DuplicateVertex(id).into());
                }
            }
        }

        let f = mesh.alloc_face();
        let outer = build_boundary(mesh, f, &self.verts)?;
        mesh.face_mut(f)?.boundaries.push(outer);
        for hole in &self.holes {
            let inner = build_boundary(mesh, f, hole)?;
            mesh.face_mut(f)?.boundaries.push(inner);
        }
        mesh.recalc_face_geometry(f)?;
        Ok(f)
    }
}

/// Builds one loop cycle of `f` over `verts`, reusing or creating the
/// connecting edges.
fn build_boundary(mesh: &mut Mesh, f: FaceKey, verts: &[VertKey]) -> Result<Boundary> {
    let n = verts.len();
    let mut corners = Vec::with_capacity(n);
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let e = match mesh.find_edge(a, b) {
            Some(e) => e,
            None => {
                let e = mesh.alloc_edge(a, b)?;
                disk_attach(mesh, e, a)?;
                disk_attach(mesh, e, b)?;
                e
            }
        };
        let l = mesh.alloc_loop(a, e, f);
        corners.push((l, e));
    }
    for i in 0..n {
        boundary_link(mesh, corners[i].0, corners[(i + 1) % n].0)?;
    }
    for &(l, e) in &corners {
        radial_attach(mesh, l, e)?;
    }
    Ok(Boundary {
        first: corners[0].0,
        len: n,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::{MakeEdge, MakeVertex};
    use crate::topology::walk_boundary;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn verts(mesh: &mut Mesh, points: &[Point3]) -> Vec<VertKey> {
        points
            .iter()
            .map(|pt| MakeVertex::new(*pt).execute(mesh).unwrap())
            .collect()
    }

    #[test]
    fn triangle_creates_edges_and_loops() {
        let mut mesh = Mesh::new();
        let v = verts(
            &mut mesh,
            &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        );
        let f = MakeFace::new(v.clone()).execute(&mut mesh).unwrap();

        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.loop_count(), 3);
        assert_eq!(mesh.face_count(), 1);

        let face = mesh.face(f).unwrap();
        assert_eq!(face.hole_count(), 0);
        assert!((face.area - 0.5).abs() < 1e-12);
        assert!((face.normal - crate::math::Vector3::z()).norm() < 1e-12);

        let cycle = walk_boundary(&mesh, face.outer().unwrap().first).unwrap();
        assert_eq!(cycle.len(), 3);
        let cycle_verts: Vec<VertKey> = cycle
            .iter()
            .map(|&l| mesh.face_loop(l).unwrap().vert)
            .collect();
        assert_eq!(cycle_verts, v);
    }

    #[test]
    fn shared_edges_are_reused_between_faces() {
        let mut mesh = Mesh::new();
        let v = verts(
            &mut mesh,
            &[
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
            ],
        );
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeFace::new(vec![v[0], v[2], v[3]]).execute(&mut mesh).unwrap();
        // The diagonal v0-v2 is shared, not duplicated
        assert_eq!(mesh.edge_count(), 5);
        let diagonal = mesh.find_edge(v[0], v[2]).unwrap();
        assert_eq!(
            crate::topology::walk_radial(&mesh, diagonal).unwrap().len(),
            2
        );
    }

    #[test]
    fn wire_edges_are_adopted_by_the_face() {
        let mut mesh = Mesh::new();
        let v = verts(
            &mut mesh,
            &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        );
        let e = MakeEdge::new(v[0], v[1]).execute(&mut mesh).unwrap();
        MakeFace::new(v).execute(&mut mesh).unwrap();
        assert_eq!(mesh.edge_count(), 3);
        assert!(!mesh.edge(e).unwrap().is_wire());
    }

    #[test]
    fn face_with_a_hole() {
        let mut mesh = Mesh::new();
        let outer = verts(
            &mut mesh,
            &[
                p(0.0, 0.0, 0.0),
                p(4.0, 0.0, 0.0),
                p(4.0, 4.0, 0.0),
                p(0.0, 4.0, 0.0),
            ],
        );
        let inner = verts(
            &mut mesh,
            &[p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0), p(2.0, 1.0, 0.0)],
        );
        let f = MakeFace::new(outer)
            .with_hole(inner)
            .execute(&mut mesh)
            .unwrap();
        let face = mesh.face(f).unwrap();
        assert_eq!(face.hole_count(), 1);
        assert_eq!(mesh.loop_count(), 7);
        assert_eq!(mesh.edge_count(), 7);
    }

    #[test]
    fn duplicate_vertex_is_rejected_before_mutation() {
        let mut mesh = Mesh::new();
        let v = verts(
            &mut mesh,
            &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        );
        let res = MakeFace::new(vec![v[0], v[1], v[0], v[2]]).execute(&mut mesh);
        assert!(res.is_err());
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.loop_count(), 0);
    }

    #[test]
    fn too_small_boundaries_are_rejected() {
        let mut mesh = Mesh::new();
        let v = verts(&mut mesh, &[p(0.0, 0.0, 0.0)]);
        assert!(MakeFace::new(vec![v[0]]).execute(&mut mesh).is_err());
    }
}
