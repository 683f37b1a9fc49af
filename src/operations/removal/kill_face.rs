use crate::error::Result;
use crate::topology::cycles::radial_detach;
use crate::topology::{walk_boundary, FaceKey, Mesh};

/// Destroys a face and its loops.
///
/// Boundary edges and vertices survive; edges left without another
/// adjacent face become wire edges.
pub struct KillFace {
    face: FaceKey,
}

impl KillFace {
    /// Creates a new `KillFace` operation.
    #[must_use]
    pub fn new(face: FaceKey) -> Self {
        Self { face }
    }

    /// Executes the operation. Killing an already-dead face is reported
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        let Ok(face) = mesh.face(self.face) else {
            log::warn!("ignoring kill of a dead face");
            return Ok(());
        };
        let boundaries = face.boundaries.clone();
        for boundary in boundaries {
            // Operators that empty a boundary leave its entry dangling
            if !mesh.loop_store().contains(boundary.first) {
                continue;
            }
            for l in walk_boundary(mesh, boundary.first)? {
                radial_detach(mesh, l)?;
                mesh.free_loop(l);
            }
        }
        mesh.free_face(self.face);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::{MakeFace, MakeVertex};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn killing_a_face_leaves_wire_edges() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]
            .iter()
            .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
            .collect();
        let f = MakeFace::new(v).execute(&mut mesh).unwrap();

        KillFace::new(f).execute(&mut mesh).unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.loop_count(), 0);
        assert_eq!(mesh.edge_count(), 3);
        assert!(mesh.edge_store().iter().all(|(_, e)| e.is_wire()));
    }

    #[test]
    fn shared_edge_keeps_the_other_face() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        let f1 = MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        let f2 = MakeFace::new(vec![v[0], v[2], v[3]]).execute(&mut mesh).unwrap();

        KillFace::new(f1).execute(&mut mesh).unwrap();
        assert!(mesh.face(f2).is_ok());
        let diagonal = mesh.find_edge(v[0], v[2]).unwrap();
        assert_eq!(
            crate::topology::walk_radial(&mesh, diagonal).unwrap().len(),
            1
        );
    }

    #[test]
    fn dead_face_is_ignored() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]
            .iter()
            .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
            .collect();
        let f = MakeFace::new(v).execute(&mut mesh).unwrap();
        KillFace::new(f).execute(&mut mesh).unwrap();
        KillFace::new(f).execute(&mut mesh).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }
}
