use crate::error::Result;
use crate::topology::cycles::{radial_attach, radial_detach};
use crate::topology::{walk_boundary, EdgeKey, FaceKey, Mesh};

/// Reverses a face's winding, flipping its normal.
///
/// Every boundary cycle (outer and holes) is reversed; each corner ends
/// up running along the edge to its old predecessor.
pub struct ReverseFace {
    face: FaceKey,
}

impl ReverseFace {
    /// Creates a new `ReverseFace` operation.
    #[must_use]
    pub fn new(face: FaceKey) -> Self {
        Self { face }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is dead or a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        let boundaries = mesh.face(self.face)?.boundaries.clone();
        for boundary in boundaries {
            let cycle = walk_boundary(mesh, boundary.first)?;
            let n = cycle.len();
            let mut edges: Vec<EdgeKey> = Vec::with_capacity(n);
            for &l in &cycle {
                edges.push(mesh.face_loop(l)?.edge);
            }
            for &l in &cycle {
                radial_detach(mesh, l)?;
            }
            for i in 0..n {
                {
                    let lp = mesh.face_loop_mut(cycle[i])?;
                    lp.next = cycle[(i + n - 1) % n];
                    lp.prev = cycle[(i + 1) % n];
                }
                radial_attach(mesh, cycle[i], edges[(i + n - 1) % n])?;
            }
        }
        mesh.recalc_face_geometry(self.face)?;
        Ok(())
    }
}
