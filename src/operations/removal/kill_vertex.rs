use crate::error::{Result, TopologyError};
use crate::operations::removal::KillEdge;
use crate::topology::{Mesh, VertKey, MAX_CYCLE_LEN};

/// Destroys a vertex, cascading to its disk of edges and their faces.
pub struct KillVertex {
    vert: VertKey,
}

impl KillVertex {
    /// Creates a new `KillVertex` operation.
    #[must_use]
    pub fn new(vert: VertKey) -> Self {
        Self { vert }
    }

    /// Executes the operation. Killing an already-dead vertex is
    /// reported and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        if mesh.vertex(self.vert).is_err() {
            log::warn!("ignoring kill of a dead vertex");
            return Ok(());
        }
        let mut guard = 0;
        while let Some(&e) = mesh.vertex(self.vert)?.edges.first() {
            KillEdge::new(e).execute(mesh)?;
            guard += 1;
            if guard > MAX_CYCLE_LEN {
                return Err(TopologyError::StructuralCorruption(
                    "disk cycle does not shrink while killing its edges".into(),
                )
                .into());
            }
        }
        mesh.free_vertex(self.vert);
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
    fn killing_a_corner_takes_the_face_with_it() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]
            .iter()
            .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
            .collect();
        MakeFace::new(v.clone()).execute(&mut mesh).unwrap();

        KillVertex::new(v[0]).execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.face_count(), 0);
        // Only the opposite edge, not touching v0, survives
        assert_eq!(mesh.edge_count(), 1);
        assert!(mesh.find_edge(v[1], v[2]).is_some());
    }

    #[test]
    fn killing_an_isolated_vertex() {
        let mut mesh = Mesh::new();
        let v = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        KillVertex::new(v).execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        // A second kill is a no-op
        KillVertex::new(v).execute(&mut mesh).unwrap();
    }
}
