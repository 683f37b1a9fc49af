use crate::error::Result;
use crate::operations::removal::KillEdge;
use crate::topology::{EdgeKey, Mesh, VertKey};

/// Removes every wire edge, optionally sweeping up the vertices that
/// become isolated.
pub struct PruneWire {
    including_verts: bool,
}

impl PruneWire {
    /// Creates a new `PruneWire` operation; isolated vertices are kept.
    #[must_use]
    pub fn new() -> Self {
        Self {
            including_verts: false,
        }
    }

    /// Also removes vertices left without any incident edge.
    #[must_use]
    pub fn and_isolated_vertices(mut self, remove: bool) -> Self {
        self.including_verts = remove;
        self
    }

    /// Executes the operation, returning the number of removed edges
    /// and vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<(usize, usize)> {
        let wires: Vec<EdgeKey> = mesh
            .edge_store()
            .iter()
            .filter(|(_, e)| e.is_wire())
            .map(|(k, _)| k)
            .collect();
        for &e in &wires {
            KillEdge::new(e).execute(mesh)?;
        }
        let mut removed_verts = 0;
        if self.including_verts {
            let isolated: Vec<VertKey> = mesh
                .vertex_store()
                .iter()
                .filter(|(_, v)| v.is_isolated())
                .map(|(k, _)| k)
                .collect();
            for v in isolated {
                mesh.free_vertex(v);
                removed_verts += 1;
            }
        }
        Ok((wires.len(), removed_verts))
    }
}

impl Default for PruneWire {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::{MakeEdge, MakeFace, MakeVertex};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn face_edges_survive_the_prune() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(5.0, 5.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeEdge::new(v[2], v[3]).execute(&mut mesh).unwrap();

        let (edges, verts) = PruneWire::new().execute(&mut mesh).unwrap();
        assert_eq!(edges, 1);
        assert_eq!(verts, 0);
        assert_eq!(mesh.edge_count(), 3);
        // The dangling endpoint stays until asked for
        assert_eq!(mesh.vertex_count(), 4);

        let (edges, verts) = PruneWire::new()
            .and_isolated_vertices(true)
            .execute(&mut mesh)
            .unwrap();
        assert_eq!(edges, 0);
        assert_eq!(verts, 1);
        assert_eq!(mesh.vertex_count(), 3);
    }
}
