use crate::error::{Result, TopologyError};
use crate::operations::removal::KillFace;
use crate::topology::cycles::disk_detach;
use crate::topology::{EdgeKey, Mesh, MAX_CYCLE_LEN};

/// Destroys an edge, cascading to every face that uses it.
///
/// Endpoint vertices survive, possibly isolated.
pub struct KillEdge {
    edge: EdgeKey,
}

impl KillEdge {
    /// Creates a new `KillEdge` operation.
    #[must_use]
    pub fn new(edge: EdgeKey) -> Self {
        Self { edge }
    }

    /// Executes the operation. Killing an already-dead edge is reported
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<()> {
        if mesh.edge(self.edge).is_err() {
            log::warn!("ignoring kill of a dead edge");
            return Ok(());
        }
        let mut guard = 0;
        while let Some(entry) = mesh.edge(self.edge)?.radial {
            let face = mesh.face_loop(entry)?.face;
            KillFace::new(face).execute(mesh)?;
            guard += 1;
            if guard > MAX_CYCLE_LEN {
                return Err(TopologyError::StructuralCorruption(
                    "radial cycle does not shrink while killing its faces".into(),
                )
                .into());
            }
        }
        let (v1, v2) = {
            let edge = mesh.edge(self.edge)?;
            (edge.v1, edge.v2)
        };
        disk_detach(mesh, self.edge, v1)?;
        disk_detach(mesh, self.edge, v2)?;
        mesh.free_edge(self.edge);
        Ok(())
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
    fn killing_a_wire_edge_isolates_its_ends() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b).execute(&mut mesh).unwrap();

        KillEdge::new(e).execute(&mut mesh).unwrap();
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.vertex(a).unwrap().is_isolated());
        assert!(mesh.vertex(b).unwrap().is_isolated());
    }

    #[test]
    fn killing_a_shared_edge_cascades_to_both_faces() {
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
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeFace::new(vec![v[0], v[2], v[3]]).execute(&mut mesh).unwrap();

        let diagonal = mesh.find_edge(v[0], v[2]).unwrap();
        KillEdge::new(diagonal).execute(&mut mesh).unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.loop_count(), 0);
        // The four perimeter edges survive as wire
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);
    }
}
