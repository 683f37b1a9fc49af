use crate::topology::Mesh;

/// Aggregate element tallies of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCounts {
    /// Live vertices.
    pub vertices: usize,
    /// Live edges.
    pub edges: usize,
    /// Live loops.
    pub loops: usize,
    /// Live faces.
    pub faces: usize,
    /// Edges with no adjacent face.
    pub wire_edges: usize,
    /// Vertices with no incident edge.
    pub isolated_vertices: usize,
}

impl MeshCounts {
    /// The Euler characteristic `V - E + F`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices as i64 - self.edges as i64 + self.faces as i64
    }
}

/// Tallies the mesh's elements.
#[derive(Default)]
pub struct Counts;

impl Counts {
    /// Creates a new `Counts` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation.
    #[must_use]
    pub fn execute(&self, mesh: &Mesh) -> MeshCounts {
        MeshCounts {
            vertices: mesh.vertex_count(),
            edges: mesh.edge_count(),
            loops: mesh.loop_count(),
            faces: mesh.face_count(),
            wire_edges: mesh
                .edge_store()
                .iter()
                .filter(|(_, e)| e.is_wire())
                .count(),
            isolated_vertices: mesh
                .vertex_store()
                .iter()
                .filter(|(_, v)| v.is_isolated())
                .count(),
        }
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
    fn counts_track_the_mesh() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(5.0, 0.0, 0.0),
            p(9.0, 9.0, 9.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeEdge::new(v[1], v[3]).execute(&mut mesh).unwrap();

        let counts = Counts::new().execute(&mesh);
        assert_eq!(counts.vertices, 5);
        assert_eq!(counts.edges, 4);
        assert_eq!(counts.loops, 3);
        assert_eq!(counts.faces, 1);
        assert_eq!(counts.wire_edges, 1);
        assert_eq!(counts.isolated_vertices, 1);
        assert_eq!(counts.euler_characteristic(), 2);
    }
}
