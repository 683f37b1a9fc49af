use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::cycles::disk_attach;
use crate::topology::{EdgeHandles, EdgeKey, Mesh, MeshFeatures, VertKey};

/// Creates a wire edge between two existing vertices.
pub struct MakeEdge {
    v1: VertKey,
    v2: VertKey,
    reuse_existing: bool,
    handles: Option<EdgeHandles>,
}

impl MakeEdge {
    /// Creates a new `MakeEdge` operation.
    #[must_use]
    pub fn new(v1: VertKey, v2: VertKey) -> Self {
        Self {
            v1,
            v2,
            reuse_existing: false,
            handles: None,
        }
    }

    /// Returns the existing edge between the endpoints, if one is
    /// already present, instead of creating a parallel edge.
    #[must_use]
    pub fn reuse_existing(mut self, reuse: bool) -> Self {
        self.reuse_existing = reuse;
        self
    }

    /// Gives the new edge cubic curve-control handles.
    #[must_use]
    pub fn with_handles(mut self, h1: Point3, h2: Point3) -> Self {
        self.handles = Some(EdgeHandles { h1, h2 });
        self
    }

    /// Executes the operation, returning the new (or reused) edge.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::DegenerateInput`] if the endpoints
    /// coincide, [`OperationError::Unsupported`] if handles were given
    /// without [`MeshFeatures::CURVE_HANDLES`], or an error if either
    /// endpoint is dead.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<EdgeKey> {
        if self.v1 == self.v2 {
            return Err(
                OperationError::DegenerateInput("edge endpoints coincide".into()).into(),
            );
        }
        if self.handles.is_some() && !mesh.features().contains(MeshFeatures::CURVE_HANDLES) {
            return Err(OperationError::Unsupported("curve handles").into());
        }
        mesh.vertex(self.v1)?;
        mesh.vertex(self.v2)?;
        if self.reuse_existing {
            if let Some(existing) = mesh.find_edge(self.v1, self.v2) {
                return Ok(existing);
            }
        }
        let e = mesh.alloc_edge(self.v1, self.v2)?;
        disk_attach(mesh, e, self.v1)?;
        disk_attach(mesh, e, self.v2)?;
        if let Some(handles) = &self.handles {
            mesh.edge_mut(e)?.handles = Some(handles.clone());
            mesh.recalc_edge_length(e)?;
        }
        Ok(e)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::MakeVertex;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn creates_a_wire_edge_and_updates_disks() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b).execute(&mut mesh).unwrap();

        let edge = mesh.edge(e).unwrap();
        assert!(edge.is_wire());
        assert!((edge.length - 3.0).abs() < 1e-12);
        assert_eq!(mesh.vertex(a).unwrap().valence(), 1);
        assert_eq!(mesh.vertex(b).unwrap().valence(), 1);
    }

    #[test]
    fn coincident_endpoints_are_rejected() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        assert!(MakeEdge::new(a, a).execute(&mut mesh).is_err());
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn reuse_existing_returns_the_present_edge() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let first = MakeEdge::new(a, b).execute(&mut mesh).unwrap();
        let second = MakeEdge::new(a, b)
            .reuse_existing(true)
            .execute(&mut mesh)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(mesh.edge_count(), 1);

        // Without reuse a parallel edge appears
        let third = MakeEdge::new(a, b).execute(&mut mesh).unwrap();
        assert_ne!(first, third);
        assert_eq!(mesh.edge_count(), 2);
    }

    #[test]
    fn handles_need_the_curve_feature() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let res = MakeEdge::new(a, b)
            .with_handles(p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0))
            .execute(&mut mesh);
        assert!(res.is_err());

        let mut curved = Mesh::with_features(
            MeshFeatures::default().union(MeshFeatures::CURVE_HANDLES),
        );
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut curved).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut curved).unwrap();
        let e = MakeEdge::new(a, b)
            .with_handles(p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0))
            .execute(&mut curved)
            .unwrap();
        let edge = curved.edge(e).unwrap();
        assert!(edge.handles.is_some());
        // A bowed curve is longer than the chord
        assert!(edge.length > 3.0);
    }
}
