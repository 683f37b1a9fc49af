use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{Mesh, MeshFeatures, VertKey};

/// Creates an isolated vertex at a position.
pub struct MakeVertex {
    position: Point3,
}

impl MakeVertex {
    /// Creates a new `MakeVertex` operation.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self { position }
    }

    /// Executes the operation, returning the new vertex.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Unsupported`] if the mesh was built
    /// without [`MeshFeatures::VERT_CREATE`].
    pub fn execute(&self, mesh: &mut Mesh) -> Result<VertKey> {
        if !mesh.features().contains(MeshFeatures::VERT_CREATE) {
            return Err(OperationError::Unsupported("vertex creation").into());
        }
        Ok(mesh.alloc_vertex(self.position))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::ElemId;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn creates_an_isolated_vertex() {
        let mut mesh = Mesh::new();
        let v = MakeVertex::new(p(1.0, 2.0, 3.0)).execute(&mut mesh).unwrap();
        let vert = mesh.vertex(v).unwrap();
        assert_eq!(vert.id, ElemId(0));
        assert_eq!(vert.position, p(1.0, 2.0, 3.0));
        assert!(vert.is_isolated());
        assert_eq!(mesh.vertex_count(), 1);
    }

    #[test]
    fn refused_when_the_feature_is_off() {
        let mut mesh = Mesh::with_features(MeshFeatures::empty());
        let err = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh);
        assert!(err.is_err());
        assert_eq!(mesh.vertex_count(), 0);
    }
}
