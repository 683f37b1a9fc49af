use crate::error::{OperationError, Result};
use crate::operations::modification::SplitFace;
use crate::topology::{EdgeKey, FaceKey, Mesh, VertKey};

/// Connects two vertices of a face with a new edge, splitting the face.
///
/// A thin convenience over [`SplitFace`] that locates the corners from
/// the vertices. Without an explicit face, the vertices must share
/// exactly one.
pub struct ConnectVertices {
    v1: VertKey,
    v2: VertKey,
    face: Option<FaceKey>,
}

impl ConnectVertices {
    /// Creates a new `ConnectVertices` operation; the shared face is
    /// located automatically.
    #[must_use]
    pub fn new(v1: VertKey, v2: VertKey) -> Self {
        Self { v1, v2, face: None }
    }

    /// Creates the operation against an explicit face, for vertices
    /// sharing more than one.
    #[must_use]
    pub fn in_face(v1: VertKey, v2: VertKey, face: FaceKey) -> Self {
        Self {
            v1,
            v2,
            face: Some(face),
        }
    }

    /// Executes the operation, returning the new face and edge.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if the vertices do
    /// not bound a common face, share more than one without an explicit
    /// choice, or are adjacent on the boundary.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<(FaceKey, EdgeKey)> {
        let face = match self.face {
            Some(f) => {
                mesh.face(f)?;
                f
            }
            None => {
                let around_v1 = mesh.faces_around_vertex(self.v1)?;
                let around_v2 = mesh.faces_around_vertex(self.v2)?;
                let shared: Vec<FaceKey> = around_v1
                    .into_iter()
                    .filter(|f| around_v2.contains(f))
                    .collect();
                match shared.as_slice() {
                    [] => {
                        return Err(OperationError::InvalidArgument(
                            "vertices share no face".into(),
                        )
                        .into())
                    }
                    [only] => *only,
                    _ => {
                        return Err(OperationError::InvalidArgument(
                            "vertices share more than one face; name the face explicitly".into(),
                        )
                        .into())
                    }
                }
            }
        };
        let la = mesh
            .loop_of_vertex_in_face(face, self.v1)?
            .ok_or_else(|| OperationError::InvalidArgument(
                "first vertex does not bound the face".into(),
            ))?;
        let lb = mesh
            .loop_of_vertex_in_face(face, self.v2)?
            .ok_or_else(|| OperationError::InvalidArgument(
                "second vertex does not bound the face".into(),
            ))?;
        SplitFace::new(face, la, lb).execute(mesh)
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
    fn connects_across_the_unique_shared_face() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        MakeFace::new(v.clone()).execute(&mut mesh).unwrap();

        let (_, ne) = ConnectVertices::new(v[1], v[3]).execute(&mut mesh).unwrap();
        assert_eq!(mesh.face_count(), 2);
        let edge = mesh.edge(ne).unwrap();
        assert!(edge.uses(v[1]) && edge.uses(v[3]));
    }

    #[test]
    fn disjoint_vertices_are_rejected() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(5.0, 5.0, 0.0),
            p(6.0, 5.0, 0.0),
            p(5.0, 6.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        MakeFace::new(vec![v[3], v[4], v[5]]).execute(&mut mesh).unwrap();
        assert!(ConnectVertices::new(v[0], v[3]).execute(&mut mesh).is_err());
        assert_eq!(mesh.face_count(), 2);
    }
}
