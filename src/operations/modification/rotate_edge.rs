use crate::error::{OperationError, Result, TopologyError};
use crate::operations::modification::{DissolveEdge, SplitFace};
use crate::operations::Outcome;
use crate::topology::{walk_radial, EdgeKey, ElemFlags, ElemKind, Mesh};

/// Rotation direction for [`RotateEdge`], relative to the windings of
/// the two faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Rotate with the winding.
    Ccw,
    /// Rotate against the winding.
    Cw,
}

/// Rotates an edge shared by exactly two faces to the next diagonal.
///
/// The two faces are merged and re-split between the corners one step
/// around from the old edge. The rotated edge keeps its id, flags, and
/// custom data. Declines (leaving the mesh untouched) when the edge is
/// not two-faced or the target diagonal already exists.
pub struct RotateEdge {
    edge: EdgeKey,
    direction: Rotation,
}

impl RotateEdge {
    /// Creates a new `RotateEdge` operation.
    #[must_use]
    pub fn new(edge: EdgeKey, direction: Rotation) -> Self {
        Self { edge, direction }
    }

    /// Executes the operation, returning the rotated edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is dead or a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<Outcome<EdgeKey>> {
        let radial = walk_radial(mesh, self.edge)?;
        if radial.len() != 2 {
            log::warn!("declining rotation of an edge without exactly two faces");
            return Ok(Outcome::NoOp);
        }
        let (la, lb) = (radial[0], radial[1]);
        let fa = mesh.face_loop(la)?.face;
        let fb = mesh.face_loop(lb)?.face;
        if fa == fb {
            log::warn!("declining rotation of an edge used twice by one face");
            return Ok(Outcome::NoOp);
        }
        // The corners the rotated edge will span
        let (t1, t2) = match self.direction {
            Rotation::Ccw => {
                let pa = mesh.face_loop(la)?.prev;
                let pb = mesh.face_loop(lb)?.prev;
                (mesh.face_loop(pa)?.vert, mesh.face_loop(pb)?.vert)
            }
            Rotation::Cw => {
                let na = mesh.face_loop(mesh.face_loop(la)?.next)?.next;
                let nb = mesh.face_loop(mesh.face_loop(lb)?.next)?.next;
                (mesh.face_loop(na)?.vert, mesh.face_loop(nb)?.vert)
            }
        };
        if t1 == t2 {
            log::warn!("declining rotation; target corners coincide");
            return Ok(Outcome::NoOp);
        }
        if mesh.find_edge(t1, t2).is_some() {
            log::warn!("declining rotation; the target diagonal already exists");
            return Ok(Outcome::NoOp);
        }

        let (keep_id, custom, flags, handles) = {
            let edge = mesh.edge(self.edge)?;
            (edge.id, edge.custom.clone(), edge.flags, edge.handles.clone())
        };
        let merged = DissolveEdge::new(self.edge)
            .execute(mesh)?
            .ok_or_else(|| {
                TopologyError::StructuralCorruption(
                    "two-faced edge dissolved to nothing during rotation".into(),
                )
            })?;
        // Keep the old id out of circulation until it is restored below
        mesh.ids.reserve(keep_id);

        let la2 = mesh.loop_of_vertex_in_face(merged, t1)?.ok_or_else(|| {
            OperationError::InvalidArgument(
                "rotation target corner left the merged face".into(),
            )
        })?;
        let lb2 = mesh.loop_of_vertex_in_face(merged, t2)?.ok_or_else(|| {
            OperationError::InvalidArgument(
                "rotation target corner left the merged face".into(),
            )
        })?;
        let (_, ne) = SplitFace::new(merged, la2, lb2).execute(mesh)?;

        mesh.reassign_edge_id(ne, keep_id)?;
        {
            let layout = mesh.layout(ElemKind::Edge).clone();
            let mut copied = layout.default_block();
            layout.copy(&mut copied, &custom);
            mesh.edge_mut(ne)?.custom = copied;
        }
        if flags.contains(ElemFlags::SELECT) {
            mesh.edge_mut(ne)?.flags.insert(ElemFlags::SELECT);
        }
        mesh.edge_mut(ne)?.handles = handles;
        mesh.recalc_edge_length(ne)?;
        Ok(Outcome::Done(ne))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::query::ValidateMesh;
    use crate::operations::{MakeFace, MakeVertex};
    use crate::topology::VertKey;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn split_quad(mesh: &mut Mesh) -> (Vec<VertKey>, EdgeKey) {
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(mesh).unwrap())
        .collect();
        MakeFace::new(vec![v[0], v[1], v[2]]).execute(mesh).unwrap();
        MakeFace::new(vec![v[0], v[2], v[3]]).execute(mesh).unwrap();
        let diagonal = mesh.find_edge(v[0], v[2]).unwrap();
        (v, diagonal)
    }

    #[test]
    fn rotation_moves_the_diagonal() {
        let mut mesh = Mesh::new();
        let (v, diagonal) = split_quad(&mut mesh);
        let old_id = mesh.edge(diagonal).unwrap().id;

        let rotated = RotateEdge::new(diagonal, Rotation::Ccw)
            .execute(&mut mesh)
            .unwrap()
            .done()
            .unwrap();
        let edge = mesh.edge(rotated).unwrap();
        assert!(edge.uses(v[1]) && edge.uses(v[3]));
        assert_eq!(edge.id, old_id);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.edge_count(), 5);
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }

    #[test]
    fn two_rotations_restore_the_original_diagonal() {
        let mut mesh = Mesh::new();
        let (v, diagonal) = split_quad(&mut mesh);
        let first = RotateEdge::new(diagonal, Rotation::Ccw)
            .execute(&mut mesh)
            .unwrap()
            .done()
            .unwrap();
        let second = RotateEdge::new(first, Rotation::Ccw)
            .execute(&mut mesh)
            .unwrap()
            .done()
            .unwrap();
        let edge = mesh.edge(second).unwrap();
        assert!(edge.uses(v[0]) && edge.uses(v[2]));
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }

    #[test]
    fn boundary_edges_decline() {
        let mut mesh = Mesh::new();
        let (v, _) = split_quad(&mut mesh);
        let rim = mesh.find_edge(v[0], v[1]).unwrap();
        assert!(RotateEdge::new(rim, Rotation::Ccw)
            .execute(&mut mesh)
            .unwrap()
            .is_noop());
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn existing_target_diagonal_declines() {
        let mut mesh = Mesh::new();
        // Two triangles over a quad whose other diagonal is also present
        // as a wire edge
        let (v, diagonal) = split_quad(&mut mesh);
        crate::operations::MakeEdge::new(v[1], v[3])
            .execute(&mut mesh)
            .unwrap();
        assert!(RotateEdge::new(diagonal, Rotation::Ccw)
            .execute(&mut mesh)
            .unwrap()
            .is_noop());
        assert_eq!(mesh.face_count(), 2);
    }
}
