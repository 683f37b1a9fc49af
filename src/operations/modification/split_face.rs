use crate::error::{OperationError, Result};
use crate::topology::cycles::{boundary_link, disk_attach, radial_attach};
use crate::topology::{walk_boundary, Boundary, EdgeKey, ElemKind, FaceKey, LoopKey, Mesh};

/// Splits a face in two along a new edge between two of its corners.
///
/// Both corners must lie on the same boundary and must not already be
/// adjacent. The original face keeps the side from the second corner up
/// to the first; the new face takes the other side. Hole boundaries
/// stay with the original face.
pub struct SplitFace {
    face: FaceKey,
    from: LoopKey,
    to: LoopKey,
}

impl SplitFace {
    /// Creates a new `SplitFace` operation cutting from the corner
    /// `from` to the corner `to`.
    #[must_use]
    pub fn new(face: FaceKey, from: LoopKey, to: LoopKey) -> Self {
        Self { face, from, to }
    }

    /// Executes the operation, returning the new face and the cutting
    /// edge.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if the corners
    /// coincide, are adjacent, belong to another face, or lie on
    /// different boundaries.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<(FaceKey, EdgeKey)> {
        let la = self.from;
        let lb = self.to;
        if la == lb {
            return Err(
                OperationError::InvalidArgument("split corners coincide".into()).into(),
            );
        }
        let (va, a_prev, a_next, fa, a_custom) = {
            let lp = mesh.face_loop(la)?;
            (lp.vert, lp.prev, lp.next, lp.face, lp.custom.clone())
        };
        let (vb, b_prev, b_next, fb, b_custom) = {
            let lp = mesh.face_loop(lb)?;
            (lp.vert, lp.prev, lp.next, lp.face, lp.custom.clone())
        };
        if fa != self.face || fb != self.face {
            return Err(OperationError::InvalidArgument(
                "split corners belong to another face".into(),
            )
            .into());
        }
        if a_next == lb || b_next == la {
            return Err(OperationError::InvalidArgument(
                "split corners are adjacent; the edge already bounds the face".into(),
            )
            .into());
        }
        let bi = mesh.boundary_index_of(self.face, la)?;
        let entry = mesh.face(self.face)?.boundaries[bi].first;
        if !walk_boundary(mesh, entry)?.contains(&lb) {
            return Err(OperationError::InvalidArgument(
                "split corners lie on different boundaries".into(),
            )
            .into());
        }

        let ne = match mesh.find_edge(va, vb) {
            Some(e) => e,
            None => {
                let e = mesh.alloc_edge(va, vb)?;
                disk_attach(mesh, e, va)?;
                disk_attach(mesh, e, vb)?;
                e
            }
        };
        let nf = mesh.alloc_face();
        {
            let layout = mesh.layout(ElemKind::Face).clone();
            let src = mesh.face(self.face)?.custom.clone();
            let mut copied = layout.default_block();
            layout.copy(&mut copied, &src);
            mesh.face_mut(nf)?.custom = copied;
        }

        // Two new corners cap the cut, one per side
        let l1 = mesh.alloc_loop(vb, ne, self.face);
        let l2 = mesh.alloc_loop(va, ne, nf);
        mesh.face_loop_mut(l1)?.custom = b_custom;
        mesh.face_loop_mut(l2)?.custom = a_custom;
        boundary_link(mesh, b_prev, l1)?;
        boundary_link(mesh, l1, la)?;
        boundary_link(mesh, a_prev, l2)?;
        boundary_link(mesh, l2, lb)?;
        radial_attach(mesh, l1, ne)?;
        radial_attach(mesh, l2, ne)?;

        let kept_cycle = walk_boundary(mesh, la)?;
        for &l in &kept_cycle {
            mesh.face_loop_mut(l)?.face = self.face;
        }
        let new_cycle = walk_boundary(mesh, lb)?;
        for &l in &new_cycle {
            mesh.face_loop_mut(l)?.face = nf;
        }
        mesh.face_mut(self.face)?.boundaries[bi] = Boundary {
            first: la,
            len: kept_cycle.len(),
        };
        mesh.face_mut(nf)?.boundaries.push(Boundary {
            first: lb,
            len: new_cycle.len(),
        });
        mesh.recalc_face_geometry(self.face)?;
        mesh.recalc_face_geometry(nf)?;
        Ok((nf, ne))
    }
}
