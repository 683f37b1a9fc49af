use crate::error::{OperationError, Result, TopologyError};
use crate::operations::modification::ReverseFace;
use crate::operations::removal::KillEdge;
use crate::topology::cycles::{
    boundary_link, disk_attach, disk_detach, radial_attach, radial_detach,
};
use crate::topology::{
    walk_boundary, walk_radial, Boundary, EdgeKey, FaceKey, Mesh, MAX_CYCLE_LEN,
};

/// Dissolves an edge, merging the faces on its two sides into one.
///
/// A wire or single-face edge is simply killed. When more than two
/// faces share the edge, face pairs are peeled off onto temporary
/// parallel edges and merged pairwise until the edge is gone. The face
/// on the first radial side survives and adopts the other side's holes;
/// a side wound the same way is reversed first so the cycles can join.
pub struct DissolveEdge {
    edge: EdgeKey,
}

impl DissolveEdge {
    /// Creates a new `DissolveEdge` operation.
    #[must_use]
    pub fn new(edge: EdgeKey) -> Self {
        Self { edge }
    }

    /// Executes the operation, returning the surviving merged face, or
    /// `None` if the edge had at most one face and was simply removed.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if the edge is used
    /// twice by the same face, or an error if the edge is dead or a
    /// cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<Option<FaceKey>> {
        mesh.edge(self.edge)?;
        let mut merged = None;
        let mut guard = 0;
        loop {
            let radial = walk_radial(mesh, self.edge)?;
            match radial.len() {
                0 | 1 => {
                    KillEdge::new(self.edge).execute(mesh)?;
                    return Ok(merged);
                }
                2 => return dissolve_pair(mesh, self.edge).map(Some),
                _ => {
                    // Peel the first two faces onto a parallel edge and
                    // merge that pair on its own
                    let (v1, v2) = {
                        let edge = mesh.edge(self.edge)?;
                        (edge.v1, edge.v2)
                    };
                    let peeled = mesh.alloc_edge(v1, v2)?;
                    disk_attach(mesh, peeled, v1)?;
                    disk_attach(mesh, peeled, v2)?;
                    for &l in &radial[..2] {
                        radial_detach(mesh, l)?;
                        radial_attach(mesh, l, peeled)?;
                    }
                    merged = Some(dissolve_pair(mesh, peeled)?);
                }
            }
            guard += 1;
            if guard > MAX_CYCLE_LEN {
                return Err(TopologyError::StructuralCorruption(
                    "radial cycle does not shrink while dissolving".into(),
                )
                .into());
            }
        }
    }
}

/// Merges the two faces of a two-face edge across it.
fn dissolve_pair(mesh: &mut Mesh, e: EdgeKey) -> Result<FaceKey> {
    let radial = walk_radial(mesh, e)?;
    let la = radial[0];
    let mut lb = radial[1];
    let (fa, va) = {
        let lp = mesh.face_loop(la)?;
        (lp.face, lp.vert)
    };
    let (fb, vb) = {
        let lp = mesh.face_loop(lb)?;
        (lp.face, lp.vert)
    };
    if fa == fb {
        return Err(OperationError::InvalidArgument(
            "edge is used twice by the same face".into(),
        )
        .into());
    }
    if va == vb {
        // Both faces traverse the edge in the same direction; flip one
        ReverseFace::new(fb).execute(mesh)?;
        lb = *walk_radial(mesh, e)?
            .iter()
            .find(|&&l| l != la)
            .ok_or_else(|| {
                TopologyError::StructuralCorruption(
                    "radial mate vanished during reversal".into(),
                )
            })?;
    }

    let bi = mesh.boundary_index_of(fa, la)?;
    let bj = mesh.boundary_index_of(fb, lb)?;
    let la_len = mesh.face(fa)?.boundaries[bi].len;
    let lb_len = mesh.face(fb)?.boundaries[bj].len;
    let adopted: Vec<Boundary> = mesh
        .face(fb)?
        .boundaries
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != bj)
        .map(|(_, b)| *b)
        .collect();
    let (a_prev, a_next) = {
        let lp = mesh.face_loop(la)?;
        (lp.prev, lp.next)
    };
    let (b_prev, b_next) = {
        let lp = mesh.face_loop(lb)?;
        (lp.prev, lp.next)
    };

    boundary_link(mesh, a_prev, b_next)?;
    boundary_link(mesh, b_prev, a_next)?;
    radial_detach(mesh, la)?;
    radial_detach(mesh, lb)?;
    mesh.free_loop(la);
    mesh.free_loop(lb);
    let (v1, v2) = {
        let edge = mesh.edge(e)?;
        (edge.v1, edge.v2)
    };
    disk_detach(mesh, e, v1)?;
    disk_detach(mesh, e, v2)?;
    mesh.free_edge(e);

    for l in walk_boundary(mesh, a_next)? {
        mesh.face_loop_mut(l)?.face = fa;
    }
    mesh.face_mut(fa)?.boundaries[bi] = Boundary {
        first: a_next,
        len: la_len + lb_len - 2,
    };
    for hole in adopted {
        for l in walk_boundary(mesh, hole.first)? {
            mesh.face_loop_mut(l)?.face = fa;
        }
        mesh.face_mut(fa)?.boundaries.push(hole);
    }
    mesh.free_face(fb);
    mesh.recalc_face_geometry(fa)?;
    Ok(fa)
}
