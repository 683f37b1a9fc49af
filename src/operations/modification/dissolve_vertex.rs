use crate::error::{Result, TopologyError};
use crate::operations::modification::{DissolveEdge, JoinEdges};
use crate::operations::removal::KillEdge;
use crate::operations::Outcome;
use crate::topology::cycles::{boundary_link, disk_detach, radial_detach};
use crate::topology::{
    walk_boundary, walk_radial, EdgeKey, FaceKey, Mesh, VertKey, MAX_CYCLE_LEN,
};

/// Dissolves a vertex, merging the fan of faces around it into one.
///
/// An isolated vertex is simply removed; a valence-one wire endpoint
/// takes its edge with it; a valence-two vertex delegates to
/// [`JoinEdges`]. Higher valences require a closed interior fan (every
/// incident edge two-faced, one distinct face per edge, each visiting
/// the vertex once); anything else declines and leaves the mesh
/// untouched.
pub struct DissolveVertex {
    vert: VertKey,
}

impl DissolveVertex {
    /// Creates a new `DissolveVertex` operation.
    #[must_use]
    pub fn new(vert: VertKey) -> Self {
        Self { vert }
    }

    /// Executes the operation, returning the merged face if the
    /// dissolve produced one.
    ///
    /// # Errors
    ///
    /// Returns an error if a cycle is corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<Outcome<Option<FaceKey>>> {
        let Ok(vert) = mesh.vertex(self.vert) else {
            log::warn!("declining dissolve of a dead vertex");
            return Ok(Outcome::NoOp);
        };
        let disk = vert.edges.clone();
        match disk.len() {
            0 => {
                mesh.free_vertex(self.vert);
                Ok(Outcome::Done(None))
            }
            1 => {
                if mesh.edge(disk[0])?.is_wire() {
                    KillEdge::new(disk[0]).execute(mesh)?;
                    mesh.free_vertex(self.vert);
                    Ok(Outcome::Done(None))
                } else {
                    log::warn!("declining dissolve of a dangling face corner");
                    Ok(Outcome::NoOp)
                }
            }
            2 => match JoinEdges::new(self.vert).execute(mesh)? {
                Outcome::Done(_) => Ok(Outcome::Done(None)),
                Outcome::NoOp => Ok(Outcome::NoOp),
            },
            valence => self.dissolve_fan(mesh, &disk, valence),
        }
    }

    /// Merges the closed fan of faces around the vertex, then removes
    /// the spur left by the last incident edge.
    fn dissolve_fan(
        &self,
        mesh: &mut Mesh,
        disk: &[EdgeKey],
        valence: usize,
    ) -> Result<Outcome<Option<FaceKey>>> {
        let mut fan: Vec<FaceKey> = Vec::new();
        for &e in disk {
            let radial = walk_radial(mesh, e)?;
            if radial.len() != 2 {
                log::warn!("declining dissolve; an incident edge is not two-faced");
                return Ok(Outcome::NoOp);
            }
            for l in radial {
                let f = mesh.face_loop(l)?.face;
                if !fan.contains(&f) {
                    fan.push(f);
                }
            }
        }
        if fan.len() != valence {
            log::warn!("declining dissolve; the face fan does not close");
            return Ok(Outcome::NoOp);
        }
        for &f in &fan {
            let mut visits = 0;
            for boundary in mesh.face(f)?.boundaries.clone() {
                for l in walk_boundary(mesh, boundary.first)? {
                    if mesh.face_loop(l)?.vert == self.vert {
                        visits += 1;
                    }
                }
            }
            if visits != 1 {
                log::warn!("declining dissolve; a fan face visits the vertex {visits} times");
                return Ok(Outcome::NoOp);
            }
        }

        // Dissolve spoke edges until only one remains
        let mut merged: Option<FaceKey> = None;
        let mut guard = 0;
        while mesh.vertex(self.vert)?.valence() > 1 {
            let disk = mesh.vertex(self.vert)?.edges.clone();
            let mut pick = None;
            for &e in &disk {
                let radial = walk_radial(mesh, e)?;
                if radial.len() == 2 {
                    let fa = mesh.face_loop(radial[0])?.face;
                    let fb = mesh.face_loop(radial[1])?.face;
                    if fa != fb {
                        pick = Some(e);
                        break;
                    }
                }
            }
            let Some(e) = pick else { break };
            if let Some(f) = DissolveEdge::new(e).execute(mesh)? {
                merged = Some(f);
            }
            guard += 1;
            if guard > MAX_CYCLE_LEN {
                return Err(TopologyError::StructuralCorruption(
                    "disk cycle does not shrink while dissolving".into(),
                )
                .into());
            }
        }

        // The last spoke runs into the merged face as a spur
        let disk = mesh.vertex(self.vert)?.edges.clone();
        if let [last] = disk[..] {
            remove_spur(mesh, self.vert, last)?;
        }
        mesh.free_vertex(self.vert);
        Ok(Outcome::Done(merged))
    }
}

/// Removes the spur `u -> v -> u` that the final spoke edge leaves in
/// the merged face's boundary.
fn remove_spur(mesh: &mut Mesh, v: VertKey, e: EdgeKey) -> Result<()> {
    let radial = walk_radial(mesh, e)?;
    if radial.len() != 2 {
        return Err(TopologyError::StructuralCorruption(
            "spur edge is not two-sided".into(),
        )
        .into());
    }
    let (l_in, l_out) = if mesh.face_loop(radial[0])?.vert == v {
        (radial[1], radial[0])
    } else {
        (radial[0], radial[1])
    };
    let face = mesh.face_loop(l_in)?.face;
    let bi = mesh.boundary_index_of(face, l_in)?;
    let in_prev = mesh.face_loop(l_in)?.prev;
    let out_next = mesh.face_loop(l_out)?.next;
    boundary_link(mesh, in_prev, out_next)?;
    {
        let boundary = &mut mesh.face_mut(face)?.boundaries[bi];
        boundary.len = boundary.len.saturating_sub(2);
        if boundary.first == l_in || boundary.first == l_out {
            boundary.first = out_next;
        }
    }
    radial_detach(mesh, l_in)?;
    radial_detach(mesh, l_out)?;
    mesh.free_loop(l_in);
    mesh.free_loop(l_out);
    let other = mesh.edge(e)?.other_end(v).ok_or_else(|| {
        TopologyError::StructuralCorruption("spur edge does not use its vertex".into())
    })?;
    disk_detach(mesh, e, v)?;
    disk_detach(mesh, e, other)?;
    mesh.free_edge(e);
    mesh.recalc_face_geometry(face)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::query::ValidateMesh;
    use crate::operations::{MakeEdge, MakeFace, MakeVertex};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn isolated_and_dangling_vertices() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        assert_eq!(
            DissolveVertex::new(a).execute(&mut mesh).unwrap(),
            Outcome::Done(None)
        );
        assert_eq!(mesh.vertex_count(), 0);

        let b = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let c = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        MakeEdge::new(b, c).execute(&mut mesh).unwrap();
        assert_eq!(
            DissolveVertex::new(b).execute(&mut mesh).unwrap(),
            Outcome::Done(None)
        );
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.vertex_count(), 1);
    }

    #[test]
    fn interior_vertex_of_a_triangle_fan_dissolves() {
        let mut mesh = Mesh::new();
        let hub = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let rim: Vec<_> = [
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(-1.0, 0.0, 0.0),
            p(0.0, -1.0, 0.0),
        ]
        .iter()
        .map(|pt| MakeVertex::new(*pt).execute(&mut mesh).unwrap())
        .collect();
        for i in 0..rim.len() {
            MakeFace::new(vec![hub, rim[i], rim[(i + 1) % rim.len()]])
                .execute(&mut mesh)
                .unwrap();
        }
        assert_eq!(mesh.face_count(), 4);

        let outcome = DissolveVertex::new(hub).execute(&mut mesh).unwrap();
        let merged = outcome.done().unwrap().unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.face(merged).unwrap().outer().unwrap().len, 4);
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }

    #[test]
    fn boundary_vertex_declines() {
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

        // v0 has valence three but its rim edges are single-faced
        assert!(DissolveVertex::new(v[0]).execute(&mut mesh).unwrap().is_noop());
        assert_eq!(mesh.face_count(), 2);
        assert!(ValidateMesh::check(&mesh).unwrap().ok());
    }
}
