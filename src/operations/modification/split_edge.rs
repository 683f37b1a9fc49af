use crate::error::{OperationError, Result};
use crate::math::{cubic_split, lerp};
use crate::topology::cycles::{
    boundary_link, disk_attach, disk_detach, radial_attach, radial_detach,
};
use crate::topology::{walk_radial, EdgeHandles, EdgeKey, ElemKind, Mesh, VertKey};

/// Splits an edge at parameter `t`, inserting a new vertex.
///
/// The original edge keeps its `v1` side; the new edge spans from the
/// new vertex to the old `v2`. Every face using the edge gains one
/// corner, so face count and winding are preserved. Vertex and corner
/// custom data at the split blend by `t`; curved edges subdivide their
/// control handles exactly.
pub struct SplitEdge {
    edge: EdgeKey,
    t: f64,
}

impl SplitEdge {
    /// Creates a new `SplitEdge` operation.
    #[must_use]
    pub fn new(edge: EdgeKey, t: f64) -> Self {
        Self { edge, t }
    }

    /// Executes the operation, returning the new edge and the new
    /// vertex.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::DegenerateInput`] for a parameter
    /// outside `(0, 1)`, or an error if the edge is dead or a cycle is
    /// corrupted.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<(EdgeKey, VertKey)> {
        if self.t <= 0.0 || self.t >= 1.0 {
            return Err(OperationError::DegenerateInput(format!(
                "split parameter {} must lie strictly inside (0, 1)",
                self.t
            ))
            .into());
        }
        let e = self.edge;
        let (v1, v2, handles) = {
            let edge = mesh.edge(e)?;
            (edge.v1, edge.v2, edge.handles.clone())
        };
        let radial_loops = walk_radial(mesh, e)?;
        let p1 = mesh.vertex(v1)?.position;
        let p2 = mesh.vertex(v2)?.position;
        let (position, split_handles) = match &handles {
            Some(h) => {
                let (first, second) = cubic_split(&p1, &h.h1, &h.h2, &p2, self.t);
                (first.2, Some((first, second)))
            }
            None => (lerp(&p1, &p2, self.t), None),
        };

        let nv = mesh.alloc_vertex(position);
        {
            let layout = mesh.layout(ElemKind::Vertex).clone();
            let a = mesh.vertex(v1)?.custom.clone();
            let b = mesh.vertex(v2)?.custom.clone();
            let mut blended = layout.default_block();
            layout.interpolate(&mut blended, &[&a, &b], &[1.0 - self.t, self.t]);
            mesh.vertex_mut(nv)?.custom = blended;
        }

        // The old edge now spans v1..nv, the new one nv..v2
        disk_detach(mesh, e, v2)?;
        mesh.edge_mut(e)?.v2 = nv;
        disk_attach(mesh, e, nv)?;
        let ne = mesh.alloc_edge(nv, v2)?;
        disk_attach(mesh, ne, nv)?;
        disk_attach(mesh, ne, v2)?;
        {
            let layout = mesh.layout(ElemKind::Edge).clone();
            let src = mesh.edge(e)?.custom.clone();
            let mut copied = layout.default_block();
            layout.copy(&mut copied, &src);
            mesh.edge_mut(ne)?.custom = copied;
        }
        if let Some((first, second)) = split_handles {
            mesh.edge_mut(e)?.handles = Some(EdgeHandles {
                h1: first.0,
                h2: first.1,
            });
            mesh.edge_mut(ne)?.handles = Some(EdgeHandles {
                h1: second.0,
                h2: second.1,
            });
        }
        mesh.recalc_edge_length(e)?;
        mesh.recalc_edge_length(ne)?;

        // Insert one corner at nv into every face boundary crossing the
        // edge, matching each loop's direction of travel
        let loop_layout = mesh.layout(ElemKind::Loop).clone();
        for l in radial_loops {
            let (face, l_vert, l_next, l_custom) = {
                let lp = mesh.face_loop(l)?;
                (lp.face, lp.vert, lp.next, lp.custom.clone())
            };
            let forward = l_vert == v1;
            let nl = mesh.alloc_loop(nv, if forward { ne } else { e }, face);
            {
                let next_custom = mesh.face_loop(l_next)?.custom.clone();
                let wl = if forward { 1.0 - self.t } else { self.t };
                let mut blended = loop_layout.default_block();
                loop_layout.interpolate(&mut blended, &[&l_custom, &next_custom], &[wl, 1.0 - wl]);
                mesh.face_loop_mut(nl)?.custom = blended;
            }
            boundary_link(mesh, l, nl)?;
            boundary_link(mesh, nl, l_next)?;
            if !forward {
                // The old corner now runs along the second half
                radial_detach(mesh, l)?;
                radial_attach(mesh, l, ne)?;
            }
            radial_attach(mesh, nl, if forward { ne } else { e })?;
            let bi = mesh.boundary_index_of(face, l)?;
            mesh.face_mut(face)?.boundaries[bi].len += 1;
        }
        Ok((ne, nv))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::customdata::{LayerDescriptor, LayerKind, Value};
    use crate::math::Point3;
    use crate::operations::{MakeEdge, MakeFace, MakeVertex};
    use crate::topology::{walk_boundary, MeshFeatures};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn splitting_a_wire_edge() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(4.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b).execute(&mut mesh).unwrap();

        let (ne, nv) = SplitEdge::new(e, 0.25).execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertex(nv).unwrap().position, p(1.0, 0.0, 0.0));
        assert_eq!(mesh.edge(e).unwrap().v2, nv);
        assert_eq!(mesh.edge(ne).unwrap().v1, nv);
        assert!((mesh.edge(e).unwrap().length - 1.0).abs() < 1e-12);
        assert!((mesh.edge(ne).unwrap().length - 3.0).abs() < 1e-12);
        assert_eq!(mesh.vertex(nv).unwrap().valence(), 2);
    }

    #[test]
    fn faces_gain_a_corner_on_both_sides() {
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
        let f1 = MakeFace::new(vec![v[0], v[1], v[2]]).execute(&mut mesh).unwrap();
        let f2 = MakeFace::new(vec![v[0], v[2], v[3]]).execute(&mut mesh).unwrap();

        let diagonal = mesh.find_edge(v[0], v[2]).unwrap();
        SplitEdge::new(diagonal, 0.5).execute(&mut mesh).unwrap();

        for f in [f1, f2] {
            let outer = *mesh.face(f).unwrap().outer().unwrap();
            assert_eq!(outer.len, 4);
            assert_eq!(walk_boundary(&mesh, outer.first).unwrap().len(), 4);
        }
        assert_eq!(mesh.loop_count(), 8);
        assert_eq!(mesh.edge_count(), 6);
    }

    #[test]
    fn vertex_data_blends_at_the_split() {
        let mut mesh = Mesh::new();
        let idx = mesh.add_layer(
            ElemKind::Vertex,
            LayerDescriptor::new("weight", LayerKind::Float),
        );
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        mesh.vertex_mut(a).unwrap().custom.set(idx, Value::Float(10.0));
        mesh.vertex_mut(b).unwrap().custom.set(idx, Value::Float(20.0));
        let e = MakeEdge::new(a, b).execute(&mut mesh).unwrap();

        let (_, nv) = SplitEdge::new(e, 0.5).execute(&mut mesh).unwrap();
        assert_eq!(
            mesh.vertex(nv).unwrap().custom.value(idx),
            Some(&Value::Float(15.0))
        );
    }

    #[test]
    fn curved_edges_subdivide_their_handles() {
        let mut mesh = Mesh::with_features(
            MeshFeatures::default().union(MeshFeatures::CURVE_HANDLES),
        );
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(3.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b)
            .with_handles(p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0))
            .execute(&mut mesh)
            .unwrap();
        let full = mesh.edge(e).unwrap().length;

        let (ne, nv) = SplitEdge::new(e, 0.5).execute(&mut mesh).unwrap();
        assert!(mesh.edge(e).unwrap().handles.is_some());
        assert!(mesh.edge(ne).unwrap().handles.is_some());
        // The split vertex sits on the curve, above the chord
        assert!(mesh.vertex(nv).unwrap().position.y > 0.0);
        let halves = mesh.edge(e).unwrap().length + mesh.edge(ne).unwrap().length;
        assert!((halves - full).abs() < 1e-3);
    }

    #[test]
    fn out_of_range_parameter_is_rejected() {
        let mut mesh = Mesh::new();
        let a = MakeVertex::new(p(0.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let b = MakeVertex::new(p(1.0, 0.0, 0.0)).execute(&mut mesh).unwrap();
        let e = MakeEdge::new(a, b).execute(&mut mesh).unwrap();
        assert!(SplitEdge::new(e, 0.0).execute(&mut mesh).is_err());
        assert!(SplitEdge::new(e, 1.0).execute(&mut mesh).is_err());
        assert!(SplitEdge::new(e, -0.5).execute(&mut mesh).is_err());
        assert_eq!(mesh.vertex_count(), 2);
    }
}
