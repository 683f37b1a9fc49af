//! Disk, radial, and boundary cycle maintenance.
//!
//! All cyclic structures are kept as key links inside the elements; the
//! helpers here are the only code that splices them. Walkers bound
//! their traversal so a corrupted cycle reports
//! [`TopologyError::StructuralCorruption`] instead of hanging.

use crate::error::{Result, TopologyError};

use super::edge::EdgeKey;
use super::loops::LoopKey;
use super::vertex::VertKey;
use super::Mesh;

/// Upper bound on any cycle walk; longer cycles are treated as
/// corrupted links.
pub const MAX_CYCLE_LEN: usize = 1_000_000;

/// Adds `e` to `v`'s disk cycle. Duplicate entries are not created.
pub(crate) fn disk_attach(mesh: &mut Mesh, e: EdgeKey, v: VertKey) -> Result<()> {
    let vert = mesh.verts.get_mut(v)?;
    if !vert.edges.contains(&e) {
        vert.edges.push(e);
    }
    Ok(())
}

/// Removes `e` from `v`'s disk cycle; missing entries are ignored.
pub(crate) fn disk_detach(mesh: &mut Mesh, e: EdgeKey, v: VertKey) -> Result<()> {
    let vert = mesh.verts.get_mut(v)?;
    if let Some(pos) = vert.edges.iter().position(|&d| d == e) {
        vert.edges.swap_remove(pos);
    }
    Ok(())
}

/// Splices loop `l` into `e`'s radial cycle and points `l.edge` at `e`.
pub(crate) fn radial_attach(mesh: &mut Mesh, l: LoopKey, e: EdgeKey) -> Result<()> {
    let entry = mesh.edges.get(e)?.radial;
    match entry {
        None => {
            let lp = mesh.loops.get_mut(l)?;
            lp.edge = e;
            lp.radial_next = l;
            lp.radial_prev = l;
            mesh.edges.get_mut(e)?.radial = Some(l);
        }
        Some(entry) => {
            let entry_next = mesh.loops.get(entry)?.radial_next;
            {
                let lp = mesh.loops.get_mut(l)?;
                lp.edge = e;
                lp.radial_next = entry_next;
                lp.radial_prev = entry;
            }
            mesh.loops.get_mut(entry)?.radial_next = l;
            mesh.loops.get_mut(entry_next)?.radial_prev = l;
        }
    }
    Ok(())
}

/// Removes loop `l` from its edge's radial cycle, moving the edge's
/// entry point if it pointed at `l`.
pub(crate) fn radial_detach(mesh: &mut Mesh, l: LoopKey) -> Result<()> {
    let (e, rn, rp) = {
        let lp = mesh.loops.get(l)?;
        (lp.edge, lp.radial_next, lp.radial_prev)
    };
    if rn == l {
        if let Ok(edge) = mesh.edges.get_mut(e) {
            if edge.radial == Some(l) {
                edge.radial = None;
            }
        }
    } else {
        mesh.loops.get_mut(rp)?.radial_next = rn;
        mesh.loops.get_mut(rn)?.radial_prev = rp;
        if let Ok(edge) = mesh.edges.get_mut(e) {
            if edge.radial == Some(l) {
                edge.radial = Some(rn);
            }
        }
    }
    let lp = mesh.loops.get_mut(l)?;
    lp.radial_next = l;
    lp.radial_prev = l;
    Ok(())
}

/// Links `prev -> next` in a boundary cycle (both directions).
pub(crate) fn boundary_link(mesh: &mut Mesh, prev: LoopKey, next: LoopKey) -> Result<()> {
    mesh.loops.get_mut(prev)?.next = next;
    mesh.loops.get_mut(next)?.prev = prev;
    Ok(())
}

/// Collects the loops of one boundary cycle, starting at `first`.
///
/// # Errors
///
/// Returns [`TopologyError::StructuralCorruption`] if the cycle visits
/// a dead loop or fails to close within [`MAX_CYCLE_LEN`] steps.
pub fn walk_boundary(mesh: &Mesh, first: LoopKey) -> Result<Vec<LoopKey>> {
    let mut cycle = Vec::new();
    let mut cur = first;
    loop {
        let Ok(lp) = mesh.loops.get(cur) else {
            return Err(TopologyError::StructuralCorruption(format!(
                "boundary cycle reached a dead loop after {} steps",
                cycle.len()
            ))
            .into());
        };
        cycle.push(cur);
        cur = lp.next;
        if cur == first {
            return Ok(cycle);
        }
        if cycle.len() >= MAX_CYCLE_LEN {
            return Err(TopologyError::StructuralCorruption(
                "boundary cycle does not close".into(),
            )
            .into());
        }
    }
}

/// Collects the loops of `e`'s radial cycle; empty for wire edges.
///
/// # Errors
///
/// Returns [`TopologyError::StructuralCorruption`] if the cycle visits
/// a dead loop or fails to close within [`MAX_CYCLE_LEN`] steps.
pub fn walk_radial(mesh: &Mesh, e: EdgeKey) -> Result<Vec<LoopKey>> {
    let Some(first) = mesh.edges.get(e)?.radial else {
        return Ok(Vec::new());
    };
    let mut cycle = Vec::new();
    let mut cur = first;
    loop {
        let Ok(lp) = mesh.loops.get(cur) else {
            return Err(TopologyError::StructuralCorruption(format!(
                "radial cycle reached a dead loop after {} steps",
                cycle.len()
            ))
            .into());
        };
        cycle.push(cur);
        cur = lp.radial_next;
        if cur == first {
            return Ok(cycle);
        }
        if cycle.len() >= MAX_CYCLE_LEN {
            return Err(TopologyError::StructuralCorruption(
                "radial cycle does not close".into(),
            )
            .into());
        }
    }
}
