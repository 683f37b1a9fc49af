use std::collections::HashSet;

use crate::error::{Result, ValidationError};
use crate::topology::cycles::{disk_attach, radial_attach};
use crate::topology::{
    Boundary, EdgeKey, ElemId, FaceKey, LoopKey, Mesh, MeshFeatures, VertKey, MAX_CYCLE_LEN,
};

/// How bad a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Suspicious but structurally sound (non-manifold edges, stale
    /// caches).
    Warning,
    /// A broken invariant; operators may misbehave until repaired.
    Error,
}

/// Which invariant a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Vertex disk against edge endpoints.
    DiskCycle,
    /// Face boundary loop cycles.
    BoundaryCycle,
    /// A corner against the edge it claims to run along.
    LoopEdge,
    /// Edge radial cycle against the corners using the edge.
    RadialCycle,
    /// More than two faces share an edge.
    NonManifold,
    /// The mesh splits into several connected components.
    Shells,
}

/// One validation finding.
#[derive(Debug, Clone)]
pub struct Issue {
    /// The violated invariant family.
    pub kind: IssueKind,
    /// Id of the element the finding is anchored to.
    pub elem: ElemId,
    /// Severity of the finding.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// `true` if a repair pass fixed it.
    pub repaired: bool,
}

/// Everything a validation run found.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// All findings, in pass order.
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Returns `true` if no error-severity finding is left unrepaired.
    #[must_use]
    pub fn ok(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity == Severity::Error && !i.repaired)
    }

    /// Returns `true` if nothing at all was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    fn push(
        &mut self,
        kind: IssueKind,
        elem: ElemId,
        severity: Severity,
        message: impl Into<String>,
        repaired: bool,
    ) {
        self.issues.push(Issue {
            kind,
            elem,
            severity,
            message: message.into(),
            repaired,
        });
    }
}

/// Checks every structural invariant of a mesh, optionally repairing
/// what can be fixed in place.
///
/// Passes run in dependency order: disks, boundaries, corner edges,
/// radial cycles, manifoldness, and (when the mesh requires it)
/// connectivity. Repairs never invent topology; they re-derive redundant
/// links from the surviving side and excise duplicate corners.
pub struct ValidateMesh {
    repair: bool,
}

impl ValidateMesh {
    /// Creates a new `ValidateMesh` operation without repair.
    #[must_use]
    pub fn new() -> Self {
        Self { repair: false }
    }

    /// Enables or disables in-place repair.
    #[must_use]
    pub fn repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    /// Validates a copy of the mesh, leaving the original untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal failure; findings are in the
    /// report.
    pub fn check(mesh: &Mesh) -> Result<ValidationReport> {
        Self::new().execute(&mut mesh.copy())
    }

    /// Executes the validation, returning the full report.
    ///
    /// # Errors
    ///
    /// With repair enabled, returns [`ValidationError::Unrepairable`]
    /// if an error-severity finding could not be fixed; repairs already
    /// applied are kept.
    pub fn execute(&self, mesh: &mut Mesh) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        self.check_disks(mesh, &mut report);
        self.check_boundaries(mesh, &mut report);
        self.check_corner_edges(mesh, &mut report);
        self.check_radials(mesh, &mut report);
        check_manifold(mesh, &mut report);
        if mesh.features().contains(MeshFeatures::SINGLE_SHELL) {
            check_shells(mesh, &mut report);
        }
        if self.repair {
            if let Some(unfixed) = report
                .issues
                .iter()
                .find(|i| i.severity == Severity::Error && !i.repaired)
            {
                return Err(ValidationError::Unrepairable(unfixed.message.clone()).into());
            }
        }
        Ok(report)
    }

    /// Vertex disks and edge endpoints must agree.
    fn check_disks(&self, mesh: &mut Mesh, report: &mut ValidationReport) {
        let vert_keys: Vec<VertKey> = mesh.verts.iter().map(|(k, _)| k).collect();
        for v in vert_keys {
            let Ok(vert) = mesh.verts.get(v) else { continue };
            let vid = vert.id;
            let disk = vert.edges.clone();
            let mut keep: Vec<EdgeKey> = Vec::new();
            let mut changed = false;
            for e in disk {
                if !mesh.edges.get(e).is_ok_and(|edge| edge.uses(v)) {
                    report.push(
                        IssueKind::DiskCycle,
                        vid,
                        Severity::Error,
                        format!("disk of vertex {vid} holds an edge that is dead or does not use it"),
                        self.repair,
                    );
                    changed = true;
                } else if keep.contains(&e) {
                    report.push(
                        IssueKind::DiskCycle,
                        vid,
                        Severity::Error,
                        format!("disk of vertex {vid} holds a duplicate edge entry"),
                        self.repair,
                    );
                    changed = true;
                } else {
                    keep.push(e);
                }
            }
            if self.repair && changed {
                if let Ok(vert) = mesh.verts.get_mut(v) {
                    vert.edges = keep;
                }
            }
        }

        let edge_info: Vec<(EdgeKey, ElemId, VertKey, VertKey)> = mesh
            .edges
            .iter()
            .map(|(k, e)| (k, e.id, e.v1, e.v2))
            .collect();
        for (e, eid, v1, v2) in edge_info {
            for v in [v1, v2] {
                match mesh.verts.get(v).map(|vert| vert.edges.contains(&e)) {
                    Err(_) => report.push(
                        IssueKind::DiskCycle,
                        eid,
                        Severity::Error,
                        format!("edge {eid} references a dead vertex"),
                        false,
                    ),
                    Ok(true) => {}
                    Ok(false) => {
                        report.push(
                            IssueKind::DiskCycle,
                            eid,
                            Severity::Error,
                            format!("a disk is missing its entry for edge {eid}"),
                            self.repair,
                        );
                        if self.repair {
                            let _ = disk_attach(mesh, e, v);
                        }
                    }
                }
            }
        }
    }

    /// Face boundary cycles must close, agree in both directions, and
    /// name their owner.
    #[allow(clippy::too_many_lines)]
    fn check_boundaries(&self, mesh: &mut Mesh, report: &mut ValidationReport) {
        let face_keys: Vec<FaceKey> = mesh.faces.iter().map(|(k, _)| k).collect();
        for f in face_keys {
            let Ok(face) = mesh.faces.get(f) else { continue };
            let fid = face.id;
            let boundaries = face.boundaries.clone();
            let mut kept: Vec<Boundary> = Vec::new();
            let mut changed = false;
            for b in boundaries {
                if !mesh.loops.contains(b.first) {
                    if b.len == 0 {
                        // An emptied boundary record; droppable
                        report.push(
                            IssueKind::BoundaryCycle,
                            fid,
                            Severity::Error,
                            format!("face {fid} keeps an emptied boundary record"),
                            self.repair,
                        );
                        if self.repair {
                            changed = true;
                        } else {
                            kept.push(b);
                        }
                    } else {
                        report.push(
                            IssueKind::BoundaryCycle,
                            fid,
                            Severity::Error,
                            format!("boundary entry loop of face {fid} is dead"),
                            false,
                        );
                        kept.push(b);
                    }
                    continue;
                }

                let Some(cycle) = bounded_cycle(mesh, b.first) else {
                    report.push(
                        IssueKind::BoundaryCycle,
                        fid,
                        Severity::Error,
                        format!("a boundary cycle of face {fid} does not close"),
                        false,
                    );
                    kept.push(b);
                    continue;
                };

                for i in 0..cycle.len() {
                    let l = cycle[i];
                    let next = cycle[(i + 1) % cycle.len()];
                    if mesh.loops.get(next).ok().map(|lp| lp.prev) != Some(l) {
                        let lid = loop_id(mesh, next);
                        report.push(
                            IssueKind::BoundaryCycle,
                            lid,
                            Severity::Error,
                            format!("prev link of loop {lid} disagrees with its neighbor"),
                            self.repair,
                        );
                        if self.repair {
                            if let Ok(lp) = mesh.loops.get_mut(next) {
                                lp.prev = l;
                            }
                        }
                    }
                    if mesh.loops.get(l).ok().map(|lp| lp.face) != Some(f) {
                        let lid = loop_id(mesh, l);
                        report.push(
                            IssueKind::BoundaryCycle,
                            lid,
                            Severity::Error,
                            format!("loop {lid} does not name its owning face"),
                            self.repair,
                        );
                        if self.repair {
                            if let Ok(lp) = mesh.loops.get_mut(l) {
                                lp.face = f;
                            }
                        }
                    }
                }

                // Duplicate corner vertices; repair excises the later one
                let mut survivors = cycle.clone();
                let mut seen: Vec<VertKey> = Vec::new();
                let mut excised = false;
                for l in cycle {
                    let Some(vert) = mesh.loops.get(l).ok().map(|lp| lp.vert) else {
                        continue;
                    };
                    if seen.contains(&vert) {
                        report.push(
                            IssueKind::BoundaryCycle,
                            fid,
                            Severity::Error,
                            format!("a boundary of face {fid} visits a vertex twice"),
                            self.repair,
                        );
                        if self.repair {
                            excise(mesh, l);
                            survivors.retain(|&s| s != l);
                            excised = true;
                        }
                    } else {
                        seen.push(vert);
                    }
                }
                if excised && survivors.len() < 3 {
                    report.push(
                        IssueKind::BoundaryCycle,
                        fid,
                        Severity::Error,
                        format!("a boundary of face {fid} degenerated below three corners"),
                        false,
                    );
                }
                let first = if survivors.contains(&b.first) {
                    b.first
                } else {
                    survivors.first().copied().unwrap_or(b.first)
                };
                if b.len != survivors.len() {
                    if !excised {
                        report.push(
                            IssueKind::BoundaryCycle,
                            fid,
                            Severity::Warning,
                            format!("cached boundary length of face {fid} is stale"),
                            self.repair,
                        );
                    }
                    changed = true;
                }
                if first != b.first {
                    changed = true;
                }
                kept.push(if self.repair {
                    Boundary {
                        first,
                        len: survivors.len(),
                    }
                } else {
                    b
                });
            }
            if self.repair && changed {
                if let Ok(face) = mesh.faces.get_mut(f) {
                    face.boundaries = kept;
                }
            }
        }
    }

    /// Each corner must run along a live edge connecting it to the next
    /// corner.
    fn check_corner_edges(&self, mesh: &mut Mesh, report: &mut ValidationReport) {
        let loop_keys: Vec<LoopKey> = mesh.loops.iter().map(|(k, _)| k).collect();
        for l in loop_keys {
            let Ok(lp) = mesh.loops.get(l) else { continue };
            let (lid, lv, le, ln) = (lp.id, lp.vert, lp.edge, lp.next);
            let Some(nv) = mesh.loops.get(ln).ok().map(|x| x.vert) else {
                continue; // broken cycle, reported by the boundary pass
            };
            let consistent = lv != nv
                && mesh
                    .edges
                    .get(le)
                    .is_ok_and(|edge| edge.uses(lv) && edge.uses(nv));
            if consistent {
                continue;
            }
            if let Some(replacement) = mesh.find_edge(lv, nv) {
                report.push(
                    IssueKind::LoopEdge,
                    lid,
                    Severity::Error,
                    format!("loop {lid} does not run along the edge between its vertices"),
                    self.repair,
                );
                if self.repair {
                    if let Ok(lp) = mesh.loops.get_mut(l) {
                        lp.edge = replacement;
                    }
                }
            } else {
                report.push(
                    IssueKind::LoopEdge,
                    lid,
                    Severity::Error,
                    format!("no live edge connects loop {lid} to the next corner"),
                    false,
                );
            }
        }
    }

    /// Each radial cycle must contain exactly the live corners that
    /// name the edge.
    fn check_radials(&self, mesh: &mut Mesh, report: &mut ValidationReport) {
        let edge_keys: Vec<EdgeKey> = mesh.edges.iter().map(|(k, _)| k).collect();
        for e in edge_keys {
            let Ok(edge) = mesh.edges.get(e) else { continue };
            let eid = edge.id;
            let entry = edge.radial;
            let expected: Vec<LoopKey> = mesh
                .loops
                .iter()
                .filter(|(_, lp)| lp.edge == e)
                .map(|(k, _)| k)
                .collect();
            let expected_set: HashSet<LoopKey> = expected.iter().copied().collect();

            let actual = entry.and_then(|first| bounded_radial(mesh, first));
            let agrees = match (&actual, expected_set.is_empty()) {
                (None, true) => entry.is_none(),
                (Some(walked), _) => {
                    walked.len() == expected_set.len()
                        && walked.iter().all(|l| expected_set.contains(l))
                }
                (None, false) => false,
            };
            if agrees {
                continue;
            }
            report.push(
                IssueKind::RadialCycle,
                eid,
                Severity::Error,
                format!("radial cycle of edge {eid} disagrees with the corners naming it"),
                self.repair,
            );
            if self.repair {
                if let Ok(edge) = mesh.edges.get_mut(e) {
                    edge.radial = None;
                }
                for l in expected {
                    if let Ok(lp) = mesh.loops.get_mut(l) {
                        lp.radial_next = l;
                        lp.radial_prev = l;
                    }
                    let _ = radial_attach(mesh, l, e);
                }
            }
        }
    }
}

impl Default for ValidateMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Edges shared by more than two faces are flagged, never repaired.
fn check_manifold(mesh: &Mesh, report: &mut ValidationReport) {
    for (e, edge) in mesh.edges.iter() {
        let users = mesh.loops.iter().filter(|(_, lp)| lp.edge == e).count();
        if users > 2 {
            report.push(
                IssueKind::NonManifold,
                edge.id,
                Severity::Warning,
                format!("edge {} is shared by {users} faces", edge.id),
                false,
            );
        }
    }
}

/// A single-shell mesh must be one connected component.
fn check_shells(mesh: &Mesh, report: &mut ValidationReport) {
    let mut visited: HashSet<VertKey> = HashSet::new();
    let mut components = 0;
    for (start, _) in mesh.verts.iter() {
        if visited.contains(&start) {
            continue;
        }
        components += 1;
        let mut queue = vec![start];
        visited.insert(start);
        while let Some(v) = queue.pop() {
            let Ok(vert) = mesh.verts.get(v) else { continue };
            for &e in &vert.edges {
                let Ok(edge) = mesh.edges.get(e) else { continue };
                let Some(other) = edge.other_end(v) else { continue };
                if visited.insert(other) {
                    queue.push(other);
                }
            }
        }
    }
    if components > 1 {
        report.push(
            IssueKind::Shells,
            ElemId(0),
            Severity::Error,
            format!("mesh splits into {components} shells"),
            false,
        );
    }
}

/// Walks a boundary cycle, tolerating corruption; `None` if it does not
/// close cleanly.
fn bounded_cycle(mesh: &Mesh, first: LoopKey) -> Option<Vec<LoopKey>> {
    let mut cycle = Vec::new();
    let mut visited = HashSet::new();
    let mut cur = first;
    while cycle.len() < MAX_CYCLE_LEN {
        let lp = mesh.loops.get(cur).ok()?;
        cycle.push(cur);
        visited.insert(cur);
        cur = lp.next;
        if cur == first {
            return Some(cycle);
        }
        if visited.contains(&cur) {
            return None;
        }
    }
    None
}

/// Walks a radial cycle, tolerating corruption.
fn bounded_radial(mesh: &Mesh, first: LoopKey) -> Option<Vec<LoopKey>> {
    let mut cycle = Vec::new();
    let mut visited = HashSet::new();
    let mut cur = first;
    while cycle.len() < MAX_CYCLE_LEN {
        let lp = mesh.loops.get(cur).ok()?;
        cycle.push(cur);
        visited.insert(cur);
        cur = lp.radial_next;
        if cur == first {
            return Some(cycle);
        }
        if visited.contains(&cur) {
            return None;
        }
    }
    None
}

/// Cuts a duplicate corner out of its cycle during repair.
fn excise(mesh: &mut Mesh, l: LoopKey) {
    let Ok(lp) = mesh.loops.get(l) else { return };
    let (prev, next) = (lp.prev, lp.next);
    if let Ok(p) = mesh.loops.get_mut(prev) {
        p.next = next;
    }
    if let Ok(n) = mesh.loops.get_mut(next) {
        n.prev = prev;
    }
    let _ = crate::topology::cycles::radial_detach(mesh, l);
    mesh.free_loop(l);
}

fn loop_id(mesh: &Mesh, l: LoopKey) -> ElemId {
    mesh.loops.get(l).map_or(ElemId(0), |lp| lp.id)
}
