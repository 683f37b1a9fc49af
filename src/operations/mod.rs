//! Euler operators over the mesh.
//!
//! Every structural change goes through one of these operators; each is
//! a small struct configured by its constructor and applied with
//! `execute`. Operators either succeed, fail with an error before
//! mutating anything, or (for the best-effort ones) report
//! [`Outcome::NoOp`] and leave the mesh untouched.

pub mod creation;
pub mod modification;
pub mod query;
pub mod removal;

pub use creation::{MakeEdge, MakeFace, MakeVertex};
pub use modification::{
    CollapseEdge, ConnectVertices, DissolveEdge, DissolveVertex, EdgeEnd, JoinEdges, ReverseFace,
    RotateEdge, Rotation, SplitEdge, SplitFace,
};
pub use query::{Counts, Issue, IssueKind, MeshCounts, Severity, ValidateMesh, ValidationReport};
pub use removal::{KillEdge, KillFace, KillVertex, PruneWire};

/// Result of a best-effort operator.
///
/// Some operators refuse configurations they cannot handle instead of
/// failing; a refusal is not an error, and the mesh is guaranteed to be
/// unchanged by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation ran; carries its result.
    Done(T),
    /// The operation declined to run; the mesh was not touched.
    NoOp,
}

impl<T> Outcome<T> {
    /// Returns `true` if the operation declined to run.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Outcome::NoOp)
    }

    /// The result, or `None` for a declined operation.
    #[must_use]
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::NoOp => None,
        }
    }
}
