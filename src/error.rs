use thiserror::Error;

use crate::topology::elem::{ElemId, ElemKind};

/// Top-level error type for the Polykern mesh kernel.
#[derive(Debug, Error)]
pub enum PolykernError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Errors raised by the topology stores and cycle walkers.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The referenced element is dead or was never part of this mesh.
    #[error("{0} not found (dead or foreign key)")]
    EntityNotFound(ElemKind),

    /// An internal linkage invariant was found violated mid-operation.
    ///
    /// This is a kernel defect or the result of concurrent misuse; the
    /// current operation aborts and may leave partial state. Running the
    /// validator with repair enabled is the recovery path.
    #[error("structural corruption: {0}")]
    StructuralCorruption(String),
}

/// Errors raised by Euler operators on malformed arguments.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation is disabled by the mesh's feature flags.
    #[error("unsupported operation: {0} is disabled by the mesh features")]
    Unsupported(&'static str),

    /// Operator arguments describe degenerate topology (coincident
    /// vertices, too few vertices, a zero-extent split).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Operator arguments are structurally invalid for the target mesh.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested face or hole boundary repeats a vertex.
    #[error("duplicate vertex {0} in boundary input")]
    DuplicateVertex(ElemId),
}

/// Errors reported by the consistency validator.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A violation was found that cannot be repaired without deleting
    /// user data; repairs applied to other elements are kept.
    #[error("unrepairable mesh: {0}")]
    Unrepairable(String),
}

/// Errors raised while capturing or restoring a mesh snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A record references an element id that does not exist in the
    /// snapshot's own element arrays.
    #[error("unresolved {kind} reference: id {id}")]
    UnresolvedRef { kind: ElemKind, id: ElemId },

    /// Two records of the same kind carry the same id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: ElemKind, id: ElemId },

    /// A stored custom-data block does not match its layer layout.
    #[error("custom-data layer mismatch: {0}")]
    LayerMismatch(String),

    /// The snapshot's arrays are internally inconsistent (open boundary,
    /// id generator state out of sync with the element ids, ...).
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// Convenience type alias for results using [`PolykernError`].
pub type Result<T> = std::result::Result<T, PolykernError>;
