mod counts;
mod validate;

pub use counts::{Counts, MeshCounts};
pub use validate::{Issue, IssueKind, Severity, ValidateMesh, ValidationReport};
