mod kill_edge;
mod kill_face;
mod kill_vertex;
mod prune_wire;

pub use kill_edge::KillEdge;
pub use kill_face::KillFace;
pub use kill_vertex::KillVertex;
pub use prune_wire::PruneWire;
