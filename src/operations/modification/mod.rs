mod collapse_edge;
mod connect_vertices;
mod dissolve_edge;
mod dissolve_vertex;
mod join_edges;
mod reverse_face;
mod rotate_edge;
mod split_edge;
mod split_face;

pub use collapse_edge::{CollapseEdge, EdgeEnd};
pub use connect_vertices::ConnectVertices;
pub use dissolve_edge::DissolveEdge;
pub use dissolve_vertex::DissolveVertex;
pub use join_edges::JoinEdges;
pub use reverse_face::ReverseFace;
pub use rotate_edge::{RotateEdge, Rotation};
pub use split_edge::SplitEdge;
pub use split_face::SplitFace;
