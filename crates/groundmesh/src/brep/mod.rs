//! Boundary-representation mesh kernel.
//!
//! A mesh is four index-addressed arenas (vertices, edges, loops, faces)
//! whose adjacency is stored in intrusive circular doubly-linked lists. A
//! *loop* is one directed use of an edge by a face; an edge's *radial list*
//! collects every loop that uses it, so an edge with exactly one loop lies on
//! the mesh boundary.

use groundmath::idx_struct;

mod attribute;
mod attribute_map;
mod elements;
mod list;
mod mesh;

pub use attribute::{AttributeData, AttributeError, AttributeValue};
pub use attribute_map::AttributeMap;
pub use list::{EdgeLoopList, FaceLoopList, LoopIter, VertexEdgeIter, VertexEdgeList};
pub use mesh::{ElementContainer, Mesh};

idx_struct! {
    /// ID of a vertex in a mesh.
    pub struct VertexId(pub u32);
    /// ID of an edge in a mesh.
    pub struct EdgeId(pub u32);
    /// ID of a loop in a mesh.
    pub struct LoopId(pub u32);
    /// ID of a face in a mesh.
    pub struct FaceId(pub u32);
}
