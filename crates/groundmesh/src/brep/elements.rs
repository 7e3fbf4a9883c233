//! Internal per-element topology records.
//!
//! Adjacency is stored as intrusive circular doubly-linked lists: the links
//! live inside the element records themselves, and each list owner keeps only
//! a head index and a length.

use super::{EdgeId, FaceId, LoopId, VertexId};

/// Head of an intrusive circular list.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ListHead<I> {
    /// First element of the list, or `None` if the list is empty.
    pub head: Option<I>,
    /// Number of elements in the list.
    pub len: usize,
}

/// Topology record of a vertex.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct VertexData {
    /// Edges bounded by this vertex.
    pub edges: ListHead<EdgeId>,
}

/// Topology record of an edge.
///
/// An edge participates in one list per endpoint; the links for endpoint
/// `vertices[i]` are `vertex_next[i]` and `vertex_prev[i]`. [`Self::side`]
/// selects the right pair given a vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct EdgeData {
    /// Endpoints of the edge. The two endpoints are always distinct.
    pub vertices: [VertexId; 2],
    /// Next edge in each endpoint's edge list.
    pub vertex_next: [EdgeId; 2],
    /// Previous edge in each endpoint's edge list.
    pub vertex_prev: [EdgeId; 2],
    /// Loops using this edge (the radial list).
    pub loops: ListHead<LoopId>,
}

impl EdgeData {
    /// Returns the link index for the endpoint `v` (0 or 1).
    pub fn side(&self, v: VertexId) -> usize {
        (self.vertices[1] == v) as usize
    }
}

/// Topology record of a loop: one directed use of an edge by a face.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct LoopData {
    /// Vertex at which this loop originates.
    pub vertex: VertexId,
    /// Edge this loop runs along.
    pub edge: EdgeId,
    /// Face this loop bounds.
    pub face: FaceId,
    /// Next loop in the edge's radial list.
    pub edge_next: LoopId,
    /// Previous loop in the edge's radial list.
    pub edge_prev: LoopId,
    /// Next loop around the face.
    pub face_next: LoopId,
    /// Previous loop around the face.
    pub face_prev: LoopId,
}

/// Topology record of a face.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct FaceData {
    /// Loops bounding this face, in winding order.
    pub loops: ListHead<LoopId>,
}
