//! Read-only views over the intrusive adjacency lists.
//!
//! Each view borrows the element arena and walks the circular links. The
//! lists are circular, so iteration is bounded by the stored length rather
//! than by a terminator.

use groundmath::collections::GenericVec;

use super::elements::{EdgeData, LoopData};
use super::{EdgeId, LoopId, VertexId};

/// View of the edges bounded by one vertex.
#[derive(Debug, Copy, Clone)]
pub struct VertexEdgeList<'m> {
    pub(super) edges: &'m GenericVec<EdgeId, EdgeData>,
    pub(super) vertex: VertexId,
    pub(super) head: Option<EdgeId>,
    pub(super) len: usize,
}

impl<'m> VertexEdgeList<'m> {
    /// Returns the number of edges in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vertex bounds no edges.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first edge in the list, if any.
    pub fn front(&self) -> Option<EdgeId> {
        self.head
    }

    /// Returns the last edge in the list, if any.
    pub fn back(&self) -> Option<EdgeId> {
        self.head.map(|head| {
            let side = self.edges[head].side(self.vertex);
            self.edges[head].vertex_prev[side]
        })
    }

    /// Iterates over the edges in the list.
    pub fn iter(&self) -> VertexEdgeIter<'m> {
        VertexEdgeIter {
            edges: self.edges,
            vertex: self.vertex,
            front: self.head,
            back: self.back(),
            remaining: self.len,
        }
    }
}

impl<'m> IntoIterator for VertexEdgeList<'m> {
    type Item = EdgeId;
    type IntoIter = VertexEdgeIter<'m>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the edges bounded by one vertex.
#[derive(Debug, Clone)]
pub struct VertexEdgeIter<'m> {
    edges: &'m GenericVec<EdgeId, EdgeData>,
    vertex: VertexId,
    front: Option<EdgeId>,
    back: Option<EdgeId>,
    remaining: usize,
}

impl Iterator for VertexEdgeIter<'_> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let e = self.front?;
        let side = self.edges[e].side(self.vertex);
        self.front = Some(self.edges[e].vertex_next[side]);
        Some(e)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for VertexEdgeIter<'_> {
    fn next_back(&mut self) -> Option<EdgeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let e = self.back?;
        let side = self.edges[e].side(self.vertex);
        self.back = Some(self.edges[e].vertex_prev[side]);
        Some(e)
    }
}

impl ExactSizeIterator for VertexEdgeIter<'_> {}

/// View of the loops using one edge (the radial list).
#[derive(Debug, Copy, Clone)]
pub struct EdgeLoopList<'m> {
    pub(super) loops: &'m GenericVec<LoopId, LoopData>,
    pub(super) head: Option<LoopId>,
    pub(super) len: usize,
}

impl<'m> EdgeLoopList<'m> {
    /// Returns the number of loops using the edge.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no face uses the edge.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first loop in the list, if any.
    pub fn front(&self) -> Option<LoopId> {
        self.head
    }

    /// Returns the last loop in the list, if any.
    pub fn back(&self) -> Option<LoopId> {
        self.head.map(|head| self.loops[head].edge_prev)
    }

    /// Iterates over the loops in the list.
    pub fn iter(&self) -> LoopIter<'m> {
        LoopIter {
            loops: self.loops,
            next_of: |l| l.edge_next,
            prev_of: |l| l.edge_prev,
            front: self.head,
            back: self.back(),
            remaining: self.len,
        }
    }
}

impl<'m> IntoIterator for EdgeLoopList<'m> {
    type Item = LoopId;
    type IntoIter = LoopIter<'m>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// View of the loops bounding one face, in winding order.
#[derive(Debug, Copy, Clone)]
pub struct FaceLoopList<'m> {
    pub(super) loops: &'m GenericVec<LoopId, LoopData>,
    pub(super) head: Option<LoopId>,
    pub(super) len: usize,
}

impl<'m> FaceLoopList<'m> {
    /// Returns the number of loops bounding the face.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the face has no loops.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first loop in the winding, if any.
    pub fn front(&self) -> Option<LoopId> {
        self.head
    }

    /// Returns the last loop in the winding, if any.
    pub fn back(&self) -> Option<LoopId> {
        self.head.map(|head| self.loops[head].face_prev)
    }

    /// Iterates over the loops in winding order.
    pub fn iter(&self) -> LoopIter<'m> {
        LoopIter {
            loops: self.loops,
            next_of: |l| l.face_next,
            prev_of: |l| l.face_prev,
            front: self.head,
            back: self.back(),
            remaining: self.len,
        }
    }
}

impl<'m> IntoIterator for FaceLoopList<'m> {
    type Item = LoopId;
    type IntoIter = LoopIter<'m>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a circular list of loops.
#[derive(Debug, Clone)]
pub struct LoopIter<'m> {
    loops: &'m GenericVec<LoopId, LoopData>,
    next_of: fn(&LoopData) -> LoopId,
    prev_of: fn(&LoopData) -> LoopId,
    front: Option<LoopId>,
    back: Option<LoopId>,
    remaining: usize,
}

impl Iterator for LoopIter<'_> {
    type Item = LoopId;

    fn next(&mut self) -> Option<LoopId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let l = self.front?;
        self.front = Some((self.next_of)(&self.loops[l]));
        Some(l)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for LoopIter<'_> {
    fn next_back(&mut self) -> Option<LoopId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let l = self.back?;
        self.back = Some((self.prev_of)(&self.loops[l]));
        Some(l)
    }
}

impl ExactSizeIterator for LoopIter<'_> {}
