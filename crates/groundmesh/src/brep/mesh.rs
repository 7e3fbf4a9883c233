//! Mesh element storage and topology editing.

use eyre::{Result, ensure};
use groundmath::collections::{GenericVec, IndexIter, IndexNewtype, IndexOverflow};
use itertools::Itertools;
use smallvec::SmallVec;

use super::attribute_map::AttributeMap;
use super::elements::{EdgeData, FaceData, ListHead, LoopData, VertexData};
use super::list::{EdgeLoopList, FaceLoopList, VertexEdgeList};
use super::{EdgeId, FaceId, LoopId, VertexId};

/// Arena of one element class plus its attribute arrays.
///
/// Elements are stored contiguously and addressed by index. Removal swaps the
/// last element into the vacated slot, so the removed index is immediately
/// reused and all other indices stay stable. The attribute arrays are kept in
/// lock step with the element arena.
#[derive(Debug, Clone)]
pub struct ElementContainer<I, E> {
    pub(crate) elements: GenericVec<I, E>,
    attributes: AttributeMap,
}

impl<I, E> Default for ElementContainer<I, E> {
    fn default() -> Self {
        Self {
            elements: GenericVec::default(),
            attributes: AttributeMap::default(),
        }
    }
}

impl<I: IndexNewtype, E> ElementContainer<I, E> {
    /// Returns the number of elements in the container.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the IDs of all elements.
    pub fn ids(&self) -> IndexIter<I> {
        self.elements.iter_keys()
    }

    /// Returns `true` if `id` refers to an element in the container.
    pub fn contains(&self, id: I) -> bool {
        self.elements.contains_idx(id)
    }

    /// Returns the attributes of this element class.
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Returns the mutable attributes of this element class.
    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Adds an element, extending every attribute array with a default value.
    pub(crate) fn push(&mut self, element: E) -> Result<I, IndexOverflow> {
        let id = self.elements.push(element)?;
        self.attributes.push_default_all();
        Ok(id)
    }

    /// Removes the element at `id` by swapping the last element into its
    /// slot, in the element arena and in every attribute array.
    pub(crate) fn swap_remove(&mut self, id: I) -> E {
        self.attributes.swap_remove_all(id.to_usize());
        self.elements
            .swap_remove(id)
            .unwrap_or_else(|_| unreachable!("{} out of range", I::TYPE_NAME))
    }

    /// Removes all elements, keeping attributes registered but empty.
    pub(crate) fn clear(&mut self) {
        self.elements.clear();
        self.attributes.clear_elements();
    }
}

/// Boundary-representation mesh.
///
/// Stores vertices, edges, loops, and faces in index-addressed arenas, with
/// adjacency kept in intrusive circular lists:
///
/// - each vertex lists the edges it bounds;
/// - each edge lists the loops that use it (its radial list);
/// - each face lists its loops in winding order.
///
/// Loops are created and destroyed only as part of faces.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    pub(crate) vertices: ElementContainer<VertexId, VertexData>,
    pub(crate) edges: ElementContainer<EdgeId, EdgeData>,
    pub(crate) loops: ElementContainer<LoopId, LoopData>,
    pub(crate) faces: ElementContainer<FaceId, FaceData>,
}

impl Mesh {
    /// Constructs an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the vertex container.
    pub fn vertices(&self) -> &ElementContainer<VertexId, VertexData> {
        &self.vertices
    }
    /// Returns the mutable vertex container.
    pub fn vertices_mut(&mut self) -> &mut ElementContainer<VertexId, VertexData> {
        &mut self.vertices
    }
    /// Returns the edge container.
    pub fn edges(&self) -> &ElementContainer<EdgeId, EdgeData> {
        &self.edges
    }
    /// Returns the mutable edge container.
    pub fn edges_mut(&mut self) -> &mut ElementContainer<EdgeId, EdgeData> {
        &mut self.edges
    }
    /// Returns the loop container.
    pub fn loops(&self) -> &ElementContainer<LoopId, LoopData> {
        &self.loops
    }
    /// Returns the mutable loop container.
    pub fn loops_mut(&mut self) -> &mut ElementContainer<LoopId, LoopData> {
        &mut self.loops
    }
    /// Returns the face container.
    pub fn faces(&self) -> &ElementContainer<FaceId, FaceData> {
        &self.faces
    }
    /// Returns the mutable face container.
    pub fn faces_mut(&mut self) -> &mut ElementContainer<FaceId, FaceData> {
        &mut self.faces
    }

    /// Returns the two endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        self.edges.elements[e].vertices
    }
    /// Returns the vertex at which a loop originates.
    pub fn loop_vertex(&self, l: LoopId) -> VertexId {
        self.loops.elements[l].vertex
    }
    /// Returns the edge a loop runs along.
    pub fn loop_edge(&self, l: LoopId) -> EdgeId {
        self.loops.elements[l].edge
    }
    /// Returns the face a loop bounds.
    pub fn loop_face(&self, l: LoopId) -> FaceId {
        self.loops.elements[l].face
    }
    /// Returns the next loop around the face.
    pub fn loop_next(&self, l: LoopId) -> LoopId {
        self.loops.elements[l].face_next
    }
    /// Returns the previous loop around the face.
    pub fn loop_prev(&self, l: LoopId) -> LoopId {
        self.loops.elements[l].face_prev
    }

    /// Returns a view of the edges bounded by `v`.
    pub fn vertex_edges(&self, v: VertexId) -> VertexEdgeList<'_> {
        let list = self.vertices.elements[v].edges;
        VertexEdgeList {
            edges: &self.edges.elements,
            vertex: v,
            head: list.head,
            len: list.len,
        }
    }

    /// Returns a view of the loops using `e` (its radial list).
    pub fn edge_loops(&self, e: EdgeId) -> EdgeLoopList<'_> {
        let list = self.edges.elements[e].loops;
        EdgeLoopList {
            loops: &self.loops.elements,
            head: list.head,
            len: list.len,
        }
    }

    /// Returns a view of the loops bounding `f`, in winding order.
    pub fn face_loops(&self, f: FaceId) -> FaceLoopList<'_> {
        let list = self.faces.elements[f].loops;
        FaceLoopList {
            loops: &self.loops.elements,
            head: list.head,
            len: list.len,
        }
    }

    /// Returns `true` if exactly one face uses `e`.
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        self.edges.elements[e].loops.len == 1
    }

    /// Returns the edge connecting `a` and `b` in either direction, if any.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertex_edges(a).iter().find(|&e| {
            let [x, y] = self.edges.elements[e].vertices;
            (x, y) == (a, b) || (x, y) == (b, a)
        })
    }

    /// Adds an isolated vertex and returns its ID.
    pub fn add_vertex(&mut self) -> Result<VertexId> {
        Ok(self.vertices.push(VertexData::default())?)
    }

    /// Adds an edge between two distinct existing vertices and returns its
    /// ID. Does not check for duplicate edges; use [`Self::find_edge`] first
    /// if duplicates matter.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        ensure!(a != b, "edge endpoints must be distinct, got {a} twice");
        ensure!(self.vertices.contains(a), "no such vertex: {a}");
        ensure!(self.vertices.contains(b), "no such vertex: {b}");
        let e = self.edges.push(EdgeData {
            vertices: [a, b],
            vertex_next: [EdgeId::default(); 2],
            vertex_prev: [EdgeId::default(); 2],
            loops: ListHead::default(),
        })?;
        self.vertex_edge_push_back(a, e);
        self.vertex_edge_push_back(b, e);
        Ok(e)
    }

    /// Adds a face bounded by `vertices`, in winding order, and returns its
    /// ID. Missing edges between consecutive vertices are created on the fly;
    /// existing edges are shared regardless of direction.
    pub fn add_face(&mut self, vertices: &[VertexId]) -> Result<FaceId> {
        ensure!(
            vertices.len() >= 3,
            "face requires at least 3 vertices, got {}",
            vertices.len(),
        );
        for &v in vertices {
            ensure!(self.vertices.contains(v), "no such vertex: {v}");
        }

        let mut face_edges: SmallVec<[EdgeId; 4]> = SmallVec::with_capacity(vertices.len());
        for (a, b) in vertices.iter().copied().circular_tuple_windows() {
            let e = match self.find_edge(a, b) {
                Some(e) => e,
                None => self.add_edge(a, b)?,
            };
            face_edges.push(e);
        }

        let f = self.faces.push(FaceData::default())?;
        let mut face_loops: SmallVec<[LoopId; 4]> = SmallVec::with_capacity(vertices.len());
        for (&v, &e) in std::iter::zip(vertices, &face_edges) {
            // Face links are placeholders until the whole winding exists.
            let l = self.loops.push(LoopData {
                vertex: v,
                edge: e,
                face: f,
                edge_next: LoopId::default(),
                edge_prev: LoopId::default(),
                face_next: LoopId::default(),
                face_prev: LoopId::default(),
            })?;
            self.edge_loop_push_back(e, l);
            face_loops.push(l);
        }
        let n = face_loops.len();
        for i in 0..n {
            let l = face_loops[i];
            self.loops.elements[l].face_next = face_loops[(i + 1) % n];
            self.loops.elements[l].face_prev = face_loops[(i + n - 1) % n];
        }
        self.faces.elements[f].loops = ListHead {
            head: Some(face_loops[0]),
            len: n,
        };
        Ok(f)
    }

    /// Removes a face and its loops. The face's vertices and edges are left
    /// in place.
    pub fn remove_face(&mut self, f: FaceId) -> Result<()> {
        ensure!(self.faces.contains(f), "no such face: {f}");
        while let Some(l) = self.faces.elements[f].loops.head {
            let e = self.loops.elements[l].edge;
            self.edge_loop_remove(e, l);
            // Unlink from the face winding.
            let next = self.loops.elements[l].face_next;
            let prev = self.loops.elements[l].face_prev;
            let list = &mut self.faces.elements[f].loops;
            if list.len == 1 {
                list.head = None;
            } else {
                list.head = Some(next);
                self.loops.elements[prev].face_next = next;
                self.loops.elements[next].face_prev = prev;
            }
            self.faces.elements[f].loops.len -= 1;
            self.erase_loop(l);
        }
        self.erase_face(f);
        Ok(())
    }

    /// Removes an edge, cascading to every face that uses it.
    pub fn remove_edge(&mut self, e: EdgeId) -> Result<()> {
        ensure!(self.edges.contains(e), "no such edge: {e}");
        while let Some(l) = self.edges.elements[e].loops.head {
            let f = self.loops.elements[l].face;
            self.remove_face(f)?;
        }
        let [a, b] = self.edges.elements[e].vertices;
        self.vertex_edge_remove(a, e);
        self.vertex_edge_remove(b, e);
        self.erase_edge(e);
        Ok(())
    }

    /// Removes a vertex, cascading to every incident edge and every face
    /// using those edges.
    pub fn remove_vertex(&mut self, v: VertexId) -> Result<()> {
        ensure!(self.vertices.contains(v), "no such vertex: {v}");
        while let Some(e) = self.vertices.elements[v].edges.head {
            self.remove_edge(e)?;
        }
        self.erase_vertex(v);
        Ok(())
    }

    /// Removes all elements. Attributes stay registered but empty.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.loops.clear();
        self.faces.clear();
    }

    /// Appends `e` to the edge list of its endpoint `v`.
    fn vertex_edge_push_back(&mut self, v: VertexId, e: EdgeId) {
        let side_e = self.edges.elements[e].side(v);
        match self.vertices.elements[v].edges.head {
            None => {
                self.edges.elements[e].vertex_next[side_e] = e;
                self.edges.elements[e].vertex_prev[side_e] = e;
                self.vertices.elements[v].edges.head = Some(e);
            }
            Some(head) => {
                let side_head = self.edges.elements[head].side(v);
                let tail = self.edges.elements[head].vertex_prev[side_head];
                let side_tail = self.edges.elements[tail].side(v);
                self.edges.elements[e].vertex_next[side_e] = head;
                self.edges.elements[e].vertex_prev[side_e] = tail;
                self.edges.elements[tail].vertex_next[side_tail] = e;
                self.edges.elements[head].vertex_prev[side_head] = e;
            }
        }
        self.vertices.elements[v].edges.len += 1;
    }

    /// Unlinks `e` from the edge list of its endpoint `v`.
    fn vertex_edge_remove(&mut self, v: VertexId, e: EdgeId) {
        let side_e = self.edges.elements[e].side(v);
        let list = self.vertices.elements[v].edges;
        if list.len == 1 {
            self.vertices.elements[v].edges.head = None;
        } else {
            let next = self.edges.elements[e].vertex_next[side_e];
            let prev = self.edges.elements[e].vertex_prev[side_e];
            let side_next = self.edges.elements[next].side(v);
            let side_prev = self.edges.elements[prev].side(v);
            self.edges.elements[prev].vertex_next[side_prev] = next;
            self.edges.elements[next].vertex_prev[side_next] = prev;
            if list.head == Some(e) {
                self.vertices.elements[v].edges.head = Some(next);
            }
        }
        self.vertices.elements[v].edges.len -= 1;
    }

    /// Appends `l` to the radial list of `e`.
    fn edge_loop_push_back(&mut self, e: EdgeId, l: LoopId) {
        match self.edges.elements[e].loops.head {
            None => {
                self.loops.elements[l].edge_next = l;
                self.loops.elements[l].edge_prev = l;
                self.edges.elements[e].loops.head = Some(l);
            }
            Some(head) => {
                let tail = self.loops.elements[head].edge_prev;
                self.loops.elements[l].edge_next = head;
                self.loops.elements[l].edge_prev = tail;
                self.loops.elements[tail].edge_next = l;
                self.loops.elements[head].edge_prev = l;
            }
        }
        self.edges.elements[e].loops.len += 1;
    }

    /// Unlinks `l` from the radial list of `e`.
    fn edge_loop_remove(&mut self, e: EdgeId, l: LoopId) {
        let list = self.edges.elements[e].loops;
        if list.len == 1 {
            self.edges.elements[e].loops.head = None;
        } else {
            let next = self.loops.elements[l].edge_next;
            let prev = self.loops.elements[l].edge_prev;
            self.loops.elements[prev].edge_next = next;
            self.loops.elements[next].edge_prev = prev;
            if list.head == Some(l) {
                self.edges.elements[e].loops.head = Some(next);
            }
        }
        self.edges.elements[e].loops.len -= 1;
    }

    /// Erases an already-unlinked loop from the arena, rewiring references to
    /// whichever loop takes its index.
    fn erase_loop(&mut self, l: LoopId) {
        self.loops.swap_remove(l);
        let old = LoopId::try_from_usize(self.loops.len())
            .unwrap_or_else(|_| unreachable!("arena len exceeds {}", LoopId::TYPE_NAME));
        if old == l {
            return;
        }
        // The loop formerly at `old` now lives at `l`. Normalize its own
        // links first in case it neighbored itself, then rewire its cycle
        // neighbors and owning list heads.
        let moved = &mut self.loops.elements[l];
        if moved.edge_next == old {
            moved.edge_next = l;
        }
        if moved.edge_prev == old {
            moved.edge_prev = l;
        }
        if moved.face_next == old {
            moved.face_next = l;
        }
        if moved.face_prev == old {
            moved.face_prev = l;
        }
        let moved = self.loops.elements[l];
        self.loops.elements[moved.edge_prev].edge_next = l;
        self.loops.elements[moved.edge_next].edge_prev = l;
        self.loops.elements[moved.face_prev].face_next = l;
        self.loops.elements[moved.face_next].face_prev = l;
        if self.edges.elements[moved.edge].loops.head == Some(old) {
            self.edges.elements[moved.edge].loops.head = Some(l);
        }
        if self.faces.elements[moved.face].loops.head == Some(old) {
            self.faces.elements[moved.face].loops.head = Some(l);
        }
    }

    /// Erases an already-unlinked edge with no loops from the arena, rewiring
    /// references to whichever edge takes its index.
    fn erase_edge(&mut self, e: EdgeId) {
        self.edges.swap_remove(e);
        let old = EdgeId::try_from_usize(self.edges.len())
            .unwrap_or_else(|_| unreachable!("arena len exceeds {}", EdgeId::TYPE_NAME));
        if old == e {
            return;
        }
        for side in 0..2 {
            let moved = &mut self.edges.elements[e];
            if moved.vertex_next[side] == old {
                moved.vertex_next[side] = e;
            }
            if moved.vertex_prev[side] == old {
                moved.vertex_prev[side] = e;
            }
        }
        let moved = self.edges.elements[e];
        for side in 0..2 {
            let v = moved.vertices[side];
            let prev = moved.vertex_prev[side];
            let next = moved.vertex_next[side];
            let side_prev = self.edges.elements[prev].side(v);
            self.edges.elements[prev].vertex_next[side_prev] = e;
            let side_next = self.edges.elements[next].side(v);
            self.edges.elements[next].vertex_prev[side_next] = e;
            if self.vertices.elements[v].edges.head == Some(old) {
                self.vertices.elements[v].edges.head = Some(e);
            }
        }
        let mut l = moved.loops.head;
        for _ in 0..moved.loops.len {
            if let Some(cur) = l {
                self.loops.elements[cur].edge = e;
                l = Some(self.loops.elements[cur].edge_next);
            }
        }
    }

    /// Erases a vertex with no incident edges from the arena, rewiring
    /// references to whichever vertex takes its index.
    fn erase_vertex(&mut self, v: VertexId) {
        self.vertices.swap_remove(v);
        let old = VertexId::try_from_usize(self.vertices.len())
            .unwrap_or_else(|_| unreachable!("arena len exceeds {}", VertexId::TYPE_NAME));
        if old == v {
            return;
        }
        let list = self.vertices.elements[v].edges;
        let mut e = list.head;
        for _ in 0..list.len {
            if let Some(cur) = e {
                let side = self.edges.elements[cur].side(old);
                let next = self.edges.elements[cur].vertex_next[side];
                let mut l = self.edges.elements[cur].loops.head;
                for _ in 0..self.edges.elements[cur].loops.len {
                    if let Some(lcur) = l {
                        if self.loops.elements[lcur].vertex == old {
                            self.loops.elements[lcur].vertex = v;
                        }
                        l = Some(self.loops.elements[lcur].edge_next);
                    }
                }
                self.edges.elements[cur].vertices[side] = v;
                e = Some(next);
            }
        }
    }

    /// Erases a face with no loops from the arena, rewiring references to
    /// whichever face takes its index.
    fn erase_face(&mut self, f: FaceId) {
        self.faces.swap_remove(f);
        let old = FaceId::try_from_usize(self.faces.len())
            .unwrap_or_else(|_| unreachable!("arena len exceeds {}", FaceId::TYPE_NAME));
        if old == f {
            return;
        }
        let list = self.faces.elements[f].loops;
        let mut l = list.head;
        for _ in 0..list.len {
            if let Some(cur) = l {
                self.loops.elements[cur].face = f;
                l = Some(self.loops.elements[cur].face_next);
            }
        }
    }
}
