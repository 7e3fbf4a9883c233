//! Bounding volume hierarchy over mesh faces.

use float_ord::FloatOrd;
use glam::Vec3;
use groundmath::aabb::Aabb;
use groundmath::ray::Ray;

use groundmath::collections::IndexNewtype;

use crate::brep::{AttributeError, Mesh};

/// Number of primitives at or below which a node stays a leaf.
const LEAF_SIZE: u32 = 2;

/// Primitive fed to BVH construction: a bounding box and a representative
/// point used for partitioning.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BvhPrimitive {
    /// Bounding box of the primitive.
    pub bounds: Aabb,
    /// Centroid of the primitive.
    pub centroid: Vec3,
}

/// Node of a [`Bvh`].
///
/// A leaf (`size > 0`) covers `size` entries of the primitive index array
/// starting at `offset`. An interior node (`size == 0`) has two children at
/// node indices `offset` and `offset + 1`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BvhNode {
    /// Bounding box of everything below this node.
    pub bounds: Aabb,
    /// First primitive index (leaf) or first child node index (interior).
    pub offset: u32,
    /// Primitive count, or 0 for an interior node.
    pub size: u32,
}

impl BvhNode {
    /// Returns `true` if the node is a leaf.
    pub const fn is_leaf(&self) -> bool {
        self.size > 0
    }
}

/// Binary bounding volume hierarchy built by median splits.
///
/// Construction recursively splits each node at the spatial midpoint of its
/// widest axis. A split that fails to separate the primitives leaves an
/// oversized leaf instead, so construction always terminates.
#[derive(Debug, Default, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitive_indices: Vec<u32>,
}

impl Bvh {
    /// Constructs an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a hierarchy over `primitives`.
    pub fn from_primitives(primitives: &[BvhPrimitive]) -> Self {
        let mut bvh = Self::new();
        bvh.build(primitives);
        bvh
    }

    /// Constructs a hierarchy over the faces of `mesh`. The primitive index
    /// reported by [`Self::visit`] is the face ID's index.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self, AttributeError> {
        let positions = mesh.vertices().attributes().at::<Vec3>("position")?;
        let primitives: Vec<BvhPrimitive> = mesh
            .faces()
            .ids()
            .map(|f| {
                let mut bounds = Aabb::EMPTY;
                let mut centroid = Vec3::ZERO;
                let mut corners = 0;
                for l in mesh.face_loops(f) {
                    let p = positions[mesh.loop_vertex(l).to_usize()];
                    bounds.expand_to(p);
                    centroid += p;
                    corners += 1;
                }
                BvhPrimitive {
                    bounds,
                    centroid: centroid / corners.max(1) as f32,
                }
            })
            .collect();
        Ok(Self::from_primitives(&primitives))
    }

    /// Rebuilds the hierarchy over `primitives`, replacing any previous
    /// contents.
    pub fn build(&mut self, primitives: &[BvhPrimitive]) {
        self.nodes.clear();
        self.primitive_indices.clear();
        if primitives.is_empty() {
            return;
        }
        self.primitive_indices.extend(0..primitives.len() as u32);
        let bounds = primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.bounds));
        self.nodes.push(BvhNode {
            bounds,
            offset: 0,
            size: primitives.len() as u32,
        });
        self.subdivide(0, primitives);
        tracing::debug!(
            primitives = primitives.len(),
            nodes = self.nodes.len(),
            "built BVH",
        );
    }

    fn subdivide(&mut self, node_index: usize, primitives: &[BvhPrimitive]) {
        let node = self.nodes[node_index];
        if node.size <= LEAF_SIZE {
            return;
        }

        // Split at the spatial midpoint of the widest axis.
        let extents = node.bounds.extents();
        let axis = (0..3).max_by_key(|&a| FloatOrd(extents[a])).unwrap_or(0);
        let split = (node.bounds.min[axis] + node.bounds.max[axis]) * 0.5;

        let first = node.offset as usize;
        let count = node.size as usize;
        let mut i = first;
        let mut j = first + count;
        while i < j {
            if primitives[self.primitive_indices[i] as usize].centroid[axis] < split {
                i += 1;
            } else {
                j -= 1;
                self.primitive_indices.swap(i, j);
            }
        }

        let left_count = i - first;
        if left_count == 0 || left_count == count {
            // Degenerate split; keep the oversized leaf.
            return;
        }

        let child_bounds = |indices: &[u32]| {
            indices
                .iter()
                .fold(Aabb::EMPTY, |acc, &p| acc.union(&primitives[p as usize].bounds))
        };
        let left_bounds = child_bounds(&self.primitive_indices[first..i]);
        let right_bounds = child_bounds(&self.primitive_indices[i..first + count]);

        let first_child = self.nodes.len();
        self.nodes.push(BvhNode {
            bounds: left_bounds,
            offset: node.offset,
            size: left_count as u32,
        });
        self.nodes.push(BvhNode {
            bounds: right_bounds,
            offset: i as u32,
            size: (count - left_count) as u32,
        });
        self.nodes[node_index].offset = first_child as u32;
        self.nodes[node_index].size = 0;

        self.subdivide(first_child, primitives);
        self.subdivide(first_child + 1, primitives);
    }

    /// Calls `visitor` with the index of every primitive in a leaf whose
    /// bounds the ray intersects. Primitives may be reported in any order,
    /// and a reported primitive's own bounds are not tested against the ray.
    pub fn visit(&self, ray: &Ray, mut visitor: impl FnMut(u32)) {
        if !self.nodes.is_empty() {
            self.visit_node(0, ray, &mut visitor);
        }
    }

    fn visit_node(&self, node_index: usize, ray: &Ray, visitor: &mut impl FnMut(u32)) {
        let node = &self.nodes[node_index];
        if !ray.intersects_aabb(&node.bounds) {
            return;
        }
        if node.is_leaf() {
            let first = node.offset as usize;
            for &p in &self.primitive_indices[first..first + node.size as usize] {
                visitor(p);
            }
        } else {
            self.visit_node(node.offset as usize, ray, visitor);
            self.visit_node(node.offset as usize + 1, ray, visitor);
        }
    }

    /// Returns the nodes of the hierarchy. The root, if any, is node 0.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Returns the primitive index array that leaves point into.
    pub fn primitive_indices(&self) -> &[u32] {
        &self.primitive_indices
    }

    /// Returns `true` if the hierarchy holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Unit cube centered at `center`.
    fn cube(center: Vec3) -> BvhPrimitive {
        BvhPrimitive {
            bounds: Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5)),
            centroid: center,
        }
    }

    /// Row of unit cubes along the X axis.
    fn row(n: u32) -> Vec<BvhPrimitive> {
        (0..n).map(|i| cube(Vec3::new(i as f32 * 2.0, 0.0, 0.0))).collect()
    }

    #[test]
    fn test_empty_build() {
        let bvh = Bvh::from_primitives(&[]);
        assert!(bvh.is_empty());
        let mut visited = 0;
        bvh.visit(&Ray::new(Vec3::ZERO, Vec3::X), |_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_leaves_partition_primitives() {
        let bvh = Bvh::from_primitives(&row(9));
        let mut indices: Vec<u32> = bvh
            .nodes()
            .iter()
            .filter(|n| n.is_leaf())
            .flat_map(|n| {
                bvh.primitive_indices()[n.offset as usize..][..n.size as usize].to_vec()
            })
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..9).collect::<Vec<u32>>());
        for n in bvh.nodes() {
            assert!(n.is_leaf() || n.size == 0);
        }
    }

    #[test]
    fn test_nodes_bound_their_primitives() {
        let primitives = row(9);
        let bvh = Bvh::from_primitives(&primitives);
        for n in bvh.nodes().iter().filter(|n| n.is_leaf()) {
            for &p in &bvh.primitive_indices()[n.offset as usize..][..n.size as usize] {
                let b = primitives[p as usize].bounds;
                assert!(n.bounds.contains_point(b.min));
                assert!(n.bounds.contains_point(b.max));
            }
        }
    }

    #[test]
    fn test_visit_reports_hit_leaves() {
        let bvh = Bvh::from_primitives(&row(9));
        // Down through the middle of the first cube only.
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let mut visited = vec![];
        bvh.visit(&ray, |p| visited.push(p));
        assert!(visited.contains(&0));
        // Along the row: everything is reported.
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let mut visited = vec![];
        bvh.visit(&ray, |p| visited.push(p));
        visited.sort_unstable();
        assert_eq!(visited, (0..9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_visit_misses_everything() {
        let bvh = Bvh::from_primitives(&row(9));
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        bvh.visit(&ray, |_| panic!("ray hits nothing"));
    }

    #[test]
    fn test_coincident_centroids_stay_one_leaf() {
        let primitives = vec![cube(Vec3::ONE); 5];
        let bvh = Bvh::from_primitives(&primitives);
        assert_eq!(bvh.nodes().len(), 1);
        assert_eq!(bvh.nodes()[0].size, 5);
    }

    #[test]
    fn test_from_mesh() {
        let mesh = crate::functions::make_triangle_mesh(
            &[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)],
            &[[0, 1, 2], [1, 3, 2]],
        )
        .unwrap();
        let bvh = Bvh::from_mesh(&mesh).unwrap();
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);
        let mut visited = vec![];
        bvh.visit(&ray, |p| visited.push(p));
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1]);
    }
}
