//! Mesh kernel for navigation geometry.
//!
//! - [`brep`] — boundary-representation mesh core with per-element
//!   attributes.
//! - [`functions`] — whole-mesh passes (triangle mesh construction, face
//!   normals, bounds).
//! - [`bvh`] — bounding volume hierarchy over mesh faces.
//! - [`navmesh`] — surface traversal over triangulated meshes.

pub mod brep;
pub mod bvh;
pub mod functions;
pub mod navmesh;

/// Commonly used imports.
pub mod prelude {
    pub use crate::brep::{
        AttributeData, AttributeError, AttributeMap, AttributeValue, EdgeId, FaceId, LoopId, Mesh,
        VertexId,
    };
    pub use crate::bvh::{Bvh, BvhNode, BvhPrimitive};
    pub use crate::functions::{
        calculate_bounds, generate_face_normals, generate_vertex_normals, make_triangle_mesh,
    };
    pub use crate::navmesh::{NavmeshTraversal, TraversalFeature, traverse_navmesh};
}

#[cfg(test)]
mod tests;
