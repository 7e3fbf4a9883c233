//! 3D geometric primitives and typed-index collections for the ground-surface
//! mesh kernel.

pub use {approx, glam};

/// Floating-point type used for geometry.
pub type Float = f32;

/// Small floating-point value used for comparisons and tiny offsets.
pub const EPSILON: Float = 0.0001;

/// Asserts that both arguments are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr $(,)?) => {
        $crate::approx::assert_abs_diff_eq!($a, $b, epsilon = $crate::EPSILON)
    };
}

#[macro_use]
pub mod collections;

pub mod aabb;
pub mod ray;
pub mod triangle;

pub use aabb::Aabb;
pub use ray::Ray;
pub use triangle::TriangleRegion;

/// Structs, traits, and constants.
pub mod prelude {
    pub use crate::aabb::Aabb;
    pub use crate::collections::{GenericVec, IndexNewtype, IndexOutOfRange, IndexOverflow};
    pub use crate::ray::Ray;
    pub use crate::triangle::{
        TriangleRegion, barycentric_to_cartesian, cartesian_to_barycentric,
        closest_point_triangle,
    };
    pub use crate::{EPSILON, Float, idx_struct};
}
