//! Typed per-element attribute arrays.

use glam::{Vec2, Vec3, Vec4};
use thiserror::Error;

/// Error returned by typed attribute lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// No attribute with the requested name is registered.
    #[error("attribute {name:?} not found")]
    NotFound {
        /// Name of the requested attribute.
        name: String,
    },
    /// An attribute with the requested name exists but holds a different
    /// type.
    #[error("attribute {name:?} has type {found}, not {expected}")]
    TypeMismatch {
        /// Name of the requested attribute.
        name: String,
        /// Type requested by the caller.
        expected: &'static str,
        /// Type actually stored.
        found: &'static str,
    },
}

/// Dense per-element attribute array.
///
/// The set of storable types is closed; each variant is a dense array indexed
/// 1:1 with the elements of the owning container.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    /// Scalar `f32` attribute.
    F32(Vec<f32>),
    /// 2D vector attribute.
    Vec2(Vec<Vec2>),
    /// 3D vector attribute (e.g. `"position"`, `"normal"`).
    Vec3(Vec<Vec3>),
    /// 4D vector attribute.
    Vec4(Vec<Vec4>),
    /// Scalar `u32` attribute.
    U32(Vec<u32>),
    /// Scalar `i32` attribute.
    I32(Vec<i32>),
}

/// Dispatches over every [`AttributeData`] variant.
macro_rules! for_each_variant {
    ($data:expr, $values:pat => $body:expr) => {
        match $data {
            AttributeData::F32($values) => $body,
            AttributeData::Vec2($values) => $body,
            AttributeData::Vec3($values) => $body,
            AttributeData::Vec4($values) => $body,
            AttributeData::U32($values) => $body,
            AttributeData::I32($values) => $body,
        }
    };
}

impl AttributeData {
    /// Returns the number of elements in the array.
    pub fn len(&self) -> usize {
        for_each_variant!(self, values => values.len())
    }

    /// Returns `true` if the array is empty.
    pub fn is_empty(&self) -> bool {
        for_each_variant!(self, values => values.is_empty())
    }

    /// Returns the name of the stored type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::Vec2(_) => "Vec2",
            Self::Vec3(_) => "Vec3",
            Self::Vec4(_) => "Vec4",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
        }
    }

    /// Appends a default-constructed value.
    pub(crate) fn push_default(&mut self) {
        for_each_variant!(self, values => values.push(Default::default()));
    }

    /// Removes the value at `index` by swapping the last value into its slot.
    pub(crate) fn swap_remove(&mut self, index: usize) {
        for_each_variant!(self, values => {
            values.swap_remove(index);
        });
    }

    /// Removes all values.
    pub(crate) fn clear(&mut self) {
        for_each_variant!(self, values => values.clear());
    }
}

/// Types storable as per-element attributes.
///
/// This is a closed set; it is implemented exactly for the variants of
/// [`AttributeData`].
pub trait AttributeValue: Default + Copy {
    /// Name of the stored type.
    const TYPE_NAME: &'static str;

    /// Constructs an attribute array of `len` default values.
    fn new_data(len: usize) -> AttributeData;

    /// Returns the typed contents of `data`, or `None` on a type mismatch.
    fn as_slice(data: &AttributeData) -> Option<&[Self]>;

    /// Returns the typed contents of `data`, or `None` on a type mismatch.
    fn as_mut_slice(data: &mut AttributeData) -> Option<&mut [Self]>;
}

macro_rules! impl_attribute_value {
    ($($ty:ty => $variant:ident, $name:literal;)+) => {
        $(
            impl AttributeValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn new_data(len: usize) -> AttributeData {
                    AttributeData::$variant(vec![Default::default(); len])
                }

                fn as_slice(data: &AttributeData) -> Option<&[Self]> {
                    match data {
                        AttributeData::$variant(values) => Some(values),
                        _ => None,
                    }
                }

                fn as_mut_slice(data: &mut AttributeData) -> Option<&mut [Self]> {
                    match data {
                        AttributeData::$variant(values) => Some(values),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_attribute_value! {
    f32 => F32, "f32";
    Vec2 => Vec2, "Vec2";
    Vec3 => Vec3, "Vec3";
    Vec4 => Vec4, "Vec4";
    u32 => U32, "u32";
    i32 => I32, "i32";
}
