//! Collections for index-based topology arenas.

#[macro_use]
pub mod generic_vec;

pub use generic_vec::{GenericVec, IndexIter, IndexNewtype, IndexOutOfRange, IndexOverflow};
