//! SOTA tree representation.
//!
//! The tree is grown by [`crate::training::sota::SotaManager`]; this module
//! only holds the data structures and their local operations.

mod cell;
mod classes;
mod tree;

pub use cell::{CellKind, CellValue};
pub use classes::ClassCounter;
pub use tree::{CellId, SotaTree, TreeCell, TreeValidationError, DEFAULT_CLASS};
