//! PMML tree model support.
//!
//! This module provides the raw PMML `TreeModel` element structs an external
//! reader fills in, and their conversion to a native
//! [`DecisionTree`](crate::repr::pmml::DecisionTree).

mod convert;
mod mapper;
mod raw;

pub use convert::TreeModelTranslator;
pub use mapper::{DerivedFieldMapper, FieldMapper, IdentityMapper};
pub use raw::*;
