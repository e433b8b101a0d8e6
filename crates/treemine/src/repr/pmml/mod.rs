//! PMML decision-tree predicates and node model.
//!
//! Predicates form a tagged expression tree evaluated with three-valued
//! logic: missing values yield [`Tristate::Unknown`] rather than an error.
//! [`DecisionTree`] uses them to route rows from the root to a leaf.
//!
//! Models are normally built from raw PMML elements through
//! [`crate::compat::pmml::TreeModelTranslator`], but every type here can be
//! constructed directly.

mod error;
mod operator;
mod predicate;
mod tree;
mod values;

pub use error::ModelError;
pub use operator::{ArrayType, BooleanOperator, SetOperator, SimpleOperator};
pub use predicate::{
    ColumnIndexCache, CompoundPredicate, Predicate, SimplePredicate, SimpleSetPredicate, Tristate,
};
pub use tree::{
    DecisionTree, DecisionTreeNode, MissingValueStrategy, NoTrueChildStrategy, Prediction,
};
pub use values::{parse_array_content, ValueSet};
