//! Compatibility layers for loading models from other formats.
//!
//! - [`pmml`]: PMML `TreeModel` elements to [`DecisionTree`](crate::repr::pmml::DecisionTree)

pub mod pmml;
