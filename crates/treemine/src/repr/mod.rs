//! Canonical model representations.
//!
//! - [`sota`]: the SOTA prototype tree
//! - [`pmml`]: PMML predicates and decision trees

pub mod pmml;
pub mod sota;
