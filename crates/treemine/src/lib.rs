//! treemine: self-organizing tree clustering and PMML decision-tree scoring.
//!
//! Two engines share one tabular data abstraction:
//!
//! - **SOTA** (Self-Organizing Tree Algorithm): grows a binary tree of
//!   prototype cells over numeric or fuzzy interval rows, splitting the most
//!   heterogeneous leaf until a resource or variability threshold is met.
//! - **PMML predicates**: three-valued predicate evaluation and decision-tree
//!   classification as described by a PMML `TreeModel`.
//!
//! # Key Types
//!
//! - [`SotaModel`] / [`SotaConfig`] - Train and apply a self-organizing tree
//! - [`SotaManager`] - Step-by-step control over SOTA training
//! - [`DecisionTree`] / [`Predicate`] - PMML tree scoring
//! - [`Table`] / [`DataTable`] - Data handling
//!
//! # Training
//!
//! Use `SotaConfig::builder()` to configure, then `SotaModel::train()`.
//! See the [`model`] module for details.
//!
//! # Loading PMML Trees
//!
//! Fill in a [`compat::pmml::RawTreeModel`] from a PMML reader and convert it
//! with [`to_decision_tree`](compat::pmml::RawTreeModel::to_decision_tree).

// Re-export approx traits for users who want to compare prototypes
pub use approx;

pub mod compat;
pub mod data;
pub mod model;
pub mod persist;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::sota::{SotaConfig, SotaModel};

// Training types
pub use training::{
    CancellationToken, DistanceMetric, ExecutionMonitor, NoopMonitor, SotaManager,
    TrainingError, Verbosity,
};

// Representations
pub use repr::pmml::{DecisionTree, Predicate, Tristate};
pub use repr::sota::{CellId, SotaTree};

// Data types
pub use data::{ColumnKind, ColumnMeta, DataTable, Row, Table, TableSchema, Value};

// Shared utilities
pub use utils::Parallelism;
