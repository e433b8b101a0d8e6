//! High-level model wrappers.
//!
//! This module provides user-friendly model types that combine training,
//! assignment, and serialization into a cohesive API.
//!
//! # Example
//!
//! ```
//! use treemine::data::{DataTable, Table};
//! use treemine::model::sota::{SotaConfig, SotaModel};
//! use treemine::training::NoopMonitor;
//! use ndarray::array;
//!
//! let table = Table::from_array(array![[0.0], [1.0], [10.0], [11.0]].view());
//! let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
//! let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();
//!
//! let leaf = model.assign(table.row(3), table.schema()).unwrap();
//! assert!(model.tree().cell(leaf).is_leaf());
//! ```

pub mod sota;

pub use sota::SotaModel;
