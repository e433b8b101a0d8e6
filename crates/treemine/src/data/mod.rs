//! Tabular data abstractions.
//!
//! Training and scoring consume tables through the narrow, read-only
//! [`DataTable`] trait: random access by row index, a [`TableSchema`] with
//! per-column [`ColumnKind`]s, and typed [`Value`] cells that may be missing.
//!
//! [`Table`] is the in-memory implementation. Build it column-first with
//! [`TableBuilder`], or from an `ndarray` matrix with [`Table::from_array`].
//!
//! # Missing Values
//!
//! Missing cells are [`Value::Missing`]. Missing values are data, not errors:
//! SOTA training excludes rows that contain them and predicates evaluate them
//! to [`Tristate::Unknown`](crate::repr::pmml::Tristate::Unknown).

mod schema;
mod table;
mod value;

pub use schema::{ColumnKind, ColumnMeta, SchemaKey, TableSchema};
pub use table::{DataError, DataTable, Row, Table, TableBuilder};
pub use value::{FuzzyInterval, Value};
