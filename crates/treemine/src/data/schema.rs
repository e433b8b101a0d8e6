//! Column type definitions.
//!
//! This module defines the schema types that describe table structure.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Logical column kinds.
///
/// The kind decides which cells a column may hold and which engines use it:
/// SOTA training consumes `Numeric` columns (or `FuzzyInterval` columns in
/// fuzzy mode), predicates compare `Numeric` columns numerically and all
/// others as strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Double or integer cells.
    ///
    /// Missing values: [`Value::Missing`](super::Value::Missing)
    #[default]
    Numeric,

    /// Fuzzy interval cells (support and core bounds).
    FuzzyInterval,

    /// String cells.
    Nominal,

    /// Integer hierarchy level of a fuzzy rule.
    ///
    /// Only read by hierarchical fuzzy training, never used as a feature.
    HierarchyLevel,
}

impl ColumnKind {
    /// Returns true if this is a numeric column.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }

    /// Returns true if this is a fuzzy interval column.
    #[inline]
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, ColumnKind::FuzzyInterval)
    }
}

/// Metadata for a single column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name, unique within a schema.
    pub name: String,

    /// Column kind.
    pub kind: ColumnKind,
}

impl ColumnMeta {
    /// Create metadata for a numeric column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Numeric)
    }

    /// Create metadata for a fuzzy interval column.
    pub fn fuzzy(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::FuzzyInterval)
    }

    /// Create metadata for a string column.
    pub fn nominal(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Nominal)
    }

    /// Create metadata for a hierarchy level column.
    pub fn hierarchy_level(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::HierarchyLevel)
    }

    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Identity of a schema layout.
///
/// Two schemas with the same column names and kinds in the same order share a
/// key. Caches that map field names to column indices are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SchemaKey(u64);

/// Schema describing the table structure.
///
/// Contains per-column metadata and a name-to-index mapping built at
/// construction.
#[derive(Clone, Debug)]
pub struct TableSchema {
    columns: Vec<ColumnMeta>,
    name_index: HashMap<String, usize>,
    key: SchemaKey,
}

impl TableSchema {
    /// Create a schema with the given columns.
    ///
    /// If a name occurs more than once, lookups by name resolve to the first
    /// occurrence. [`TableBuilder`](super::TableBuilder) rejects such schemas.
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        let mut name_index = HashMap::with_capacity(columns.len());
        for (i, meta) in columns.iter().enumerate() {
            name_index.entry(meta.name.clone()).or_insert(i);
        }

        let mut hasher = DefaultHasher::new();
        columns.hash(&mut hasher);
        let key = SchemaKey(hasher.finish());

        Self {
            columns,
            name_index,
            key,
        }
    }

    /// Create a schema where all columns are numeric, named `col0..colN`.
    pub fn all_numeric(n_columns: usize) -> Self {
        Self::new(
            (0..n_columns)
                .map(|i| ColumnMeta::numeric(format!("col{i}")))
                .collect(),
        )
    }

    /// Number of columns in the schema.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get metadata for a column by index.
    pub fn get(&self, index: usize) -> Option<&ColumnMeta> {
        self.columns.get(index)
    }

    /// Get the column kind by index.
    pub fn kind(&self, index: usize) -> Option<ColumnKind> {
        self.columns.get(index).map(|m| m.kind)
    }

    /// Get column index by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Layout identity of this schema.
    pub fn key(&self) -> SchemaKey {
        self.key
    }

    /// Check if any column is a fuzzy interval column.
    pub fn has_fuzzy(&self) -> bool {
        self.columns.iter().any(|m| m.kind.is_fuzzy())
    }

    /// Indices of all columns of the given kind, in column order.
    pub fn indices_of(&self, kind: ColumnKind) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, m)| m.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// Get an iterator over column metadata.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter()
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }
}

impl PartialEq for TableSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}
