//! Row selection by hierarchy level for hierarchical fuzzy training.

use crate::data::{ColumnKind, DataTable, Value};

/// Selects the rows of the hierarchy level currently being trained.
///
/// The level is read from the first [`ColumnKind::HierarchyLevel`] column.
/// Without such a column every row belongs to level 1 and there is a single
/// level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyFilter {
    column: Option<usize>,
    level: u32,
    max_level: u32,
}

impl HierarchyFilter {
    /// Filter positioned at level 1.
    pub fn new(data: &dyn DataTable) -> Self {
        let column = data
            .schema()
            .indices_of(ColumnKind::HierarchyLevel)
            .first()
            .copied();

        let max_level = column
            .and_then(|c| {
                (0..data.n_rows())
                    .filter_map(|r| level_of(data.row(r).cell(c)))
                    .max()
            })
            .unwrap_or(1)
            .max(1);

        Self {
            column,
            level: 1,
            max_level,
        }
    }

    /// Filter that passes every row on a single level.
    pub fn flat() -> Self {
        Self {
            column: None,
            level: 1,
            max_level: 1,
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Move to the next level. Returns `false` once past the last level.
    pub fn advance(&mut self) -> bool {
        self.level += 1;
        self.level <= self.max_level
    }

    /// Table indices of the rows on the current level, ascending.
    pub fn rows(&self, data: &dyn DataTable) -> Vec<usize> {
        match self.column {
            None => (0..data.n_rows()).collect(),
            Some(c) => (0..data.n_rows())
                .filter(|&r| level_of(data.row(r).cell(c)) == Some(self.level))
                .collect(),
        }
    }
}

fn level_of(value: &Value) -> Option<u32> {
    match value {
        Value::Int(l) => u32::try_from(*l).ok(),
        _ => None,
    }
}
