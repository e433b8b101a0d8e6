//! SOTA model implementation.
//!
//! High-level wrapper around [`SotaTree`] with training and row assignment.
//! Access components via [`tree()`](SotaModel::tree) and
//! [`config()`](SotaModel::config).

use crate::data::{DataTable, Row, TableSchema};
use crate::repr::sota::{CellId, SotaTree};
use crate::training::sota::{DistanceManager, SotaManager};
use crate::training::{ExecutionMonitor, TrainingError};

use super::SotaConfig;

/// A trained self-organizing tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SotaModel {
    tree: SotaTree,
    config: SotaConfig,
    /// Names of the columns the cell prototypes were trained on, in order.
    feature_columns: Vec<String>,
    fuzzy: bool,
}

impl SotaModel {
    /// Create a model from all its parts.
    ///
    /// Used when loading from a stored model.
    pub fn from_parts(
        tree: SotaTree,
        config: SotaConfig,
        feature_columns: Vec<String>,
        fuzzy: bool,
    ) -> Self {
        Self {
            tree,
            config,
            feature_columns,
            fuzzy,
        }
    }

    /// Train a new model.
    ///
    /// # Arguments
    ///
    /// * `data` - Training table
    /// * `class_column` - Optional column holding class labels
    /// * `config` - Training configuration, validated before use
    /// * `monitor` - Cancellation and progress sink
    pub fn train(
        data: &dyn DataTable,
        class_column: Option<usize>,
        config: SotaConfig,
        monitor: &dyn ExecutionMonitor,
    ) -> Result<Self, TrainingError> {
        config.validate()?;

        let mut manager = SotaManager::new(config.clone());
        manager.initialize_tree(data, class_column, monitor)?;
        manager.do_training()?;

        let schema = data.schema();
        let feature_columns = manager
            .feature_columns()
            .iter()
            .map(|&c| schema.get(c).map(|m| m.name.clone()).unwrap_or_default())
            .collect();
        let fuzzy = manager.is_fuzzy();
        let tree = manager.into_tree().ok_or(TrainingError::NotInitialized)?;

        Ok(Self {
            tree,
            config,
            feature_columns,
            fuzzy,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tree(&self) -> &SotaTree {
        &self.tree
    }

    pub fn config(&self) -> &SotaConfig {
        &self.config
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Number of prototype values per cell.
    pub fn dimension(&self) -> usize {
        self.feature_columns.len()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn n_leaves(&self) -> usize {
        self.tree.n_leaves()
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// The leaf nearest to `row` under the trained distance metric.
    ///
    /// Returns `None` if a feature column is absent from `schema`. Ties go to
    /// the leftmost leaf.
    pub fn assign(&self, row: &Row, schema: &TableSchema) -> Option<CellId> {
        let distance = self.distance_for(schema)?;
        self.nearest_leaf(&distance, row)
    }

    /// Assign every row of `data`.
    pub fn assign_batch(&self, data: &dyn DataTable) -> Vec<Option<CellId>> {
        let Some(distance) = self.distance_for(data.schema()) else {
            return vec![None; data.n_rows()];
        };
        self.config
            .parallelism
            .maybe_par_map(0..data.n_rows(), |r| {
                self.nearest_leaf(&distance, data.row(r))
            })
    }

    fn distance_for(&self, schema: &TableSchema) -> Option<DistanceManager> {
        let columns = self
            .feature_columns
            .iter()
            .map(|name| schema.column_index(name))
            .collect::<Option<Vec<_>>>()?;
        Some(DistanceManager::new(self.config.distance, columns))
    }

    fn nearest_leaf(&self, distance: &DistanceManager, row: &Row) -> Option<CellId> {
        let mut winner = None;
        let mut min_dist = f64::INFINITY;
        for leaf in self.tree.leaves() {
            let d = distance.row_to_cell(row, self.tree.cell(leaf).data());
            if winner.is_none() || d < min_dist {
                min_dist = d;
                winner = Some(leaf);
            }
        }
        winner
    }
}
