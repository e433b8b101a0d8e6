//! Training errors.

use super::Cancelled;
use crate::model::sota::ConfigError;

/// Errors that can end a SOTA training run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainingError {
    /// The monitor asked to stop. The tree reflects the last completed split.
    #[error("training cancelled")]
    Cancelled,

    #[error("tree not initialized, call initialize_tree first")]
    NotInitialized,

    /// No row without missing values was available.
    #[error("no rows without missing values to train on")]
    NoTrainingRows,

    #[error("table has no {0} columns to train on")]
    NoFeatureColumns(&'static str),

    #[error("class column {column} out of range for {n_columns} columns")]
    ClassColumnOutOfRange { column: usize, n_columns: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<Cancelled> for TrainingError {
    fn from(_: Cancelled) -> Self {
        TrainingError::Cancelled
    }
}
