//! Self-Organizing Tree Algorithm training.
//!
//! - [`SotaManager`]: the training state machine
//! - [`TrainingHelper`]: per-kind cell initialization and adjustment
//! - [`DistanceManager`]: row-to-cell and row-to-row distances
//! - [`HierarchyFilter`]: hierarchy level row selection

mod distance;
mod helper;
mod hierarchy;
mod manager;

pub use distance::{DistanceManager, DistanceMetric, UnknownMetric, CORRELATION_OFFSET};
pub use helper::TrainingHelper;
pub use hierarchy::HierarchyFilter;
pub use manager::{SotaManager, TrainingState};
