//! Training infrastructure.
//!
//! ## Shared Infrastructure
//!
//! - [`ExecutionMonitor`], [`CancellationToken`], [`NoopMonitor`]: cooperative
//!   cancellation and progress reporting
//! - [`TrainingLogger`], [`Verbosity`]: log output gated by verbosity
//! - [`TrainingError`]: errors ending a run
//!
//! ## Model-Specific Training
//!
//! - [`sota`]: Self-Organizing Tree Algorithm

mod error;
mod logger;
mod monitor;
pub mod sota;

pub use error::TrainingError;
pub use logger::{TrainingLogger, Verbosity};
pub use monitor::{CancellationToken, Cancelled, ExecutionMonitor, NoopMonitor};
pub use sota::{DistanceMetric, SotaManager, TrainingState};
