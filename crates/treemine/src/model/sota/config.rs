//! SOTA training configuration with builder pattern.
//!
//! [`SotaConfig`] uses the `bon` crate for builder generation and validates
//! every parameter when built. Validation reports all violated constraints at
//! once, never just the first.
//!
//! # Example
//!
//! ```
//! use treemine::model::sota::SotaConfig;
//! use treemine::training::DistanceMetric;
//!
//! // All defaults
//! let config = SotaConfig::builder().build().unwrap();
//! assert_eq!(config.lr_winner, 0.1);
//!
//! let config = SotaConfig::builder()
//!     .distance(DistanceMetric::Correlation)
//!     .use_variability(true)
//!     .min_variability(0.5)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use bon::Builder;

use crate::training::{DistanceMetric, Verbosity};
use crate::utils::Parallelism;

pub const DEFAULT_LR_WINNER: f64 = 0.1;
pub const DEFAULT_LR_ANCESTOR: f64 = 0.05;
pub const DEFAULT_LR_SISTER: f64 = 0.01;
pub const DEFAULT_MIN_VARIABILITY: f64 = 0.0;
pub const DEFAULT_MIN_RESOURCE: f64 = 0.01;
pub const DEFAULT_MIN_ERROR: f64 = 0.1;

/// Inclusive bounds of the learning rates.
pub const LEARNING_RATE_RANGE: (f64, f64) = (f64::MIN_POSITIVE, 1.0);
pub const MIN_VARIABILITY_RANGE: (f64, f64) = (0.0, f64::MAX);
pub const MIN_RESOURCE_RANGE: (f64, f64) = (0.0001, f64::MAX);
pub const MIN_ERROR_RANGE: (f64, f64) = (0.0, 1.0);

// =============================================================================
// ConfigError
// =============================================================================

/// A single violated configuration constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("setting '{0}' is missing")]
    MissingSetting(String),

    #[error("setting '{key}' must be a {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("unknown distance metric '{0}'")]
    UnknownDistance(String),
}

/// All violated constraints of a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// SotaConfig
// =============================================================================

/// Configuration for SOTA training.
///
/// Learning rates set how far a cell moves towards a row: the winning cell
/// by `lr_winner`, and while the winner's sister is still a leaf, the sister
/// by `lr_sister` and their ancestor by `lr_ancestor`.
///
/// Training stops when the largest leaf resource is at most `min_resource`,
/// or, with `use_variability`, when the largest leaf variability is at most
/// `min_variability`.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct SotaConfig {
    // === Learning rates ===
    /// Learning rate of the winning cell. Default: 0.1.
    #[builder(default = DEFAULT_LR_WINNER)]
    pub lr_winner: f64,

    /// Learning rate of the winner's ancestor. Default: 0.05.
    #[builder(default = DEFAULT_LR_ANCESTOR)]
    pub lr_ancestor: f64,

    /// Learning rate of the winner's sister. Default: 0.01.
    #[builder(default = DEFAULT_LR_SISTER)]
    pub lr_sister: f64,

    // === Stopping criteria ===
    /// Variability below which training stops. Default: 0.0.
    #[builder(default = DEFAULT_MIN_VARIABILITY)]
    pub min_variability: f64,

    /// Resource below which training stops. Default: 0.01.
    #[builder(default = DEFAULT_MIN_RESOURCE)]
    pub min_resource: f64,

    /// Relative error change below which a cycle's epochs stop. Default: 0.1.
    #[builder(default = DEFAULT_MIN_ERROR)]
    pub min_error: f64,

    /// Stop on variability instead of resource. Default: false.
    ///
    /// Variability is quadratic in the rows per leaf.
    #[builder(default)]
    pub use_variability: bool,

    /// Distance metric. Default: Euclidean.
    #[builder(default)]
    pub distance: DistanceMetric,

    /// Train fuzzy rules level by level along their hierarchy level column.
    #[builder(default)]
    pub use_hierarchical_fuzzy_data: bool,

    // === Resource control ===
    /// Fan-out of the variability computation. Default: sequential.
    #[builder(default)]
    pub parallelism: Parallelism,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: sota_config_builder::IsComplete> SotaConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] listing every parameter outside its range.
    pub fn build(self) -> Result<SotaConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl SotaConfig {
    /// Validate all parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let violations = self.range_violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations })
        }
    }

    pub(crate) fn range_violations(&self) -> Vec<ConfigViolation> {
        let checks = [
            ("lr_winner", self.lr_winner, LEARNING_RATE_RANGE),
            ("lr_ancestor", self.lr_ancestor, LEARNING_RATE_RANGE),
            ("lr_sister", self.lr_sister, LEARNING_RATE_RANGE),
            ("min_variability", self.min_variability, MIN_VARIABILITY_RANGE),
            ("min_resource", self.min_resource, MIN_RESOURCE_RANGE),
            ("min_error", self.min_error, MIN_ERROR_RANGE),
        ];

        checks
            .into_iter()
            .filter(|(_, value, (min, max))| !(value >= min && value <= max))
            .map(|(field, value, (min, max))| ConfigViolation::OutOfRange {
                field,
                value,
                min,
                max,
            })
            .collect()
    }
}

impl Default for SotaConfig {
    fn default() -> Self {
        Self {
            lr_winner: DEFAULT_LR_WINNER,
            lr_ancestor: DEFAULT_LR_ANCESTOR,
            lr_sister: DEFAULT_LR_SISTER,
            min_variability: DEFAULT_MIN_VARIABILITY,
            min_resource: DEFAULT_MIN_RESOURCE,
            min_error: DEFAULT_MIN_ERROR,
            use_variability: false,
            distance: DistanceMetric::default(),
            use_hierarchical_fuzzy_data: false,
            parallelism: Parallelism::default(),
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
