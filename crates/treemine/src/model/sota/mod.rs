//! SOTA model and configuration.
//!
//! - [`SotaModel`]: trained tree with row assignment
//! - [`SotaConfig`]: validated training configuration
//! - [`Settings`]: named key/value form of the configuration

mod config;
mod model;
mod settings;

pub use config::{
    ConfigError, ConfigViolation, SotaConfig, SotaConfigBuilder, DEFAULT_LR_ANCESTOR,
    DEFAULT_LR_SISTER, DEFAULT_LR_WINNER, DEFAULT_MIN_ERROR, DEFAULT_MIN_RESOURCE,
    DEFAULT_MIN_VARIABILITY, LEARNING_RATE_RANGE, MIN_ERROR_RANGE, MIN_RESOURCE_RANGE,
    MIN_VARIABILITY_RANGE,
};
pub use model::SotaModel;
pub use settings::{keys, SettingValue, Settings};
