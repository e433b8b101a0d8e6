//! Named settings map for [`SotaConfig`].
//!
//! Hosts that persist node settings as key/value pairs use [`Settings`]. The
//! map serializes to a flat JSON object:
//!
//! ```json
//! {"distance": "euclidean", "learningrateWinner": 0.1, "useVariability": false}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigViolation, SotaConfig};
use crate::training::DistanceMetric;

/// Setting keys.
pub mod keys {
    pub const LR_WINNER: &str = "learningrateWinner";
    pub const LR_ANCESTOR: &str = "learningrateAncestor";
    pub const LR_SISTER: &str = "learningrateSister";
    pub const MIN_ERROR: &str = "minError";
    pub const MIN_RESOURCE: &str = "minResource";
    pub const MIN_VARIABILITY: &str = "minVariability";
    pub const USE_VARIABILITY: &str = "useVariability";
    pub const DISTANCE: &str = "distance";
}

/// A single setting value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Double(f64),
    Str(String),
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Double(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Str(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Str(v)
    }
}

/// Ordered key/value settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Collects typed reads and their violations.
struct SettingsReader<'s> {
    settings: &'s Settings,
    violations: Vec<ConfigViolation>,
}

impl<'s> SettingsReader<'s> {
    fn lookup(&mut self, key: &str) -> Option<&'s SettingValue> {
        let value = self.settings.get(key);
        if value.is_none() {
            self.violations
                .push(ConfigViolation::MissingSetting(key.to_string()));
        }
        value
    }

    fn wrong_type(&mut self, key: &str, expected: &'static str) {
        self.violations.push(ConfigViolation::WrongType {
            key: key.to_string(),
            expected,
        });
    }

    fn double(&mut self, key: &str) -> Option<f64> {
        match self.lookup(key)? {
            SettingValue::Double(v) => Some(*v),
            _ => {
                self.wrong_type(key, "number");
                None
            }
        }
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.lookup(key)? {
            SettingValue::Bool(v) => Some(*v),
            _ => {
                self.wrong_type(key, "boolean");
                None
            }
        }
    }

    fn distance(&mut self, key: &str) -> Option<DistanceMetric> {
        match self.lookup(key)? {
            SettingValue::Str(name) => match name.parse() {
                Ok(metric) => Some(metric),
                Err(_) => {
                    self.violations
                        .push(ConfigViolation::UnknownDistance(name.clone()));
                    None
                }
            },
            _ => {
                self.wrong_type(key, "string");
                None
            }
        }
    }
}

impl SotaConfig {
    /// Write the named settings of this configuration into `settings`.
    pub fn save_settings(&self, settings: &mut Settings) {
        settings.insert(keys::LR_WINNER, self.lr_winner);
        settings.insert(keys::LR_ANCESTOR, self.lr_ancestor);
        settings.insert(keys::LR_SISTER, self.lr_sister);
        settings.insert(keys::MIN_ERROR, self.min_error);
        settings.insert(keys::MIN_RESOURCE, self.min_resource);
        settings.insert(keys::MIN_VARIABILITY, self.min_variability);
        settings.insert(keys::USE_VARIABILITY, self.use_variability);
        settings.insert(keys::DISTANCE, self.distance.as_str());
    }

    /// The named settings of this configuration.
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        self.save_settings(&mut settings);
        settings
    }

    /// Check `settings` without applying them.
    ///
    /// # Errors
    ///
    /// Returns every missing key, wrongly typed value, unknown distance name
    /// and out-of-range parameter at once.
    pub fn validate_settings(&self, settings: &Settings) -> Result<(), ConfigError> {
        self.read_settings(settings).map(|_| ())
    }

    /// Read, validate and apply `settings`.
    ///
    /// Nothing is applied unless every setting is valid. Fields without a
    /// named setting (parallelism, verbosity, hierarchical training) keep
    /// their current values.
    pub fn load_settings(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        *self = self.read_settings(settings)?;
        Ok(())
    }

    fn read_settings(&self, settings: &Settings) -> Result<SotaConfig, ConfigError> {
        let mut reader = SettingsReader {
            settings,
            violations: Vec::new(),
        };

        let lr_winner = reader.double(keys::LR_WINNER);
        let lr_ancestor = reader.double(keys::LR_ANCESTOR);
        let lr_sister = reader.double(keys::LR_SISTER);
        let min_error = reader.double(keys::MIN_ERROR);
        let min_resource = reader.double(keys::MIN_RESOURCE);
        let min_variability = reader.double(keys::MIN_VARIABILITY);
        let use_variability = reader.boolean(keys::USE_VARIABILITY);
        let distance = reader.distance(keys::DISTANCE);

        let mut config = self.clone();
        if let Some(v) = lr_winner {
            config.lr_winner = v;
        }
        if let Some(v) = lr_ancestor {
            config.lr_ancestor = v;
        }
        if let Some(v) = lr_sister {
            config.lr_sister = v;
        }
        if let Some(v) = min_error {
            config.min_error = v;
        }
        if let Some(v) = min_resource {
            config.min_resource = v;
        }
        if let Some(v) = min_variability {
            config.min_variability = v;
        }
        if let Some(v) = use_variability {
            config.use_variability = v;
        }
        if let Some(v) = distance {
            config.distance = v;
        }

        let mut violations = reader.violations;
        violations.extend(config.range_violations());
        if violations.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError { violations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_restores_config() {
        let config = SotaConfig::builder()
            .lr_winner(0.2)
            .min_resource(0.5)
            .use_variability(true)
            .distance(DistanceMetric::Correlation)
            .build()
            .unwrap();

        let settings = config.to_settings();
        assert_eq!(settings.len(), 8);
        assert_eq!(
            settings.get(keys::DISTANCE),
            Some(&SettingValue::Str("correlation".into()))
        );

        let mut loaded = SotaConfig::default();
        loaded.load_settings(&settings).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn settings_serialize_as_flat_json() {
        let settings = SotaConfig::default().to_settings();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"useVariability\":false"));
        assert!(json.contains("\"distance\":\"euclidean\""));

        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn integer_json_numbers_read_as_doubles() {
        let mut settings: Settings = serde_json::from_str(
            r#"{"learningrateWinner": 1, "learningrateAncestor": 0.05,
                "learningrateSister": 0.01, "minError": 0, "minResource": 2,
                "minVariability": 0, "useVariability": true,
                "distance": "Coefficient of Correlation"}"#,
        )
        .unwrap();

        let mut config = SotaConfig::default();
        config.load_settings(&settings).unwrap();
        assert_eq!(config.lr_winner, 1.0);
        assert_eq!(config.min_resource, 2.0);
        assert_eq!(config.distance, DistanceMetric::Correlation);

        settings.remove(keys::MIN_ERROR);
        assert!(config.validate_settings(&settings).is_err());
    }

    #[test]
    fn all_problems_are_reported_together() {
        let mut settings = SotaConfig::default().to_settings();
        settings.remove(keys::LR_SISTER);
        settings.insert(keys::USE_VARIABILITY, "yes");
        settings.insert(keys::DISTANCE, "manhattan");
        settings.insert(keys::MIN_ERROR, 3.0);

        let err = SotaConfig::default().validate_settings(&settings).unwrap_err();
        assert_eq!(err.violations.len(), 4);
        assert!(err
            .violations
            .contains(&ConfigViolation::MissingSetting(keys::LR_SISTER.into())));
        assert!(err.violations.contains(&ConfigViolation::WrongType {
            key: keys::USE_VARIABILITY.into(),
            expected: "boolean",
        }));
        assert!(err
            .violations
            .contains(&ConfigViolation::UnknownDistance("manhattan".into())));
    }

    #[test]
    fn failed_load_leaves_config_untouched() {
        let mut settings = SotaConfig::default().to_settings();
        settings.insert(keys::LR_WINNER, 0.5);
        settings.insert(keys::MIN_RESOURCE, -1.0);

        let mut config = SotaConfig::default();
        assert!(config.load_settings(&settings).is_err());
        assert_eq!(config, SotaConfig::default());
    }
}
