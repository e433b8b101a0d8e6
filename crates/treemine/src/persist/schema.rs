//! Schema types for model serialization.
//!
//! These types provide a stable serialization format independent of runtime types.
//! Schema types are separate from runtime types for:
//! - Forward/backward compatibility (schema can evolve independently)
//! - Validation during deserialization
//! - Clear migration paths between schema versions

use serde::{Deserialize, Serialize};

/// Current schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Verbosity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbositySchema {
    #[default]
    Silent,
    Warning,
    Info,
    Debug,
}

/// SOTA configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotaConfigSchema {
    pub lr_winner: f64,
    pub lr_ancestor: f64,
    pub lr_sister: f64,
    pub min_variability: f64,
    pub min_resource: f64,
    pub min_error: f64,
    pub use_variability: bool,
    /// Distance metric name (`euclidean` or `correlation`).
    pub distance: String,
    #[serde(default)]
    pub use_hierarchical_fuzzy_data: bool,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub verbosity: VerbositySchema,
}

/// Prototype value schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellValueSchema {
    Scalar {
        value: f64,
    },
    Fuzzy {
        min_support: f64,
        min_core: f64,
        max_core: f64,
        max_support: f64,
    },
}

/// Class label with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCountSchema {
    pub class: String,
    pub count: u64,
}

/// Tree cell schema.
///
/// Links are arena indices; the root is cell 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeCellSchema {
    pub data: Vec<CellValueSchema>,
    pub is_leaf: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sister: Option<u32>,
    pub resource: f64,
    pub max_distance: f64,
    pub level: u32,
    pub hierarchy_level: u32,
    pub level_in_hierarchy: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_ids: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassCountSchema>,
}

/// Tree schema (arena of cells).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotaTreeSchema {
    pub cells: Vec<TreeCellSchema>,
}

/// Full SOTA model schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SotaModelSchema {
    /// Schema version.
    pub version: u32,
    /// Model type string, always [`SotaModelSchema::MODEL_TYPE`].
    pub model_type: String,
    pub config: SotaConfigSchema,
    /// Names of the trained feature columns, in prototype order.
    pub feature_columns: Vec<String>,
    pub fuzzy: bool,
    pub tree: SotaTreeSchema,
}

impl SotaModelSchema {
    /// Model type string.
    pub const MODEL_TYPE: &'static str = "sota";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_values_are_tagged() {
        let json = serde_json::to_string(&CellValueSchema::Scalar { value: 1.5 }).unwrap();
        assert_eq!(json, r#"{"type":"scalar","value":1.5}"#);

        let fuzzy = CellValueSchema::Fuzzy {
            min_support: 0.0,
            min_core: 1.0,
            max_core: 2.0,
            max_support: 3.0,
        };
        let json = serde_json::to_string(&fuzzy).unwrap();
        assert!(json.contains(r#""type":"fuzzy""#));
    }

    #[test]
    fn leaf_links_are_skipped() {
        let cell = TreeCellSchema {
            data: vec![CellValueSchema::Scalar { value: 0.0 }],
            is_leaf: true,
            left: None,
            right: None,
            ancestor: None,
            sister: None,
            resource: 0.0,
            max_distance: 0.0,
            level: 1,
            hierarchy_level: 0,
            level_in_hierarchy: 0,
            data_ids: vec![],
            row_keys: vec![],
            classes: vec![],
        };
        let json = serde_json::to_string(&cell).unwrap();
        assert!(!json.contains("left"));
        assert!(!json.contains("data_ids"));
        assert!(!json.contains("classes"));

        let back: TreeCellSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cell);
    }

    #[test]
    fn config_optional_fields_default() {
        let json = r#"{
            "lr_winner": 0.1, "lr_ancestor": 0.05, "lr_sister": 0.01,
            "min_variability": 0.0, "min_resource": 0.01, "min_error": 0.1,
            "use_variability": false, "distance": "euclidean"
        }"#;
        let config: SotaConfigSchema = serde_json::from_str(json).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.verbosity, VerbositySchema::Silent);
    }
}
