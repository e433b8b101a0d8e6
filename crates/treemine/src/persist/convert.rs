//! Conversion between runtime types and schema types.
//!
//! Runtime to schema conversions are lossless `From` impls. The reverse
//! direction is `TryFrom` and validates what it reads: config ranges, tree
//! structure and prototype dimensions.

use super::error::ReadError;
use super::schema::{
    CellValueSchema, ClassCountSchema, SotaConfigSchema, SotaModelSchema, SotaTreeSchema,
    TreeCellSchema, VerbositySchema, SCHEMA_VERSION,
};
use crate::data::FuzzyInterval;
use crate::model::sota::{SotaConfig, SotaModel};
use crate::repr::sota::{CellId, CellKind, CellValue, ClassCounter, SotaTree, TreeCell};
use crate::training::{DistanceMetric, Verbosity};
use crate::utils::Parallelism;

// =============================================================================
// Config
// =============================================================================

impl From<Verbosity> for VerbositySchema {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Silent => Self::Silent,
            Verbosity::Warning => Self::Warning,
            Verbosity::Info => Self::Info,
            Verbosity::Debug => Self::Debug,
        }
    }
}

impl From<VerbositySchema> for Verbosity {
    fn from(v: VerbositySchema) -> Self {
        match v {
            VerbositySchema::Silent => Self::Silent,
            VerbositySchema::Warning => Self::Warning,
            VerbositySchema::Info => Self::Info,
            VerbositySchema::Debug => Self::Debug,
        }
    }
}

impl From<&SotaConfig> for SotaConfigSchema {
    fn from(config: &SotaConfig) -> Self {
        Self {
            lr_winner: config.lr_winner,
            lr_ancestor: config.lr_ancestor,
            lr_sister: config.lr_sister,
            min_variability: config.min_variability,
            min_resource: config.min_resource,
            min_error: config.min_error,
            use_variability: config.use_variability,
            distance: config.distance.as_str().to_string(),
            use_hierarchical_fuzzy_data: config.use_hierarchical_fuzzy_data,
            parallel: config.parallelism.is_parallel(),
            verbosity: config.verbosity.into(),
        }
    }
}

impl TryFrom<SotaConfigSchema> for SotaConfig {
    type Error = ReadError;

    fn try_from(schema: SotaConfigSchema) -> Result<Self, Self::Error> {
        let distance: DistanceMetric = schema
            .distance
            .parse()
            .map_err(|e| ReadError::Validation(format!("{e}")))?;

        let config = SotaConfig {
            lr_winner: schema.lr_winner,
            lr_ancestor: schema.lr_ancestor,
            lr_sister: schema.lr_sister,
            min_variability: schema.min_variability,
            min_resource: schema.min_resource,
            min_error: schema.min_error,
            use_variability: schema.use_variability,
            distance,
            use_hierarchical_fuzzy_data: schema.use_hierarchical_fuzzy_data,
            parallelism: if schema.parallel {
                Parallelism::Parallel
            } else {
                Parallelism::Sequential
            },
            verbosity: schema.verbosity.into(),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Cells
// =============================================================================

impl From<&CellValue> for CellValueSchema {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Scalar(v) => Self::Scalar { value: *v },
            CellValue::Fuzzy(f) => {
                let [min_support, min_core, max_core, max_support] = f.bounds();
                Self::Fuzzy {
                    min_support,
                    min_core,
                    max_core,
                    max_support,
                }
            }
        }
    }
}

impl From<CellValueSchema> for CellValue {
    fn from(schema: CellValueSchema) -> Self {
        match schema {
            CellValueSchema::Scalar { value } => CellValue::Scalar(value),
            CellValueSchema::Fuzzy {
                min_support,
                min_core,
                max_core,
                max_support,
            } => CellValue::Fuzzy(FuzzyInterval::from_bounds([
                min_support,
                min_core,
                max_core,
                max_support,
            ])),
        }
    }
}

impl From<&TreeCell> for TreeCellSchema {
    fn from(cell: &TreeCell) -> Self {
        Self {
            data: cell.data.iter().map(CellValueSchema::from).collect(),
            is_leaf: cell.is_leaf,
            left: cell.left.map(|c| c.0),
            right: cell.right.map(|c| c.0),
            ancestor: cell.ancestor.map(|c| c.0),
            sister: cell.sister.map(|c| c.0),
            resource: cell.resource,
            max_distance: cell.max_distance,
            level: cell.level,
            hierarchy_level: cell.hierarchy_level,
            level_in_hierarchy: cell.level_in_hierarchy,
            data_ids: cell.data_ids.clone(),
            row_keys: cell.row_keys.clone(),
            classes: cell
                .classes
                .iter()
                .map(|(class, count)| ClassCountSchema {
                    class: class.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

impl From<TreeCellSchema> for TreeCell {
    fn from(schema: TreeCellSchema) -> Self {
        Self {
            data: schema.data.into_iter().map(CellValue::from).collect(),
            is_leaf: schema.is_leaf,
            left: schema.left.map(CellId),
            right: schema.right.map(CellId),
            ancestor: schema.ancestor.map(CellId),
            sister: schema.sister.map(CellId),
            resource: schema.resource,
            max_distance: schema.max_distance,
            level: schema.level,
            hierarchy_level: schema.hierarchy_level,
            level_in_hierarchy: schema.level_in_hierarchy,
            data_ids: schema.data_ids,
            row_keys: schema.row_keys,
            classes: ClassCounter::from_counts(
                schema
                    .classes
                    .into_iter()
                    .map(|c| (c.class, c.count))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

impl From<&SotaTree> for SotaTreeSchema {
    fn from(tree: &SotaTree) -> Self {
        Self {
            cells: tree.cells().iter().map(TreeCellSchema::from).collect(),
        }
    }
}

impl TryFrom<SotaTreeSchema> for SotaTree {
    type Error = ReadError;

    fn try_from(schema: SotaTreeSchema) -> Result<Self, Self::Error> {
        let cells: Vec<TreeCell> = schema.cells.into_iter().map(TreeCell::from).collect();
        let tree = SotaTree::from_cells(cells);
        tree.validate()?;

        let root = tree.root();
        if root.ancestor().is_some() || root.sister().is_some() {
            return Err(ReadError::Validation(
                "root cell must not have an ancestor or sister".into(),
            ));
        }
        Ok(tree)
    }
}

// =============================================================================
// Model
// =============================================================================

impl From<&SotaModel> for SotaModelSchema {
    fn from(model: &SotaModel) -> Self {
        Self {
            version: SCHEMA_VERSION,
            model_type: Self::MODEL_TYPE.to_string(),
            config: model.config().into(),
            feature_columns: model.feature_columns().to_vec(),
            fuzzy: model.is_fuzzy(),
            tree: model.tree().into(),
        }
    }
}

impl TryFrom<SotaModelSchema> for SotaModel {
    type Error = ReadError;

    fn try_from(schema: SotaModelSchema) -> Result<Self, Self::Error> {
        if schema.version > SCHEMA_VERSION {
            return Err(ReadError::UnsupportedVersion {
                found: schema.version,
                supported: SCHEMA_VERSION,
            });
        }
        if schema.model_type != SotaModelSchema::MODEL_TYPE {
            return Err(ReadError::WrongModelType {
                expected: SotaModelSchema::MODEL_TYPE,
                found: schema.model_type,
            });
        }

        let config = SotaConfig::try_from(schema.config)?;
        let tree = SotaTree::try_from(schema.tree)?;

        if tree.dimension() != schema.feature_columns.len() {
            return Err(ReadError::Validation(format!(
                "cells have {} values but {} feature columns are named",
                tree.dimension(),
                schema.feature_columns.len()
            )));
        }

        let kind = if schema.fuzzy {
            CellKind::Fuzzy
        } else {
            CellKind::Scalar
        };
        let mixed = tree
            .iter()
            .flat_map(|(_, cell)| cell.data())
            .any(|v| v.kind() != kind);
        if mixed {
            return Err(ReadError::Validation(format!(
                "model is {} but holds cells of another kind",
                if schema.fuzzy { "fuzzy" } else { "scalar" }
            )));
        }

        Ok(SotaModel::from_parts(
            tree,
            config,
            schema.feature_columns,
            schema.fuzzy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_tree() -> SotaTree {
        let mut tree = SotaTree::new(vec![CellValue::Scalar(5.0)]);
        tree.split(tree.root_id(), 1);
        let leaves = tree.leaves();
        tree.cell_mut(leaves[0]).data_ids_mut().extend([0, 1]);
        tree.cell_mut(leaves[0]).add_class(Some("a"));
        tree.cell_mut(leaves[1]).set_resource(0.5);
        tree
    }

    #[test]
    fn tree_roundtrip_keeps_every_field() {
        let tree = split_tree();
        let schema = SotaTreeSchema::from(&tree);
        assert_eq!(schema.cells.len(), 3);
        assert_eq!(schema.cells[0].left, Some(1));
        assert_eq!(schema.cells[1].classes[0].class, "a");

        let back = SotaTree::try_from(schema).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn broken_links_are_rejected() {
        let mut schema = SotaTreeSchema::from(&split_tree());
        schema.cells[2].sister = Some(2);
        assert!(matches!(
            SotaTree::try_from(schema),
            Err(ReadError::InvalidTree(_))
        ));

        let mut schema = SotaTreeSchema::from(&split_tree());
        schema.cells[0].sister = Some(1);
        assert!(matches!(
            SotaTree::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn config_is_validated_on_read() {
        let mut schema = SotaConfigSchema::from(&SotaConfig::default());
        assert_eq!(SotaConfig::try_from(schema.clone()).unwrap(), SotaConfig::default());

        schema.lr_winner = 3.0;
        assert!(matches!(
            SotaConfig::try_from(schema.clone()),
            Err(ReadError::InvalidConfig(_))
        ));

        schema.lr_winner = 0.1;
        schema.distance = "cosine".into();
        assert!(matches!(
            SotaConfig::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }

    #[test]
    fn model_kind_must_match_cells() {
        let model = SotaModel::from_parts(
            split_tree(),
            SotaConfig::default(),
            vec!["x".into()],
            false,
        );
        let mut schema = SotaModelSchema::from(&model);
        assert_eq!(SotaModel::try_from(schema.clone()).unwrap(), model);

        schema.fuzzy = true;
        assert!(matches!(
            SotaModel::try_from(schema.clone()),
            Err(ReadError::Validation(_))
        ));

        schema.fuzzy = false;
        schema.feature_columns.push("y".into());
        assert!(matches!(
            SotaModel::try_from(schema),
            Err(ReadError::Validation(_))
        ));
    }
}
