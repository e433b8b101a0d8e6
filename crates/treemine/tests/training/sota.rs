//! SOTA training integration tests.
//!
//! Focused on the partition and resource invariants and on the observable
//! outcome of full training runs.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use treemine::data::{ColumnMeta, FuzzyInterval, Table, Value};
use treemine::model::sota::{SotaConfig, SotaModel};
use treemine::repr::sota::{CellId, CellKind, CellValue, SotaTree, DEFAULT_CLASS};
use treemine::testing::{
    four_points, fuzzy_table, leaf_row_ids, numeric_table, two_groups, DEFAULT_TOLERANCE,
};
use treemine::training::sota::{DistanceManager, DistanceMetric};
use treemine::training::{CancellationToken, NoopMonitor, SotaManager, TrainingError};

/// Row ids held by the leaves below one child of the root.
fn rows_under(tree: &SotaTree, id: CellId) -> Vec<usize> {
    let mut ids: Vec<usize> = tree
        .leaves_under(id)
        .into_iter()
        .flat_map(|leaf| tree.cell(leaf).data_ids().to_vec())
        .collect();
    ids.sort_unstable();
    ids
}

fn quick_config() -> SotaConfig {
    SotaConfig::builder().min_error(0.5).build().unwrap()
}

// =============================================================================
// Full training runs
// =============================================================================

#[test]
fn four_points_split_into_single_row_leaves() {
    let table = four_points();
    let model = SotaModel::train(&table, None, SotaConfig::default(), &NoopMonitor).unwrap();
    let tree = model.tree();

    tree.validate().expect("trained tree should be structurally valid");
    assert_eq!(tree.n_leaves(), 4);
    assert_eq!(leaf_row_ids(tree), vec![0, 1, 2, 3]);
    for leaf in tree.leaves() {
        assert_eq!(tree.cell(leaf).data_ids().len(), 1);
    }

    let root = tree.root();
    let left = rows_under(tree, root.left().unwrap());
    let right = rows_under(tree, root.right().unwrap());
    assert_eq!(left, vec![0, 1]);
    assert_eq!(right, vec![2, 3]);
}

#[test]
fn coarse_resource_threshold_stops_at_two_groups() {
    let table = two_groups(10, 2, 20.0);
    let config = SotaConfig::builder().min_resource(8.0).build().unwrap();
    let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();
    let tree = model.tree();

    assert_eq!(tree.n_leaves(), 2);
    let leaves = tree.leaves();
    assert_eq!(tree.cell(leaves[0]).data_ids(), (0..10).collect::<Vec<_>>());
    assert_eq!(tree.cell(leaves[1]).data_ids(), (10..20).collect::<Vec<_>>());

    // Sister updates keep prototypes off the group centres, but on their side.
    assert!(tree.cell(leaves[0]).data()[0].value() < 10.0);
    assert!(tree.cell(leaves[1]).data()[0].value() > 10.0);
    assert_eq!(model.feature_columns(), ["x0", "x1"]);
}

#[test]
fn variability_criterion_stops_when_leaves_are_tight() {
    let table = two_groups(6, 2, 30.0);
    let config = SotaConfig::builder()
        .use_variability(true)
        .min_variability(2.0)
        .build()
        .unwrap();
    let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();
    let tree = model.tree();

    assert_eq!(tree.n_leaves(), 2);
    for leaf in tree.leaves() {
        let cell = tree.cell(leaf);
        assert!(cell.max_distance() <= 2.0);
        assert_eq!(cell.data_ids().len(), 6);
    }
}

#[test]
fn rows_with_missing_values_are_never_assigned() {
    let table = numeric_table(&[&[0.0], &[1.0], &[f64::NAN], &[10.0], &[11.0]]);
    let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
    let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();

    assert_eq!(leaf_row_ids(model.tree()), vec![0, 1, 3, 4]);
}

#[test]
fn table_without_complete_rows_is_rejected() {
    let table = numeric_table(&[&[f64::NAN], &[f64::NAN]]);
    let err = SotaModel::train(&table, None, SotaConfig::default(), &NoopMonitor).unwrap_err();
    assert!(matches!(err, TrainingError::NoTrainingRows));
}

#[test]
fn fuzzy_table_trains_fuzzy_cells() {
    let table = fuzzy_table(&[0.0, 1.0, 10.0, 11.0]);
    let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
    let model = SotaModel::train(&table, None, config, &NoopMonitor).unwrap();
    let tree = model.tree();

    assert!(model.is_fuzzy());
    assert!(tree
        .iter()
        .flat_map(|(_, cell)| cell.data())
        .all(|v| v.kind() == CellKind::Fuzzy));

    let leaves = tree.leaves();
    assert_eq!(leaves.len(), 2);
    assert_eq!(tree.cell(leaves[0]).data_ids(), [0, 1]);
    assert_eq!(tree.cell(leaves[1]).data_ids(), [2, 3]);
    assert!(tree.cell(leaves[0]).data()[0].value() < 5.0);
}

#[test]
fn class_labels_are_counted_on_assignment() {
    let columns = vec![ColumnMeta::numeric("x"), ColumnMeta::nominal("label")];
    let table = [(0.0, "a"), (1.0, "a"), (10.0, "b"), (11.0, "b")]
        .iter()
        .fold(Table::builder(columns), |b, &(x, label)| {
            b.row([Value::from(x), Value::from(label)])
        })
        .build()
        .unwrap();

    let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
    let model = SotaModel::train(&table, Some(1), config, &NoopMonitor).unwrap();
    let tree = model.tree();

    // The label column is not a feature.
    assert_eq!(model.dimension(), 1);

    let left = tree.cell(tree.leaves()[0]);
    assert_eq!(left.classes().count("a"), 2);
    assert_eq!(left.class_label(), "a");

    let unlabeled = SotaModel::train(
        &table,
        None,
        SotaConfig::builder().min_resource(5.0).build().unwrap(),
        &NoopMonitor,
    )
    .unwrap();
    for leaf in unlabeled.tree().leaves() {
        assert_eq!(unlabeled.tree().cell(leaf).class_label(), DEFAULT_CLASS);
    }
}

#[test]
fn bad_class_column_is_rejected() {
    let table = four_points();
    let err = SotaModel::train(&table, Some(3), SotaConfig::default(), &NoopMonitor).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::ClassColumnOutOfRange {
            column: 3,
            n_columns: 1
        }
    ));
}

// =============================================================================
// Hierarchical fuzzy training
// =============================================================================

fn leveled_fuzzy_table() -> Table {
    let rows = [(0.0, 1), (1.0, 1), (10.0, 1), (11.0, 1), (0.2, 2), (10.2, 2)];
    let columns = vec![ColumnMeta::fuzzy("f"), ColumnMeta::hierarchy_level("level")];
    rows.iter()
        .fold(Table::builder(columns), |b, &(c, level)| {
            b.row([
                Value::Fuzzy(FuzzyInterval::crisp(c - 0.5, c + 0.5)),
                Value::Int(level),
            ])
        })
        .build()
        .unwrap()
}

#[test]
fn hierarchy_levels_are_trained_in_turn() {
    let table = leveled_fuzzy_table();
    let config = SotaConfig::builder()
        .min_resource(5.0)
        .use_hierarchical_fuzzy_data(true)
        .build()
        .unwrap();

    let mut manager = SotaManager::new(config);
    manager.initialize_tree(&table, None, &NoopMonitor).unwrap();
    assert_eq!(manager.current_hierarchy_level(), 1);
    assert_eq!(manager.max_hierarchy_level(), 2);

    // Only level 1 rows are assigned at first.
    assert_eq!(leaf_row_ids(manager.tree().unwrap()), vec![0, 1, 2, 3]);

    manager.do_training().unwrap();
    assert!(manager.is_trained());

    let tree = manager.tree().unwrap();
    let leaves = tree.leaves();
    assert_eq!(leaves.len(), 2);

    let (left, right) = (tree.cell(leaves[0]), tree.cell(leaves[1]));
    assert_eq!(left.row_keys(), ["Row0", "Row1"]);
    assert_eq!(right.row_keys(), ["Row2", "Row3"]);
    assert_eq!(left.data_ids(), [4]);
    assert_eq!(right.data_ids(), [5]);
}

// =============================================================================
// Step-wise training
// =============================================================================

#[test]
fn epoch_resource_is_mean_distance_to_rows() {
    let table = two_groups(5, 2, 10.0);
    let mut manager = SotaManager::new(quick_config());
    manager.initialize_tree(&table, None, &NoopMonitor).unwrap();

    let error = manager.do_epoch().unwrap();
    let tree = manager.tree().unwrap();
    let distance = DistanceManager::new(DistanceMetric::Euclidean, vec![0, 1]);

    let mut total = 0.0;
    for leaf in tree.leaves() {
        let cell = tree.cell(leaf);
        let ids = cell.data_ids();
        let expected = if ids.is_empty() {
            0.0
        } else {
            ids.iter()
                .map(|&id| distance.row_to_cell(&table.rows()[id], cell.data()))
                .sum::<f64>()
                / ids.len() as f64
        };
        assert_abs_diff_eq!(cell.resource(), expected, epsilon = DEFAULT_TOLERANCE);
        assert!(cell.resource() >= 0.0);
        total += expected;
    }
    assert_abs_diff_eq!(error, total, epsilon = DEFAULT_TOLERANCE);
    assert_eq!(manager.epoch(), 1);
}

#[test]
fn epoch_errors_do_not_increase_within_a_cycle() {
    let table = two_groups(10, 2, 10.0);
    let mut manager = SotaManager::new(SotaConfig::default());
    manager.initialize_tree(&table, None, &NoopMonitor).unwrap();

    let errors: Vec<f64> = (0..8).map(|_| manager.do_epoch().unwrap()).collect();
    // Adjustments settle prototypes; small float noise aside, no epoch undoes
    // the previous one.
    for pair in errors.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-6, "error rose: {errors:?}");
    }
    assert!(errors[7] < errors[0]);
}

#[test]
fn stepping_before_initialization_fails() {
    let mut manager = SotaManager::new(SotaConfig::default());
    assert!(matches!(
        manager.do_epoch(),
        Err(TrainingError::NotInitialized)
    ));
    assert!(matches!(
        manager.do_cycle(),
        Err(TrainingError::NotInitialized)
    ));
    assert!(matches!(
        manager.do_training(),
        Err(TrainingError::NotInitialized)
    ));
}

#[test]
fn cancellation_stops_training_with_a_valid_tree() {
    let table = two_groups(10, 2, 10.0);
    let token = CancellationToken::new();
    let flag = token.clone();
    let token = token.with_progress(move |_, message| {
        if message.starts_with("Cycle") {
            flag.cancel();
        }
    });

    let mut manager = SotaManager::new(SotaConfig::default());
    manager.initialize_tree(&table, None, &token).unwrap();
    let result = manager.do_training();

    assert!(matches!(result, Err(TrainingError::Cancelled)));
    assert!(!manager.is_trained());
    let tree = manager.tree().unwrap();
    tree.validate().unwrap();
    assert_eq!(leaf_row_ids(tree), (0..20).collect::<Vec<_>>());
}

#[test]
fn cancelled_token_fails_initialization() {
    let token = CancellationToken::new();
    token.cancel();
    let err = SotaModel::train(&four_points(), None, SotaConfig::default(), &token).unwrap_err();
    assert!(matches!(err, TrainingError::Cancelled));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// After every cycle the leaves partition the complete rows.
    #[test]
    fn leaves_partition_rows(values in prop::collection::vec(-100.0f64..100.0, 3..24)) {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v, v * 0.5]).collect();
        let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let table = numeric_table(&refs);
        let expected: Vec<usize> = (0..rows.len()).collect();

        let mut manager = SotaManager::new(quick_config());
        manager.initialize_tree(&table, None, &NoopMonitor).unwrap();
        prop_assert_eq!(leaf_row_ids(manager.tree().unwrap()), expected.clone());

        for _ in 0..4 {
            manager.do_cycle().unwrap();
            let tree = manager.tree().unwrap();
            prop_assert!(tree.validate().is_ok());
            prop_assert_eq!(leaf_row_ids(tree), expected.clone());
        }
    }

    /// Repeated adjustment towards one observation converges geometrically.
    #[test]
    fn adjustment_converges(start in -50.0f64..50.0, target in -50.0f64..50.0, rate in 0.05f64..1.0) {
        let mut cell = CellValue::Scalar(start);
        let observed = Value::Double(target);
        let mut gap = (start - target).abs();
        for _ in 0..20 {
            cell.adjust(&observed, rate);
            let next = (cell.value() - target).abs();
            prop_assert!(next <= gap + 1e-12);
            prop_assert!((next - (1.0 - rate) * gap).abs() < 1e-9);
            gap = next;
        }
    }
}
