//! Shared test fixtures and tolerances.
//!
//! Used by unit tests, integration tests and benchmarks. Fixture builders
//! panic on invalid input.

use crate::data::{ColumnMeta, FuzzyInterval, Table, Value};
use crate::repr::pmml::{
    ArrayType, DecisionTree, DecisionTreeNode, MissingValueStrategy, Predicate, SetOperator,
    SimpleOperator, ValueSet,
};
use crate::repr::sota::SotaTree;

/// Absolute tolerance for floating point comparisons in tests.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Tables
// =============================================================================

/// One numeric column holding `0, 1, 10, 11`.
pub fn four_points() -> Table {
    numeric_table(&[&[0.0], &[1.0], &[10.0], &[11.0]])
}

/// Numeric table with columns `x0..xN`. `NaN` entries become missing cells.
pub fn numeric_table(rows: &[&[f64]]) -> Table {
    let n_cols = rows.first().map_or(0, |r| r.len());
    let columns = (0..n_cols).map(|i| ColumnMeta::numeric(format!("x{i}"))).collect();
    rows.iter()
        .fold(Table::builder(columns), |b, r| b.row(r.iter().copied()))
        .build()
        .expect("numeric rows must have equal length")
}

/// Two well separated groups of `n_per_group` rows in `dims` dimensions.
///
/// Group A sits around the origin, group B around `separation` in every
/// dimension. Rows alternate within each group by a small deterministic
/// offset so no two rows coincide.
pub fn two_groups(n_per_group: usize, dims: usize, separation: f64) -> Table {
    let columns = (0..dims).map(|i| ColumnMeta::numeric(format!("x{i}"))).collect();
    let mut builder = Table::builder(columns);
    for base in [0.0, separation] {
        for i in 0..n_per_group {
            let offset = (i % 5) as f64 * 0.1 + (i / 5) as f64 * 0.01;
            builder = builder.row((0..dims).map(|d| base + offset + d as f64 * 0.05));
        }
    }
    builder.build().expect("generated rows are well formed")
}

/// One fuzzy column with crisp intervals `[c - 0.5, c + 0.5]` per centre.
pub fn fuzzy_table(centres: &[f64]) -> Table {
    centres
        .iter()
        .fold(Table::builder(vec![ColumnMeta::fuzzy("f")]), |b, &c| {
            b.row([Value::Fuzzy(FuzzyInterval::crisp(c - 0.5, c + 0.5))])
        })
        .build()
        .expect("fuzzy rows are well formed")
}

// =============================================================================
// Trees
// =============================================================================

/// Row ids held by the leaves of `tree`, sorted.
pub fn leaf_row_ids(tree: &SotaTree) -> Vec<usize> {
    let mut ids: Vec<usize> = tree
        .leaves()
        .into_iter()
        .flat_map(|leaf| tree.cell(leaf).data_ids().to_vec())
        .collect();
    ids.sort_unstable();
    ids
}

/// Classic "play tennis" classification tree.
///
/// ```text
/// 0: true                       yes 9 / no 5
/// ├── 1: outlook isIn {sunny}   no 3 / yes 2
/// │   ├── 3: humidity > 70      → no
/// │   └── 4: humidity <= 70     → yes
/// ├── 2: outlook isIn {overcast} → yes
/// └── 5: outlook isIn {rain}    yes 3 / no 2
///     ├── 6: windy == "true"    → no
///     └── 7: windy == "false"   → yes
/// ```
pub fn weather_tree(strategy: MissingValueStrategy) -> DecisionTree {
    let counts = |pairs: &[(&str, f64)]| -> Vec<(String, f64)> {
        pairs.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    };
    let outlook = |values: &[&str]| {
        let set = ValueSet::from_tokens(ArrayType::String, values)
            .expect("string tokens always parse");
        Predicate::set("outlook", SetOperator::IsIn, set)
    };

    let sunny = DecisionTreeNode::new(1, outlook(&["sunny"]))
        .with_class_counts(counts(&[("no", 3.0), ("yes", 2.0)]))
        .with_default_child(3)
        .with_children(vec![
            DecisionTreeNode::new(3, Predicate::simple("humidity", SimpleOperator::GreaterThan, "70"))
                .with_score("no"),
            DecisionTreeNode::new(4, Predicate::simple("humidity", SimpleOperator::LessOrEqual, "70"))
                .with_score("yes"),
        ]);
    let overcast = DecisionTreeNode::new(2, outlook(&["overcast"])).with_score("yes");
    let rain = DecisionTreeNode::new(5, outlook(&["rain"]))
        .with_class_counts(counts(&[("yes", 3.0), ("no", 2.0)]))
        .with_children(vec![
            DecisionTreeNode::new(6, Predicate::simple("windy", SimpleOperator::Equal, "true"))
                .with_score("no"),
            DecisionTreeNode::new(7, Predicate::simple("windy", SimpleOperator::Equal, "false"))
                .with_score("yes"),
        ]);

    let root = DecisionTreeNode::new(0, Predicate::True)
        .with_class_counts(counts(&[("yes", 9.0), ("no", 5.0)]))
        .with_children(vec![sunny, overcast, rain]);

    DecisionTree::builder()
        .root(root)
        .predicted_field("play")
        .missing_value_strategy(strategy)
        .build()
}

/// Table matching [`weather_tree`]'s fields.
pub fn weather_table(rows: &[(&str, Option<f64>, &str)]) -> Table {
    let columns = vec![
        ColumnMeta::nominal("outlook"),
        ColumnMeta::numeric("humidity"),
        ColumnMeta::nominal("windy"),
    ];
    rows.iter()
        .fold(Table::builder(columns), |b, (outlook, humidity, windy)| {
            b.row([Value::from(*outlook), Value::from(*humidity), Value::from(*windy)])
        })
        .build()
        .expect("weather rows are well formed")
}
