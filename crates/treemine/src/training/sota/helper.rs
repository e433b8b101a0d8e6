//! Cell-kind specific training operations.

use crate::data::{ColumnKind, DataTable, Row, TableSchema, Value};
use crate::repr::sota::{CellKind, SotaTree, TreeCell};
use crate::training::{ExecutionMonitor, TrainingError};

/// Initializes and adjusts cells of one [`CellKind`].
///
/// The helper owns the list of active columns: numeric columns for scalar
/// training, fuzzy interval columns for fuzzy training.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingHelper {
    kind: CellKind,
    columns: Vec<usize>,
}

impl TrainingHelper {
    /// Create a helper for the active columns of `schema`.
    ///
    /// # Errors
    ///
    /// [`TrainingError::NoFeatureColumns`] if the schema has no column of the
    /// active kind.
    pub fn new(schema: &TableSchema, kind: CellKind) -> Result<Self, TrainingError> {
        let (column_kind, label) = match kind {
            CellKind::Scalar => (ColumnKind::Numeric, "numeric"),
            CellKind::Fuzzy => (ColumnKind::FuzzyInterval, "fuzzy interval"),
        };
        let columns = schema.indices_of(column_kind);
        if columns.is_empty() {
            return Err(TrainingError::NoFeatureColumns(label));
        }
        Ok(Self { kind, columns })
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    #[inline]
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Number of prototype values per cell.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.columns.len()
    }

    /// Whether `row` has a value in every active column.
    #[inline]
    pub fn is_complete(&self, row: &Row) -> bool {
        self.columns.iter().all(|&c| !row.is_missing(c))
    }

    /// Build the initial tree over the given table rows.
    ///
    /// The root holds the column-wise mean of the complete rows and is split
    /// once, tagging its children with `hierarchy_level`.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::NoTrainingRows`] if no row is complete
    /// - [`TrainingError::Cancelled`] if the monitor cancels
    pub fn initialize_tree(
        &self,
        data: &dyn DataTable,
        rows: &[usize],
        hierarchy_level: u32,
        monitor: &dyn ExecutionMonitor,
    ) -> Result<SotaTree, TrainingError> {
        let mut complete: Vec<Vec<&Value>> = Vec::with_capacity(rows.len());
        for &r in rows {
            monitor.check_cancelled()?;
            let row = data.row(r);
            if self.is_complete(row) {
                complete.push(self.columns.iter().map(|&c| row.cell(c)).collect());
            }
        }

        let mean = self
            .kind
            .create_mean(self.dimension(), complete)
            .ok_or(TrainingError::NoTrainingRows)?;

        let mut tree = SotaTree::new(mean);
        tree.split(tree.root_id(), hierarchy_level);
        Ok(tree)
    }

    /// Move `cell` towards `row` by `rate` and record `class`.
    ///
    /// Incomplete rows leave the cell untouched.
    pub fn adjust_cell(&self, cell: &mut TreeCell, row: &Row, rate: f64, class: Option<&str>) {
        if !self.is_complete(row) {
            return;
        }
        for (value, &c) in cell.data_mut().iter_mut().zip(&self.columns) {
            value.adjust(row.cell(c), rate);
        }
        cell.add_class(class);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::{ColumnMeta, FuzzyInterval, Table};
    use crate::repr::sota::CellValue;
    use crate::training::NoopMonitor;

    fn mixed_table() -> Table {
        Table::builder(vec![
            ColumnMeta::numeric("a"),
            ColumnMeta::nominal("class"),
            ColumnMeta::numeric("b"),
        ])
        .row([Value::Double(1.0), Value::from("x"), Value::Double(10.0)])
        .row([Value::Double(3.0), Value::from("y"), Value::Double(20.0)])
        .row([Value::Missing, Value::from("y"), Value::Double(99.0)])
        .build()
        .unwrap()
    }

    #[test]
    fn dimension_counts_active_columns() {
        let table = mixed_table();
        let helper = TrainingHelper::new(table.schema(), CellKind::Scalar).unwrap();
        assert_eq!(helper.dimension(), 2);
        assert_eq!(helper.columns(), &[0, 2]);

        assert_eq!(
            TrainingHelper::new(table.schema(), CellKind::Fuzzy),
            Err(TrainingError::NoFeatureColumns("fuzzy interval"))
        );
    }

    #[test]
    fn initial_tree_holds_mean_of_complete_rows() {
        let table = mixed_table();
        let helper = TrainingHelper::new(table.schema(), CellKind::Scalar).unwrap();
        let tree = helper
            .initialize_tree(&table, &[0, 1, 2], 1, &NoopMonitor)
            .unwrap();

        assert_eq!(tree.n_cells(), 3);
        assert_eq!(tree.root().values(), vec![2.0, 15.0]);
        for leaf in tree.leaves() {
            assert_eq!(tree.cell(leaf).values(), vec![2.0, 15.0]);
            assert_eq!(tree.cell(leaf).level(), 2);
        }
    }

    #[test]
    fn no_complete_rows_is_an_error() {
        let table = mixed_table();
        let helper = TrainingHelper::new(table.schema(), CellKind::Scalar).unwrap();
        assert_eq!(
            helper.initialize_tree(&table, &[2], 1, &NoopMonitor),
            Err(TrainingError::NoTrainingRows)
        );
    }

    #[test]
    fn adjust_skips_incomplete_rows() {
        let table = mixed_table();
        let helper = TrainingHelper::new(table.schema(), CellKind::Scalar).unwrap();
        let mut cell = TreeCell::leaf(vec![CellValue::Scalar(0.0), CellValue::Scalar(0.0)], 1);

        helper.adjust_cell(&mut cell, table.row(2), 0.5, Some("y"));
        assert_eq!(cell.values(), vec![0.0, 0.0]);
        assert!(cell.classes().is_empty());

        helper.adjust_cell(&mut cell, table.row(0), 0.5, Some("x"));
        assert_abs_diff_eq!(cell.values()[0], 0.5);
        assert_abs_diff_eq!(cell.values()[1], 5.0);
        assert_eq!(cell.class_label(), "x");
    }

    #[test]
    fn fuzzy_helper_uses_interval_columns() {
        let table = Table::builder(vec![ColumnMeta::fuzzy("f"), ColumnMeta::numeric("n")])
            .row([Value::Fuzzy(FuzzyInterval::new(0.0, 1.0, 3.0, 4.0)), Value::Double(7.0)])
            .row([Value::Fuzzy(FuzzyInterval::new(2.0, 3.0, 5.0, 6.0)), Value::Double(9.0)])
            .build()
            .unwrap();
        let helper = TrainingHelper::new(table.schema(), CellKind::Fuzzy).unwrap();
        assert_eq!(helper.dimension(), 1);

        let tree = helper.initialize_tree(&table, &[0, 1], 1, &NoopMonitor).unwrap();
        assert_eq!(
            tree.root().data(),
            &[CellValue::Fuzzy(FuzzyInterval::new(1.0, 2.0, 4.0, 5.0))]
        );
    }
}
