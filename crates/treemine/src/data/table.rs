//! Row storage and the read-only table interface.

use ndarray::ArrayView2;

use super::{ColumnMeta, TableSchema, Value};

// =============================================================================
// DataError
// =============================================================================

/// Errors that can occur when building a table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// Row has a different number of cells than the schema has columns.
    #[error("row {row} has {got} cells, expected {expected}")]
    ArityMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A cell does not fit the kind of its column.
    #[error("row {row}, column '{column}': value {value} does not fit column kind {kind:?}")]
    KindMismatch {
        row: usize,
        column: String,
        kind: super::ColumnKind,
        value: String,
    },

    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

// =============================================================================
// Row
// =============================================================================

/// A keyed row of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    key: String,
    cells: Vec<Value>,
}

impl Row {
    pub fn new(key: impl Into<String>, cells: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cell at `col`, or `Missing` if out of range.
    #[inline]
    pub fn cell(&self, col: usize) -> &Value {
        static MISSING: Value = Value::Missing;
        self.cells.get(col).unwrap_or(&MISSING)
    }

    #[inline]
    pub fn is_missing(&self, col: usize) -> bool {
        self.cell(col).is_missing()
    }

    /// Whether any cell of the row is missing.
    #[inline]
    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(Value::is_missing)
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }
}

// =============================================================================
// DataTable
// =============================================================================

/// Read-only, random-access tabular data.
///
/// This is the narrow interface the training and scoring engines consume.
pub trait DataTable: Sync {
    fn schema(&self) -> &TableSchema;

    fn n_rows(&self) -> usize;

    /// Row at `index`.
    ///
    /// # Panics
    ///
    /// May panic if `index >= n_rows()`.
    fn row(&self, index: usize) -> &Row;
}

/// In-memory table.
#[derive(Clone, Debug)]
pub struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
}

impl Table {
    /// Start building a table with the given columns.
    pub fn builder(columns: Vec<ColumnMeta>) -> TableBuilder {
        TableBuilder::new(columns)
    }

    /// Build an all-numeric table from a sample-major array.
    ///
    /// `NaN` entries become missing cells. Rows are keyed `Row0..RowN`.
    pub fn from_array(data: ArrayView2<'_, f64>) -> Self {
        let schema = TableSchema::all_numeric(data.ncols());
        let rows = data
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, r)| Row::new(format!("Row{i}"), r.iter().map(|&v| Value::from(v)).collect()))
            .collect();
        Self { schema, rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl DataTable for Table {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

// =============================================================================
// TableBuilder
// =============================================================================

/// Builder for [`Table`] that validates rows against the schema.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    columns: Vec<ColumnMeta>,
    rows: Vec<Row>,
}

impl TableBuilder {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row keyed `Row{n}`.
    pub fn row<I, V>(self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let key = format!("Row{}", self.rows.len());
        self.keyed_row(key, cells)
    }

    /// Add a row with an explicit key.
    pub fn keyed_row<I, V>(mut self, key: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows
            .push(Row::new(key, cells.into_iter().map(Into::into).collect()));
        self
    }

    /// Validate and build the table.
    ///
    /// # Errors
    ///
    /// - [`DataError::DuplicateColumn`] if two columns share a name
    /// - [`DataError::ArityMismatch`] if a row has the wrong number of cells
    /// - [`DataError::KindMismatch`] if a cell does not fit its column
    pub fn build(self) -> Result<Table, DataError> {
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(DataError::DuplicateColumn(col.name.clone()));
            }
        }

        for (r, row) in self.rows.iter().enumerate() {
            if row.n_cells() != self.columns.len() {
                return Err(DataError::ArityMismatch {
                    row: r,
                    expected: self.columns.len(),
                    got: row.n_cells(),
                });
            }
            for (value, col) in row.cells().iter().zip(&self.columns) {
                if !value.fits(col.kind) {
                    return Err(DataError::KindMismatch {
                        row: r,
                        column: col.name.clone(),
                        kind: col.kind,
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(Table {
            schema: TableSchema::new(self.columns),
            rows: self.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::data::ColumnKind;

    #[test]
    fn builder_builds_valid_table() {
        let table = Table::builder(vec![ColumnMeta::numeric("x"), ColumnMeta::nominal("c")])
            .row([Value::Double(1.0), Value::from("a")])
            .keyed_row("k", [Value::Missing, Value::from("b")])
            .build()
            .unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.row(0).key(), "Row0");
        assert_eq!(table.row(1).key(), "k");
        assert!(table.row(1).has_missing());
        assert!(!table.row(0).has_missing());
    }

    #[test]
    fn builder_rejects_wrong_arity() {
        let err = Table::builder(vec![ColumnMeta::numeric("x")])
            .row([1.0, 2.0])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DataError::ArityMismatch {
                row: 0,
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn builder_rejects_kind_mismatch() {
        let err = Table::builder(vec![ColumnMeta::numeric("x")])
            .row(["text"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::KindMismatch {
                kind: ColumnKind::Numeric,
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_duplicate_columns() {
        let err = Table::builder(vec![ColumnMeta::numeric("x"), ColumnMeta::nominal("x")])
            .build()
            .unwrap_err();
        assert_eq!(err, DataError::DuplicateColumn("x".into()));
    }

    #[test]
    fn from_array_maps_nan_to_missing() {
        let data = array![[1.0, f64::NAN], [3.0, 4.0]];
        let table = Table::from_array(data.view());
        assert_eq!(table.schema().n_columns(), 2);
        assert!(table.row(0).is_missing(1));
        assert_eq!(table.row(1).cell(1), &Value::Double(4.0));
    }

    #[test]
    fn out_of_range_cell_is_missing() {
        let row = Row::new("r", vec![Value::Double(1.0)]);
        assert!(row.is_missing(5));
    }
}
