//! Row-to-cell and row-to-row distances.

use std::fmt;
use std::str::FromStr;

use crate::data::{Row, Value};
use crate::repr::sota::CellValue;

/// Offset the correlation coefficient is subtracted from.
pub const CORRELATION_OFFSET: f64 = 1.0;

/// Distance metric used to find winning cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// `offset - r`, with `r` the Pearson coefficient of correlation.
    Correlation,
}

impl DistanceMetric {
    /// Settings name of the metric.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Correlation => "correlation",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised metric name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown distance metric '{0}', expected 'euclidean' or 'correlation'")]
pub struct UnknownMetric(pub String);

impl FromStr for DistanceMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "correlation" | "coefficient of correlation" => Ok(DistanceMetric::Correlation),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

/// Numeric view of a row cell: the value, or the core centre of a fuzzy
/// interval. `None` for missing and non-numeric cells.
#[inline]
fn observed(value: &Value) -> Option<f64> {
    match value {
        Value::Fuzzy(f) => Some(f.core_center()),
        other => other.as_f64(),
    }
}

/// Computes distances over the active feature columns of a table.
///
/// The k-th active column pairs with the k-th cell value. Missing row values
/// contribute nothing but still take up their dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceManager {
    metric: DistanceMetric,
    columns: Vec<usize>,
    offset: f64,
}

impl DistanceManager {
    pub fn new(metric: DistanceMetric, columns: Vec<usize>) -> Self {
        Self {
            metric,
            columns,
            offset: CORRELATION_OFFSET,
        }
    }

    #[inline]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Active column indices, in column order.
    #[inline]
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Distance between a row and a cell prototype.
    pub fn row_to_cell(&self, row: &Row, cell: &[CellValue]) -> f64 {
        let pairs = self
            .columns
            .iter()
            .zip(cell)
            .map(|(&c, v)| (observed(row.cell(c)), Some(v.value())));
        self.distance(pairs)
    }

    /// Distance between two rows.
    pub fn row_to_row(&self, a: &Row, b: &Row) -> f64 {
        let pairs = self
            .columns
            .iter()
            .map(|&c| (observed(a.cell(c)), observed(b.cell(c))));
        self.distance(pairs)
    }

    fn distance<I>(&self, pairs: I) -> f64
    where
        I: Iterator<Item = (Option<f64>, Option<f64>)> + Clone,
    {
        match self.metric {
            DistanceMetric::Euclidean => euclidean(pairs),
            DistanceMetric::Correlation => self.offset - correlation(pairs),
        }
    }
}

fn euclidean<I>(pairs: I) -> f64
where
    I: Iterator<Item = (Option<f64>, Option<f64>)>,
{
    pairs
        .map(|pair| match pair {
            (Some(a), Some(b)) => (a - b) * (a - b),
            _ => 0.0,
        })
        .sum::<f64>()
        .sqrt()
}

/// Pearson correlation; 0 when either side has no spread.
///
/// Means and sample standard deviations are taken per side over its present
/// values, the cross term over pairs where both sides are present.
fn correlation<I>(pairs: I) -> f64
where
    I: Iterator<Item = (Option<f64>, Option<f64>)> + Clone,
{
    let (mean_a, sd_a) = mean_sd(pairs.clone().filter_map(|p| p.0));
    let (mean_b, sd_b) = mean_sd(pairs.clone().filter_map(|p| p.1));
    if sd_a == 0.0 || sd_b == 0.0 || !sd_a.is_finite() || !sd_b.is_finite() {
        return 0.0;
    }

    let mut cov = 0.0;
    let mut count = 0usize;
    for pair in pairs {
        if let (Some(a), Some(b)) = pair {
            cov += (a - mean_a) * (b - mean_b);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    cov / (count as f64 * sd_a * sd_b)
}

/// Mean and sample standard deviation (`n - 1`).
fn mean_sd<I: Iterator<Item = f64> + Clone>(values: I) -> (f64, f64) {
    let (sum, n) = values.clone().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n < 2 {
        return (sum / n.max(1) as f64, 0.0);
    }
    let mean = sum / n as f64;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::FuzzyInterval;

    fn scalars(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Scalar(v)).collect()
    }

    fn row(values: Vec<Value>) -> Row {
        Row::new("r", values)
    }

    #[test]
    fn euclidean_row_to_cell() {
        let dm = DistanceManager::new(DistanceMetric::Euclidean, vec![0, 1]);
        let r = row(vec![Value::Double(3.0), Value::Double(4.0)]);
        assert_abs_diff_eq!(dm.row_to_cell(&r, &scalars(&[0.0, 0.0])), 5.0);
    }

    #[test]
    fn inactive_columns_are_skipped() {
        // Column 1 is nominal; the cell's second value pairs with column 2.
        let dm = DistanceManager::new(DistanceMetric::Euclidean, vec![0, 2]);
        let r = row(vec![Value::Double(1.0), Value::from("x"), Value::Double(2.0)]);
        assert_abs_diff_eq!(dm.row_to_cell(&r, &scalars(&[1.0, 2.0])), 0.0);
    }

    #[test]
    fn missing_values_contribute_zero() {
        let dm = DistanceManager::new(DistanceMetric::Euclidean, vec![0, 1]);
        let r = row(vec![Value::Missing, Value::Double(2.0)]);
        assert_abs_diff_eq!(dm.row_to_cell(&r, &scalars(&[100.0, 0.0])), 2.0);
    }

    #[test]
    fn fuzzy_rows_use_core_center() {
        let dm = DistanceManager::new(DistanceMetric::Euclidean, vec![0]);
        let r = row(vec![Value::Fuzzy(FuzzyInterval::new(0.0, 2.0, 4.0, 9.0))]);
        let cell = [CellValue::Fuzzy(FuzzyInterval::new(0.0, 0.0, 0.0, 0.0))];
        assert_abs_diff_eq!(dm.row_to_cell(&r, &cell), 3.0);
    }

    #[test]
    fn correlation_distance() {
        let dm = DistanceManager::new(DistanceMetric::Correlation, vec![0, 1, 2]);
        let r = row(vec![Value::Double(1.0), Value::Double(2.0), Value::Double(3.0)]);

        assert_abs_diff_eq!(dm.row_to_cell(&r, &scalars(&[2.0, 4.0, 6.0])), 1.0 - 2.0 / 3.0, epsilon = 1e-12);

        // Zero spread on one side yields the offset.
        assert_abs_diff_eq!(dm.row_to_cell(&r, &scalars(&[5.0, 5.0, 5.0])), CORRELATION_OFFSET);
    }

    #[test]
    fn row_to_row_is_symmetric() {
        let dm = DistanceManager::new(DistanceMetric::Euclidean, vec![0, 1]);
        let a = row(vec![Value::Double(0.0), Value::Double(1.0)]);
        let b = row(vec![Value::Double(3.0), Value::Double(5.0)]);
        assert_abs_diff_eq!(dm.row_to_row(&a, &b), 5.0);
        assert_abs_diff_eq!(dm.row_to_row(&a, &b), dm.row_to_row(&b, &a));
    }

    #[test]
    fn metric_names() {
        assert_eq!("Euclidean".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!(
            "Coefficient of Correlation".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Correlation
        );
        assert!("manhattan".parse::<DistanceMetric>().is_err());
        assert_eq!(DistanceMetric::Correlation.to_string(), "correlation");
    }

    #[test]
    fn mean_sd_of_short_inputs() {
        assert_eq!(mean_sd([4.5].into_iter()), (4.5, 0.0));
        assert_eq!(mean_sd(std::iter::empty()), (0.0, 0.0));

        let (mean, sd) = mean_sd([1.0, 2.0, 3.0].into_iter());
        assert_abs_diff_eq!(mean, 2.0);
        assert_abs_diff_eq!(sd, 1.0);
    }
}
