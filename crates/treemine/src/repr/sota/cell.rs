//! Prototype values held by SOTA tree cells.

use crate::data::{FuzzyInterval, Value};

/// Which kind of prototype values a training run works with.
///
/// Selected once per run from the training schema. Acts as the cell factory:
/// every [`CellValue`] of a tree is created through the kind of that run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CellKind {
    #[default]
    Scalar,
    Fuzzy,
}

impl CellKind {
    /// Create a cell holding `value` when it matches this kind.
    pub fn create(self, value: &Value) -> Option<CellValue> {
        match self {
            CellKind::Scalar => value.as_f64().map(CellValue::Scalar),
            CellKind::Fuzzy => value.as_fuzzy().copied().map(CellValue::Fuzzy),
        }
    }

    /// Zero-valued cell of this kind.
    pub fn zero(self) -> CellValue {
        match self {
            CellKind::Scalar => CellValue::Scalar(0.0),
            CellKind::Fuzzy => CellValue::Fuzzy(FuzzyInterval::new(0.0, 0.0, 0.0, 0.0)),
        }
    }

    #[inline]
    pub fn is_fuzzy(self) -> bool {
        matches!(self, CellKind::Fuzzy)
    }

    /// Column-wise mean over `rows`, each holding `dimension` observed values.
    ///
    /// Fuzzy cells average each of the four bounds independently. Values that
    /// do not fit this kind are skipped but the row still counts. Returns
    /// `None` if `rows` is empty.
    pub fn create_mean<'a, I>(self, dimension: usize, rows: I) -> Option<Vec<CellValue>>
    where
        I: IntoIterator<Item = Vec<&'a Value>>,
    {
        let mut sums = vec![[0.0f64; 4]; dimension];
        let mut count = 0usize;

        for row in rows {
            count += 1;
            for (sum, value) in sums.iter_mut().zip(row) {
                match self.create(value) {
                    Some(CellValue::Scalar(v)) => sum[0] += v,
                    Some(CellValue::Fuzzy(f)) => {
                        for (s, b) in sum.iter_mut().zip(f.bounds()) {
                            *s += b;
                        }
                    }
                    None => {}
                }
            }
        }

        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(
            sums.into_iter()
                .map(|s| match self {
                    CellKind::Scalar => CellValue::Scalar(s[0] / n),
                    CellKind::Fuzzy => {
                        CellValue::Fuzzy(FuzzyInterval::from_bounds(s.map(|b| b / n)))
                    }
                })
                .collect(),
        )
    }
}

/// A single prototype value.
///
/// Scalars hold one double; fuzzy cells hold a full interval and report the
/// centre of their core region as value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellValue {
    Scalar(f64),
    Fuzzy(FuzzyInterval),
}

impl CellValue {
    #[inline]
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Scalar(_) => CellKind::Scalar,
            CellValue::Fuzzy(_) => CellKind::Fuzzy,
        }
    }

    /// Value used for distance computation and reporting.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            CellValue::Scalar(v) => *v,
            CellValue::Fuzzy(f) => f.core_center(),
        }
    }

    /// Move this cell towards `observed` by `rate`.
    ///
    /// `v' = v + rate * (observed - v)`, applied per bound for fuzzy cells.
    /// Missing or kind-incompatible observations leave the cell unchanged.
    pub fn adjust(&mut self, observed: &Value, rate: f64) {
        match self {
            CellValue::Scalar(v) => {
                if let Some(o) = observed.as_f64() {
                    *v += rate * (o - *v);
                }
            }
            CellValue::Fuzzy(f) => {
                if let Some(o) = observed.as_fuzzy() {
                    let mut bounds = f.bounds();
                    for (b, target) in bounds.iter_mut().zip(o.bounds()) {
                        *b += rate * (target - *b);
                    }
                    *f = FuzzyInterval::from_bounds(bounds);
                }
            }
        }
    }
}
