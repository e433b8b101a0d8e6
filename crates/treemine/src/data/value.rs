//! Cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ColumnKind;

/// A fuzzy interval with trapezoidal membership.
///
/// Bounds are ordered `min_support <= min_core <= max_core <= max_support`
/// for well-formed intervals. The ordering is not enforced: learning only
/// interpolates between well-formed intervals, which keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuzzyInterval {
    pub min_support: f64,
    pub min_core: f64,
    pub max_core: f64,
    pub max_support: f64,
}

impl FuzzyInterval {
    pub fn new(min_support: f64, min_core: f64, max_core: f64, max_support: f64) -> Self {
        Self {
            min_support,
            min_core,
            max_core,
            max_support,
        }
    }

    /// Crisp interval `[min, max]` with identical support and core.
    pub fn crisp(min: f64, max: f64) -> Self {
        Self::new(min, min, max, max)
    }

    /// Centre of the core region.
    #[inline]
    pub fn core_center(&self) -> f64 {
        (self.min_core + self.max_core) / 2.0
    }

    /// Bounds as `[min_support, min_core, max_core, max_support]`.
    #[inline]
    pub fn bounds(&self) -> [f64; 4] {
        [self.min_support, self.min_core, self.max_core, self.max_support]
    }

    #[inline]
    pub fn from_bounds(b: [f64; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

/// A single table cell.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Missing,
    Double(f64),
    Int(i64),
    Str(String),
    Fuzzy(FuzzyInterval),
}

impl Value {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of `Double` and `Int` cells.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_fuzzy(&self) -> Option<&FuzzyInterval> {
        match self {
            Value::Fuzzy(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value may be stored in a column of `kind`.
    ///
    /// `Missing` fits every column.
    pub fn fits(&self, kind: ColumnKind) -> bool {
        match (self, kind) {
            (Value::Missing, _) => true,
            (Value::Double(_) | Value::Int(_), ColumnKind::Numeric) => true,
            (Value::Int(_), ColumnKind::HierarchyLevel) => true,
            (Value::Fuzzy(_), ColumnKind::FuzzyInterval) => true,
            (Value::Str(_), ColumnKind::Nominal) => true,
            _ => false,
        }
    }
}

/// String form used for lexicographic comparisons and class labels.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "?"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Fuzzy(i) => write!(
                f,
                "<{}, {}, {}, {}>",
                i.min_support, i.min_core, i.max_core, i.max_support
            ),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Double(v)
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<FuzzyInterval> for Value {
    fn from(v: FuzzyInterval) -> Self {
        Value::Fuzzy(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
