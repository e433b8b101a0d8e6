//! PMML predicates with three-valued evaluation.
//!
//! A [`Predicate`] is evaluated against a [`Row`] and its [`TableSchema`] and
//! yields a [`Tristate`]. Missing attribute values evaluate to
//! [`Tristate::Unknown`], which compound predicates propagate or skip
//! according to their operator.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Mutex;

use super::{BooleanOperator, ModelError, SetOperator, SimpleOperator, ValueSet};
use crate::data::{ColumnKind, Row, SchemaKey, TableSchema, Value};

// =============================================================================
// Tristate
// =============================================================================

/// Three-valued truth value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tristate {
    True,
    False,
    Unknown,
}

impl Tristate {
    #[inline]
    pub fn is_true(self) -> bool {
        self == Tristate::True
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Tristate::Unknown
    }

    /// `Some(bool)` for known values, `None` for `Unknown`.
    #[inline]
    pub fn to_option(self) -> Option<bool> {
        match self {
            Tristate::True => Some(true),
            Tristate::False => Some(false),
            Tristate::Unknown => None,
        }
    }
}

impl From<bool> for Tristate {
    #[inline]
    fn from(b: bool) -> Self {
        if b {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tristate::True => "true",
            Tristate::False => "false",
            Tristate::Unknown => "unknown",
        })
    }
}

// =============================================================================
// ColumnIndexCache
// =============================================================================

/// Remembers the column index of a field for the last schema seen.
///
/// The cache never changes evaluation results: on a schema change the index
/// is looked up again. Clones start empty.
#[derive(Default)]
pub struct ColumnIndexCache {
    last: Mutex<Option<(SchemaKey, Option<usize>)>>,
}

impl ColumnIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column index of `field` in `schema`, `None` if the schema lacks it.
    pub fn resolve(&self, schema: &TableSchema, field: &str) -> Option<usize> {
        let key = schema.key();
        if let Ok(guard) = self.last.lock() {
            if let Some((cached_key, index)) = *guard {
                if cached_key == key {
                    return index;
                }
            }
        }

        let index = schema.column_index(field);
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some((key, index));
        }
        index
    }
}

impl Clone for ColumnIndexCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for ColumnIndexCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ColumnIndexCache")
    }
}

/// Caches are invisible to equality.
impl PartialEq for ColumnIndexCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Look up `field` in `row`; fields unknown to the schema read as missing.
fn lookup<'r>(
    cache: &ColumnIndexCache,
    row: &'r Row,
    schema: &TableSchema,
    field: &str,
) -> (Option<usize>, &'r Value) {
    static MISSING: Value = Value::Missing;
    match cache.resolve(schema, field) {
        Some(i) => (Some(i), row.cell(i)),
        None => (None, &MISSING),
    }
}

// =============================================================================
// SimplePredicate
// =============================================================================

/// Compares one field against a threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct SimplePredicate {
    field: String,
    operator: SimpleOperator,
    threshold: String,
    numeric_threshold: Option<f64>,
    cache: ColumnIndexCache,
}

impl SimplePredicate {
    /// Create a predicate; the threshold is parsed as a number once here.
    pub fn new(field: impl Into<String>, operator: SimpleOperator, threshold: impl Into<String>) -> Self {
        let threshold = threshold.into();
        let numeric_threshold = threshold.trim().parse::<f64>().ok();
        Self {
            field: field.into(),
            operator,
            threshold,
            numeric_threshold,
            cache: ColumnIndexCache::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> SimpleOperator {
        self.operator
    }

    pub fn threshold(&self) -> &str {
        &self.threshold
    }

    /// Evaluate against a row.
    ///
    /// Presence operators test presence directly. For all others a missing
    /// value yields `Unknown`; numeric columns compare numerically when the
    /// threshold is a number, everything else compares string forms.
    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Tristate {
        let (index, value) = lookup(&self.cache, row, schema, &self.field);

        match self.operator {
            SimpleOperator::IsMissing => return value.is_missing().into(),
            SimpleOperator::IsNotMissing => return (!value.is_missing()).into(),
            _ => {}
        }
        if value.is_missing() {
            return Tristate::Unknown;
        }

        let numeric_column = index.and_then(|i| schema.kind(i)) == Some(ColumnKind::Numeric);
        let ordering = match (numeric_column, value.as_f64(), self.numeric_threshold) {
            (true, Some(v), Some(t)) => match v.partial_cmp(&t) {
                Some(o) => o,
                None => return Tristate::Unknown,
            },
            _ => value.to_string().as_str().cmp(self.threshold.as_str()),
        };
        self.operator.matches(ordering).into()
    }
}

// =============================================================================
// SimpleSetPredicate
// =============================================================================

/// Tests membership of one field in a typed value set.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleSetPredicate {
    field: String,
    operator: SetOperator,
    values: ValueSet,
    cache: ColumnIndexCache,
}

impl SimpleSetPredicate {
    pub fn new(field: impl Into<String>, operator: SetOperator, values: ValueSet) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
            cache: ColumnIndexCache::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> SetOperator {
        self.operator
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Tristate {
        let (_, value) = lookup(&self.cache, row, schema, &self.field);
        if value.is_missing() {
            return Tristate::Unknown;
        }
        let contained = self.values.contains(value);
        match self.operator {
            SetOperator::IsIn => contained.into(),
            SetOperator::IsNotIn => (!contained).into(),
        }
    }
}

// =============================================================================
// CompoundPredicate
// =============================================================================

/// Combines child predicates, kept in document order.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundPredicate {
    operator: BooleanOperator,
    predicates: Vec<Predicate>,
}

impl CompoundPredicate {
    /// Create a compound predicate.
    ///
    /// # Errors
    ///
    /// [`ModelError::TooFewChildren`] if fewer than two children are given.
    pub fn new(operator: BooleanOperator, predicates: Vec<Predicate>) -> Result<Self, ModelError> {
        if predicates.len() < 2 {
            return Err(ModelError::TooFewChildren {
                operator: operator.to_string(),
                got: predicates.len(),
            });
        }
        Ok(Self {
            operator,
            predicates,
        })
    }

    pub fn operator(&self) -> BooleanOperator {
        self.operator
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Tristate {
        let mut results = self.predicates.iter().map(|p| p.evaluate(row, schema));

        match self.operator {
            BooleanOperator::And => results
                .find(|r| *r != Tristate::True)
                .unwrap_or(Tristate::True),
            BooleanOperator::Or => results
                .find(|r| *r != Tristate::False)
                .unwrap_or(Tristate::False),
            BooleanOperator::Xor => {
                let mut n_true = 0usize;
                for r in results {
                    match r {
                        Tristate::Unknown => return Tristate::Unknown,
                        Tristate::True => n_true += 1,
                        Tristate::False => {}
                    }
                }
                (n_true % 2 == 1).into()
            }
            BooleanOperator::Surrogate => results
                .find(|r| !r.is_unknown())
                .unwrap_or(Tristate::Unknown),
        }
    }
}

/// Common attribute of several split attributes.
///
/// `None` if no item carries an attribute, `Some("")` if they disagree.
pub(crate) fn common_attribute<'a, I>(attributes: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut common: Option<&str> = None;
    for attr in attributes.into_iter().flatten() {
        match common {
            None => common = Some(attr),
            Some(c) if c != attr => return Some(""),
            Some(_) => {}
        }
    }
    common
}

// =============================================================================
// Predicate
// =============================================================================

/// A PMML predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    False,
    Simple(SimplePredicate),
    SimpleSet(SimpleSetPredicate),
    Compound(CompoundPredicate),
}

impl Predicate {
    pub fn simple(field: impl Into<String>, operator: SimpleOperator, threshold: impl Into<String>) -> Self {
        Predicate::Simple(SimplePredicate::new(field, operator, threshold))
    }

    pub fn set(field: impl Into<String>, operator: SetOperator, values: ValueSet) -> Self {
        Predicate::SimpleSet(SimpleSetPredicate::new(field, operator, values))
    }

    pub fn compound(operator: BooleanOperator, predicates: Vec<Predicate>) -> Result<Self, ModelError> {
        CompoundPredicate::new(operator, predicates).map(Predicate::Compound)
    }

    /// Evaluate the predicate against `row`.
    ///
    /// Pure with respect to the row and schema; repeated evaluation gives the
    /// same result.
    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Tristate {
        match self {
            Predicate::True => Tristate::True,
            Predicate::False => Tristate::False,
            Predicate::Simple(p) => p.evaluate(row, schema),
            Predicate::SimpleSet(p) => p.evaluate(row, schema),
            Predicate::Compound(p) => p.evaluate(row, schema),
        }
    }

    /// Attribute this predicate splits on.
    ///
    /// `None` for constants, the field for simple predicates, and for
    /// compounds the field shared by all children that have one (`Some("")`
    /// when they differ).
    pub fn split_attribute(&self) -> Option<&str> {
        match self {
            Predicate::True | Predicate::False => None,
            Predicate::Simple(p) => Some(p.field()),
            Predicate::SimpleSet(p) => Some(p.field()),
            Predicate::Compound(p) => {
                common_attribute(p.predicates.iter().map(Predicate::split_attribute))
            }
        }
    }
}
