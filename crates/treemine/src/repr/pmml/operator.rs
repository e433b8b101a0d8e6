//! Operator tokens of PMML predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::ModelError;

// =============================================================================
// SimpleOperator
// =============================================================================

/// Comparison operator of a simple predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimpleOperator {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    IsMissing,
    IsNotMissing,
}

impl SimpleOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SimpleOperator::Equal => "equal",
            SimpleOperator::NotEqual => "notEqual",
            SimpleOperator::LessThan => "lessThan",
            SimpleOperator::LessOrEqual => "lessOrEqual",
            SimpleOperator::GreaterThan => "greaterThan",
            SimpleOperator::GreaterOrEqual => "greaterOrEqual",
            SimpleOperator::IsMissing => "isMissing",
            SimpleOperator::IsNotMissing => "isNotMissing",
        }
    }

    /// Whether this operator tests presence rather than the value.
    #[inline]
    pub fn is_presence_test(self) -> bool {
        matches!(self, SimpleOperator::IsMissing | SimpleOperator::IsNotMissing)
    }

    /// Apply the operator to `value.cmp(threshold)`.
    ///
    /// Presence operators never match an ordering.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            SimpleOperator::Equal => ordering == Ordering::Equal,
            SimpleOperator::NotEqual => ordering != Ordering::Equal,
            SimpleOperator::LessThan => ordering == Ordering::Less,
            SimpleOperator::LessOrEqual => ordering != Ordering::Greater,
            SimpleOperator::GreaterThan => ordering == Ordering::Greater,
            SimpleOperator::GreaterOrEqual => ordering != Ordering::Less,
            SimpleOperator::IsMissing | SimpleOperator::IsNotMissing => false,
        }
    }
}

impl FromStr for SimpleOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "equal" => SimpleOperator::Equal,
            "notEqual" => SimpleOperator::NotEqual,
            "lessThan" => SimpleOperator::LessThan,
            "lessOrEqual" => SimpleOperator::LessOrEqual,
            "greaterThan" => SimpleOperator::GreaterThan,
            "greaterOrEqual" => SimpleOperator::GreaterOrEqual,
            "isMissing" => SimpleOperator::IsMissing,
            "isNotMissing" => SimpleOperator::IsNotMissing,
            other => return Err(ModelError::UnknownOperator(other.to_string())),
        })
    }
}

impl fmt::Display for SimpleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SetOperator
// =============================================================================

/// Membership operator of a simple set predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetOperator {
    IsIn,
    IsNotIn,
}

impl SetOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SetOperator::IsIn => "isIn",
            SetOperator::IsNotIn => "isNotIn",
        }
    }
}

impl FromStr for SetOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isIn" => Ok(SetOperator::IsIn),
            "isNotIn" => Ok(SetOperator::IsNotIn),
            other => Err(ModelError::UnknownSetOperator(other.to_string())),
        }
    }
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BooleanOperator
// =============================================================================

/// Combining operator of a compound predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BooleanOperator {
    And,
    Or,
    Xor,
    /// First child that is not unknown decides.
    Surrogate,
}

impl BooleanOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
            BooleanOperator::Xor => "xor",
            BooleanOperator::Surrogate => "surrogate",
        }
    }
}

impl FromStr for BooleanOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(BooleanOperator::And),
            "or" => Ok(BooleanOperator::Or),
            "xor" => Ok(BooleanOperator::Xor),
            "surrogate" => Ok(BooleanOperator::Surrogate),
            other => Err(ModelError::UnknownBooleanOperator(other.to_string())),
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ArrayType
// =============================================================================

/// Element type of a PMML array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayType {
    String,
    Int,
    Real,
}

impl ArrayType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayType::String => "string",
            ArrayType::Int => "int",
            ArrayType::Real => "real",
        }
    }
}

impl FromStr for ArrayType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ArrayType::String),
            "int" => Ok(ArrayType::Int),
            "real" => Ok(ArrayType::Real),
            other => Err(ModelError::UnknownArrayType(other.to_string())),
        }
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
