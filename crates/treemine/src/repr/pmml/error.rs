//! Model construction errors.

/// Errors raised while building a predicate or decision-tree model.
///
/// All of these are fatal for the model being built; a partially built model
/// is never returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown simple predicate operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown set predicate operator '{0}'")]
    UnknownSetOperator(String),

    #[error("unknown boolean operator '{0}'")]
    UnknownBooleanOperator(String),

    #[error("unknown array type '{0}'")]
    UnknownArrayType(String),

    #[error("unknown missing value strategy '{0}'")]
    UnknownMissingValueStrategy(String),

    #[error("unknown no-true-child strategy '{0}'")]
    UnknownNoTrueChildStrategy(String),

    /// Compound predicates need at least two children.
    #[error("compound predicate '{operator}' has {got} children, at least 2 required")]
    TooFewChildren { operator: String, got: usize },

    #[error("node '{node}' has more than one predicate element")]
    DuplicatePredicate { node: String },

    #[error("node '{node}' has no predicate element")]
    MissingPredicate { node: String },

    #[error("node id '{0}' is not a valid integer identifier")]
    InvalidNodeId(String),

    #[error("more than one predicted field: {}", .0.join(", "))]
    MultiplePredictedFields(Vec<String>),

    #[error("value '{value}' is not a valid {array_type} array element")]
    InvalidArrayValue { value: String, array_type: String },

    #[error("unterminated quoted string in array content")]
    UnterminatedString,
}
