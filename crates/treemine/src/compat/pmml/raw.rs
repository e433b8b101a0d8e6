//! Raw PMML tree model elements.
//!
//! These are "foreign types" mirroring the PMML `TreeModel` element tree as
//! an external reader delivers it, one struct per element with attribute
//! values kept as strings. Conversion to native types happens in
//! [`TreeModelTranslator`](super::TreeModelTranslator).
//!
//! Element names and attributes use PMML's camelCase spelling, so a reader
//! producing JSON can hand documents over unchanged:
//!
//! ```json
//! {
//!   "functionName": "classification",
//!   "miningSchema": [{"name": "play", "usageType": "predicted"}],
//!   "node": {
//!     "id": "0", "score": "yes",
//!     "predicates": [{"kind": "true"}],
//!     "nodes": []
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Model
// =============================================================================

/// A PMML `TreeModel` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTreeModel {
    /// `functionName` attribute; only `classification` is scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_value_strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_true_child_strategy: Option<String>,

    /// `MiningField` children of the `MiningSchema`.
    #[serde(default)]
    pub mining_schema: Vec<RawMiningField>,

    /// `DerivedField`s of the model's local transformations.
    #[serde(default)]
    pub derived_fields: Vec<RawDerivedField>,

    pub node: RawNode,
}

/// A `MiningField` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMiningField {
    pub name: String,

    /// `usageType` attribute, PMML default `active`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,
}

impl RawMiningField {
    pub fn is_predicted(&self) -> bool {
        self.usage_type.as_deref() == Some("predicted")
    }
}

/// A `DerivedField` element.
///
/// Only plain renames (a single `FieldRef`) can be mapped back to a column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDerivedField {
    pub name: String,

    /// `field` attribute of a `FieldRef` expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<String>,
}

// =============================================================================
// Nodes
// =============================================================================

/// A `Node` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_child: Option<String>,

    /// Predicate elements of the node. Well-formed nodes have exactly one.
    #[serde(default)]
    pub predicates: Vec<RawPredicate>,

    #[serde(default)]
    pub score_distributions: Vec<RawScoreDistribution>,

    /// Child `Node` elements in document order.
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

impl RawNode {
    /// Leaf node with a single predicate.
    pub fn new(id: impl Into<String>, predicate: RawPredicate) -> Self {
        Self {
            id: id.into(),
            predicates: vec![predicate],
            ..Default::default()
        }
    }

    pub fn with_score(mut self, score: impl Into<String>) -> Self {
        self.score = Some(score.into());
        self
    }

    pub fn with_distribution(mut self, value: impl Into<String>, record_count: f64) -> Self {
        self.score_distributions.push(RawScoreDistribution {
            value: value.into(),
            record_count,
        });
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<RawNode>) -> Self {
        self.nodes = nodes;
        self
    }
}

/// A `ScoreDistribution` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScoreDistribution {
    pub value: String,
    pub record_count: f64,
}

// =============================================================================
// Predicates
// =============================================================================

/// One of the PMML predicate elements.
///
/// Compound children keep their document order, which matters for
/// `surrogate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawPredicate {
    True,
    False,
    #[serde(rename_all = "camelCase")]
    SimplePredicate {
        field: String,
        operator: String,
        /// Absent for `isMissing` / `isNotMissing`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    SimpleSetPredicate {
        field: String,
        boolean_operator: String,
        array: RawArray,
    },
    #[serde(rename_all = "camelCase")]
    CompoundPredicate {
        boolean_operator: String,
        predicates: Vec<RawPredicate>,
    },
}

impl RawPredicate {
    pub fn simple(field: &str, operator: &str, value: &str) -> Self {
        RawPredicate::SimplePredicate {
            field: field.to_string(),
            operator: operator.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Element name, for diagnostics.
    pub fn element_name(&self) -> &'static str {
        match self {
            RawPredicate::True => "True",
            RawPredicate::False => "False",
            RawPredicate::SimplePredicate { .. } => "SimplePredicate",
            RawPredicate::SimpleSetPredicate { .. } => "SimpleSetPredicate",
            RawPredicate::CompoundPredicate { .. } => "CompoundPredicate",
        }
    }
}

/// An `Array` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArray {
    /// `type` attribute: `string`, `int` or `real`.
    #[serde(rename = "type")]
    pub array_type: String,

    /// Declared element count (`n` attribute), informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,

    /// Text content, e.g. `"Cheval Blanc" "Latour"` or `1 2 3`.
    pub content: String,
}
