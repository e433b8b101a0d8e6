//! Decision-tree node model and scoring.

use bon::Builder;

use super::predicate::common_attribute;
use super::{ModelError, Predicate, Tristate};
use crate::data::{DataTable, Row, TableSchema};
use crate::utils::Parallelism;

// =============================================================================
// Strategies
// =============================================================================

/// What to do when a child predicate evaluates to unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingValueStrategy {
    /// Stop and predict with the current node.
    LastPrediction,
    /// Stop and predict nothing.
    NullPrediction,
    /// Continue with the current node's default child.
    DefaultChild,
    /// Treat the unknown predicate as false and try the next sibling.
    #[default]
    None,
    /// Declared by the producer but not scored by aggregation; handled like
    /// [`MissingValueStrategy::None`].
    AggregateNodes,
    /// Declared by the producer but not scored by confidence weighting;
    /// handled like [`MissingValueStrategy::None`].
    WeightedConfidence,
}

impl std::str::FromStr for MissingValueStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lastPrediction" => Ok(Self::LastPrediction),
            "nullPrediction" => Ok(Self::NullPrediction),
            "defaultChild" => Ok(Self::DefaultChild),
            "none" => Ok(Self::None),
            "aggregateNodes" => Ok(Self::AggregateNodes),
            "weightedConfidence" => Ok(Self::WeightedConfidence),
            other => Err(ModelError::UnknownMissingValueStrategy(other.to_string())),
        }
    }
}

/// What to do when no child predicate evaluates to true.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoTrueChildStrategy {
    #[default]
    ReturnNullPrediction,
    ReturnLastPrediction,
}

impl std::str::FromStr for NoTrueChildStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "returnNullPrediction" => Ok(Self::ReturnNullPrediction),
            "returnLastPrediction" => Ok(Self::ReturnLastPrediction),
            other => Err(ModelError::UnknownNoTrueChildStrategy(other.to_string())),
        }
    }
}

// =============================================================================
// DecisionTreeNode
// =============================================================================

/// A node of a decision tree.
///
/// The node's own predicate decides whether a row reaches it from its parent.
/// Class counts keep their document order.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTreeNode {
    id: i32,
    predicate: Predicate,
    score: Option<String>,
    class_counts: Vec<(String, f64)>,
    children: Vec<DecisionTreeNode>,
    default_child: Option<i32>,
}

impl DecisionTreeNode {
    /// Create a leaf without class information.
    pub fn new(id: i32, predicate: Predicate) -> Self {
        Self {
            id,
            predicate,
            score: None,
            class_counts: Vec::new(),
            children: Vec::new(),
            default_child: None,
        }
    }

    /// Set the explicit majority class.
    pub fn with_score(mut self, score: impl Into<String>) -> Self {
        self.score = Some(score.into());
        self
    }

    /// Set the record count per class.
    pub fn with_class_counts(mut self, counts: Vec<(String, f64)>) -> Self {
        self.class_counts = counts;
        self
    }

    pub fn with_children(mut self, children: Vec<DecisionTreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_default_child(mut self, id: i32) -> Self {
        self.default_child = Some(id);
        self
    }

    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[inline]
    pub fn children(&self) -> &[DecisionTreeNode] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn default_child(&self) -> Option<i32> {
        self.default_child
    }

    pub fn class_counts(&self) -> &[(String, f64)] {
        &self.class_counts
    }

    /// Majority class: the explicit score, else the class with the highest
    /// record count (first seen wins ties).
    pub fn majority_class(&self) -> Option<&str> {
        if let Some(score) = self.score.as_deref() {
            return Some(score);
        }
        let mut best: Option<&(String, f64)> = None;
        for entry in &self.class_counts {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(c, _)| c.as_str())
    }

    /// Record count of the majority class.
    pub fn own_class_count(&self) -> f64 {
        self.majority_class()
            .and_then(|m| self.class_counts.iter().find(|(c, _)| c == m))
            .map_or(0.0, |(_, n)| *n)
    }

    /// Total record count over all classes.
    pub fn entire_class_count(&self) -> f64 {
        self.class_counts.iter().map(|(_, n)| n).sum()
    }

    /// Class predicted at this node.
    ///
    /// The class with the highest count; when the majority class reaches the
    /// same count it wins. Falls back to the majority class without counts.
    pub fn winner(&self) -> Option<&str> {
        let mut winner: Option<&(String, f64)> = None;
        for entry in &self.class_counts {
            if winner.map_or(true, |w| entry.1 >= w.1) {
                winner = Some(entry);
            }
        }
        let majority = self.majority_class();
        match (winner, majority) {
            (Some((_, count)), Some(m))
                if self.class_counts.iter().any(|(c, n)| c == m && n == count) =>
            {
                Some(m)
            }
            (Some((c, _)), _) => Some(c.as_str()),
            (None, m) => m,
        }
    }

    /// Attribute the children of this node split on.
    pub fn split_attribute(&self) -> Option<&str> {
        common_attribute(self.children.iter().map(|c| c.predicate.split_attribute()))
    }

    fn child_by_id(&self, id: i32) -> Option<&DecisionTreeNode> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Number of nodes in this subtree.
    pub fn count_subtree(&self) -> usize {
        1 + self.children.iter().map(Self::count_subtree).sum::<usize>()
    }
}

// =============================================================================
// Prediction
// =============================================================================

/// Result of classifying one row.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub class: String,
    pub node_id: i32,
    pub class_counts: Vec<(String, f64)>,
}

impl Prediction {
    fn from_node(node: &DecisionTreeNode) -> Option<Self> {
        node.winner().map(|class| Prediction {
            class: class.to_string(),
            node_id: node.id,
            class_counts: node.class_counts.clone(),
        })
    }
}

// =============================================================================
// DecisionTree
// =============================================================================

/// A classification tree.
///
/// ```
/// use treemine::repr::pmml::{DecisionTree, DecisionTreeNode, Predicate};
///
/// let root = DecisionTreeNode::new(0, Predicate::True).with_score("yes");
/// let tree = DecisionTree::builder().root(root).build();
/// assert_eq!(tree.root().majority_class(), Some("yes"));
/// ```
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct DecisionTree {
    root: DecisionTreeNode,

    /// Name of the predicted (class) field.
    #[builder(into)]
    predicted_field: Option<String>,

    #[builder(default)]
    missing_value_strategy: MissingValueStrategy,

    #[builder(default)]
    no_true_child_strategy: NoTrueChildStrategy,
}

impl DecisionTree {
    pub fn root(&self) -> &DecisionTreeNode {
        &self.root
    }

    pub fn predicted_field(&self) -> Option<&str> {
        self.predicted_field.as_deref()
    }

    pub fn missing_value_strategy(&self) -> MissingValueStrategy {
        self.missing_value_strategy
    }

    pub fn no_true_child_strategy(&self) -> NoTrueChildStrategy {
        self.no_true_child_strategy
    }

    pub fn n_nodes(&self) -> usize {
        self.root.count_subtree()
    }

    /// Classify one row.
    ///
    /// Walks from the root, taking the first child whose predicate is true.
    /// The root's own predicate is not evaluated. Unknown predicates are handled by the missing value strategy, a node
    /// without a true child by the no-true-child strategy. Returns `None` for
    /// a null prediction or when the reached node carries no class.
    pub fn classify(&self, row: &Row, schema: &TableSchema) -> Option<Prediction> {
        let mut node = &self.root;
        'descend: while !node.is_leaf() {
            for child in &node.children {
                match child.predicate.evaluate(row, schema) {
                    Tristate::True => {
                        node = child;
                        continue 'descend;
                    }
                    Tristate::False => {}
                    Tristate::Unknown => match self.missing_value_strategy {
                        MissingValueStrategy::None
                        | MissingValueStrategy::AggregateNodes
                        | MissingValueStrategy::WeightedConfidence => {}
                        MissingValueStrategy::LastPrediction => {
                            return Prediction::from_node(node)
                        }
                        MissingValueStrategy::NullPrediction => return None,
                        MissingValueStrategy::DefaultChild => {
                            match node.default_child.and_then(|id| node.child_by_id(id)) {
                                Some(default) => {
                                    node = default;
                                    continue 'descend;
                                }
                                None => return Prediction::from_node(node),
                            }
                        }
                    },
                }
            }

            return match self.no_true_child_strategy {
                NoTrueChildStrategy::ReturnNullPrediction => None,
                NoTrueChildStrategy::ReturnLastPrediction => Prediction::from_node(node),
            };
        }

        Prediction::from_node(node)
    }

    /// Classify every row of `data`.
    pub fn classify_batch(
        &self,
        data: &dyn DataTable,
        parallelism: Parallelism,
    ) -> Vec<Option<Prediction>> {
        let schema = data.schema();
        parallelism.maybe_par_map(0..data.n_rows(), |i| self.classify(data.row(i), schema))
    }
}
