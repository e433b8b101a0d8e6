//! Conversion from raw PMML elements to native decision trees.

use log::warn;

use super::mapper::{DerivedFieldMapper, FieldMapper};
use super::raw::{RawNode, RawPredicate, RawTreeModel};
use crate::repr::pmml::{
    ArrayType, BooleanOperator, DecisionTree, DecisionTreeNode, MissingValueStrategy, ModelError,
    NoTrueChildStrategy, Predicate, SetOperator, SimpleOperator, ValueSet,
};

/// Builds a [`DecisionTree`] from a [`RawTreeModel`].
///
/// Predicate field names go through the translator's [`FieldMapper`].
#[derive(Debug, Clone, Default)]
pub struct TreeModelTranslator<M> {
    mapper: M,
}

impl<M: FieldMapper> TreeModelTranslator<M> {
    pub fn new(mapper: M) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Translate a whole tree model.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed element: unknown operator or strategy
    /// tokens, non-integer node ids, nodes with zero (below the root) or
    /// several predicate elements, compounds with fewer than two children,
    /// unparseable array values, or more than one predicted mining field.
    pub fn translate(&self, model: &RawTreeModel) -> Result<DecisionTree, ModelError> {
        if let Some(function) = model.function_name.as_deref() {
            if function != "classification" {
                warn!("tree model function '{function}' is scored as classification");
            }
        }

        let predicted: Vec<&str> = model
            .mining_schema
            .iter()
            .filter(|f| f.is_predicted())
            .map(|f| f.name.as_str())
            .collect();
        let predicted_field = match predicted.as_slice() {
            [] => None,
            [name] => Some(name.to_string()),
            names => {
                return Err(ModelError::MultiplePredictedFields(
                    names.iter().map(|n| n.to_string()).collect(),
                ))
            }
        };

        let missing_value_strategy = model
            .missing_value_strategy
            .as_deref()
            .map(str::parse::<MissingValueStrategy>)
            .transpose()?
            .unwrap_or_default();
        let no_true_child_strategy = model
            .no_true_child_strategy
            .as_deref()
            .map(str::parse::<NoTrueChildStrategy>)
            .transpose()?
            .unwrap_or_default();

        let root = self.translate_node(&model.node, true)?;

        Ok(DecisionTree::builder()
            .root(root)
            .maybe_predicted_field(predicted_field)
            .missing_value_strategy(missing_value_strategy)
            .no_true_child_strategy(no_true_child_strategy)
            .build())
    }

    fn translate_node(&self, raw: &RawNode, is_root: bool) -> Result<DecisionTreeNode, ModelError> {
        let id = parse_node_id(&raw.id)?;

        let predicate = match raw.predicates.as_slice() {
            [] if is_root => Predicate::True,
            [] => {
                return Err(ModelError::MissingPredicate {
                    node: raw.id.clone(),
                })
            }
            [predicate] => self.translate_predicate(predicate)?,
            _ => {
                return Err(ModelError::DuplicatePredicate {
                    node: raw.id.clone(),
                })
            }
        };

        let children = raw
            .nodes
            .iter()
            .map(|child| self.translate_node(child, false))
            .collect::<Result<Vec<_>, _>>()?;

        let class_counts = raw
            .score_distributions
            .iter()
            .map(|sd| (sd.value.clone(), sd.record_count))
            .collect();

        let mut node = DecisionTreeNode::new(id, predicate)
            .with_class_counts(class_counts)
            .with_children(children);
        if let Some(score) = &raw.score {
            node = node.with_score(score.clone());
        }
        if let Some(default_child) = &raw.default_child {
            node = node.with_default_child(parse_node_id(default_child)?);
        }
        Ok(node)
    }

    /// Translate a single predicate element.
    pub fn translate_predicate(&self, raw: &RawPredicate) -> Result<Predicate, ModelError> {
        Ok(match raw {
            RawPredicate::True => Predicate::True,
            RawPredicate::False => Predicate::False,
            RawPredicate::SimplePredicate {
                field,
                operator,
                value,
            } => {
                let operator: SimpleOperator = operator.parse()?;
                Predicate::simple(
                    self.mapper.column_name(field),
                    operator,
                    value.clone().unwrap_or_default(),
                )
            }
            RawPredicate::SimpleSetPredicate {
                field,
                boolean_operator,
                array,
            } => {
                let operator: SetOperator = boolean_operator.parse()?;
                let array_type: ArrayType = array.array_type.parse()?;
                let values = ValueSet::parse(array_type, &array.content)?;
                if let Some(n) = array.n {
                    if n != values.len() {
                        warn!(
                            "array declares {n} values but holds {} distinct values",
                            values.len()
                        );
                    }
                }
                Predicate::set(self.mapper.column_name(field), operator, values)
            }
            RawPredicate::CompoundPredicate {
                boolean_operator,
                predicates,
            } => {
                let operator: BooleanOperator = boolean_operator.parse()?;
                let children = predicates
                    .iter()
                    .map(|p| self.translate_predicate(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Predicate::compound(operator, children)?
            }
        })
    }
}

impl RawTreeModel {
    /// Convert to a native [`DecisionTree`], resolving derived field renames
    /// declared by the model.
    pub fn to_decision_tree(&self) -> Result<DecisionTree, ModelError> {
        let mapper = DerivedFieldMapper::from_derived_fields(&self.derived_fields);
        TreeModelTranslator::new(mapper).translate(self)
    }
}

fn parse_node_id(id: &str) -> Result<i32, ModelError> {
    id.trim()
        .parse()
        .map_err(|_| ModelError::InvalidNodeId(id.to_string()))
}
