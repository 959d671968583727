//! Conversion from XGBoost JSON types to an executable tree ensemble.

use super::json::{GradientBooster, Tree, XgbModel};

/// Error type for XGBoost model conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported booster type '{0}': only gbtree and dart models can be scored")]
    UnsupportedBooster(&'static str),
    #[error("unsupported objective '{0}': a binary logistic classifier is required")]
    UnsupportedObjective(String),
    #[error("model has {0} classes, expected a binary classifier")]
    NotBinary(i64),
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree}: array '{array}' has {len} entries but tree has {num_nodes} nodes")]
    LengthMismatch {
        tree: usize,
        array: &'static str,
        len: usize,
        num_nodes: usize,
    },
    #[error(
        "invalid node index in tree {tree}: node {node} references child {child} \
         but tree has {num_nodes} nodes"
    )]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error(
        "tree {tree}: node {node} splits on feature {feature} \
         but model has {num_features} features"
    )]
    InvalidFeatureIndex {
        tree: usize,
        node: usize,
        feature: i32,
        num_features: usize,
    },
    #[error("tree {tree}: node {node} uses a categorical split, which is not supported")]
    CategoricalSplit { tree: usize, node: usize },
    #[error("dart model has {weights} tree weights for {trees} trees")]
    DartWeights { weights: usize, trees: usize },
}

/// How raw margins are mapped to probabilities, derived from the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTransform {
    /// `binary:logistic` / `reg:logistic`: base score is stored in probability space
    Logistic,
    /// `binary:logitraw`: base score is already a margin
    LogitRaw,
}

impl OutputTransform {
    fn from_objective(name: &str) -> Result<Self, ConversionError> {
        match name {
            "binary:logistic" | "reg:logistic" => Ok(Self::Logistic),
            "binary:logitraw" => Ok(Self::LogitRaw),
            other => Err(ConversionError::UnsupportedObjective(other.to_string())),
        }
    }

    /// Convert `base_score` into margin space, as XGBoost's `ProbToMargin` does.
    fn base_margin(self, base_score: f32) -> f64 {
        match self {
            Self::Logistic => {
                let p = f64::from(base_score).clamp(1e-7, 1.0 - 1e-7);
                (p / (1.0 - p)).ln()
            }
            Self::LogitRaw => f64::from(base_score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
    },
    Leaf(f32),
}

/// A single regression tree, nodes in XGBoost's index order (root at 0).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Leaf value reached by `features`.
    ///
    /// Comparison happens in `f32`, matching XGBoost. NaN follows the default branch.
    pub fn predict(&self, features: &[f64]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                } => {
                    let x = features[feature];
                    let go_left = if x.is_nan() {
                        default_left
                    } else {
                        (x as f32) < threshold
                    };
                    idx = if go_left { left } else { right };
                }
            }
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Executable gradient-boosted ensemble for binary classification
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    tree_weights: Option<Vec<f32>>,
    base_margin: f64,
    num_features: usize,
    transform: OutputTransform,
}

impl TreeEnsemble {
    /// Number of features the ensemble was trained on
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    /// Raw additive score before the sigmoid.
    ///
    /// `features` must hold exactly `num_features()` values.
    pub fn margin(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.num_features);
        let sum: f64 = match &self.tree_weights {
            Some(weights) => self
                .trees
                .iter()
                .zip(weights)
                .map(|(tree, w)| f64::from(tree.predict(features)) * f64::from(*w))
                .sum(),
            None => self
                .trees
                .iter()
                .map(|tree| f64::from(tree.predict(features)))
                .sum(),
        };
        self.base_margin + sum
    }

    /// Positive-class probability
    pub fn probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl XgbModel {
    /// Convert to an executable [`TreeEnsemble`].
    ///
    /// Only binary gbtree and dart models with numerical splits are supported.
    pub fn to_ensemble(&self) -> Result<TreeEnsemble, ConversionError> {
        let learner = &self.learner;
        let transform = OutputTransform::from_objective(&learner.objective.name)?;

        let num_class = learner.learner_model_param.num_class;
        if num_class > 1 {
            return Err(ConversionError::NotBinary(num_class));
        }

        let (model_trees, tree_weights) = match &learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => (&gbtree.model, Some(weight_drop.clone())),
            GradientBooster::Gblinear { .. } => {
                return Err(ConversionError::UnsupportedBooster("gblinear"))
            }
        };

        if let Some(weights) = &tree_weights {
            if weights.len() != model_trees.trees.len() {
                return Err(ConversionError::DartWeights {
                    weights: weights.len(),
                    trees: model_trees.trees.len(),
                });
            }
        }

        let num_features = learner.learner_model_param.num_feature.max(0) as usize;
        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| convert_tree(tree, idx, num_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TreeEnsemble {
            trees,
            tree_weights,
            base_margin: transform.base_margin(learner.learner_model_param.base_score),
            num_features,
            transform,
        })
    }
}

fn check_len(
    tree: usize,
    array: &'static str,
    len: usize,
    num_nodes: usize,
) -> Result<(), ConversionError> {
    if len == num_nodes {
        Ok(())
    } else {
        Err(ConversionError::LengthMismatch {
            tree,
            array,
            len,
            num_nodes,
        })
    }
}

/// Convert a single XGBoost tree, validating its structure.
fn convert_tree(
    xgb_tree: &Tree,
    tree_idx: usize,
    num_features: usize,
) -> Result<RegressionTree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }

    check_len(tree_idx, "left_children", xgb_tree.left_children.len(), num_nodes)?;
    check_len(tree_idx, "right_children", xgb_tree.right_children.len(), num_nodes)?;
    check_len(tree_idx, "split_indices", xgb_tree.split_indices.len(), num_nodes)?;
    check_len(tree_idx, "split_conditions", xgb_tree.split_conditions.len(), num_nodes)?;
    check_len(tree_idx, "default_left", xgb_tree.default_left.len(), num_nodes)?;

    // Children always sit after their parent, which also rules out cycles.
    let child_index = |node: usize, child: i32| -> Result<usize, ConversionError> {
        if child <= node as i32 || child as usize >= num_nodes {
            Err(ConversionError::InvalidNodeIndex {
                tree: tree_idx,
                node,
                child,
                num_nodes,
            })
        } else {
            Ok(child as usize)
        }
    };

    let mut nodes = Vec::with_capacity(num_nodes);
    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];

        // A node is a leaf if left_child == -1 (XGBoost convention)
        if left_child == -1 {
            nodes.push(Node::Leaf(xgb_tree.split_conditions[node_idx]));
            continue;
        }

        if xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) != 0 {
            return Err(ConversionError::CategoricalSplit {
                tree: tree_idx,
                node: node_idx,
            });
        }

        let feature = xgb_tree.split_indices[node_idx];
        if feature < 0 || feature as usize >= num_features {
            return Err(ConversionError::InvalidFeatureIndex {
                tree: tree_idx,
                node: node_idx,
                feature,
                num_features,
            });
        }

        nodes.push(Node::Split {
            feature: feature as usize,
            threshold: xgb_tree.split_conditions[node_idx],
            default_left: xgb_tree.default_left[node_idx],
            left: child_index(node_idx, left_child)?,
            right: child_index(node_idx, xgb_tree.right_children[node_idx])?,
        });
    }

    Ok(RegressionTree { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn stump(feature: i32, threshold: f32, left: f32, right: f32) -> Value {
        json!({
            "tree_param": {"num_nodes": "3", "num_feature": "2"},
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [feature, 0, 0],
            "split_conditions": [threshold, left, right],
            "default_left": [1, 0, 0],
            "split_type": [0, 0, 0]
        })
    }

    fn model(booster: Value, objective: &str, base_score: &str) -> XgbModel {
        serde_json::from_value(json!({
            "version": [2, 0, 3],
            "learner": {
                "feature_names": ["a", "b"],
                "gradient_booster": booster,
                "objective": {"name": objective},
                "learner_model_param": {
                    "base_score": base_score,
                    "num_class": "0",
                    "num_feature": "2"
                }
            }
        }))
        .unwrap()
    }

    fn gbtree(trees: Vec<Value>) -> Value {
        let n = trees.len();
        json!({
            "name": "gbtree",
            "model": {
                "trees": trees,
                "tree_info": vec![0; n],
                "gbtree_model_param": {"num_trees": n.to_string()}
            }
        })
    }

    #[test]
    fn margin_sums_leaves_and_base_score() {
        let m = model(
            gbtree(vec![stump(0, 0.5, -1.0, 1.0), stump(1, 10.0, 0.25, 0.75)]),
            "binary:logistic",
            "5E-1",
        );
        let ensemble = m.to_ensemble().unwrap();
        assert_eq!(ensemble.num_trees(), 2);

        // base_score 0.5 -> margin 0
        assert!((ensemble.margin(&[0.0, 5.0]) - (-0.75)).abs() < 1e-9);
        assert!((ensemble.margin(&[1.0, 20.0]) - 1.75).abs() < 1e-9);
        assert!((ensemble.probability(&[1.0, 20.0]) - sigmoid(1.75)).abs() < 1e-12);
    }

    #[test]
    fn nan_follows_default_branch() {
        let m = model(gbtree(vec![stump(0, 0.5, -1.0, 1.0)]), "binary:logistic", "0.5");
        let ensemble = m.to_ensemble().unwrap();
        assert!((ensemble.margin(&[f64::NAN, 0.0]) - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn logistic_base_score_is_converted_to_margin() {
        let m = model(gbtree(vec![stump(0, 0.5, 0.0, 0.0)]), "binary:logistic", "0.2");
        let ensemble = m.to_ensemble().unwrap();
        assert!((ensemble.probability(&[0.0, 0.0]) - 0.2).abs() < 1e-6);

        let raw = model(gbtree(vec![stump(0, 0.5, 0.0, 0.0)]), "binary:logitraw", "0.2");
        let ensemble = raw.to_ensemble().unwrap();
        assert_eq!(ensemble.transform(), OutputTransform::LogitRaw);
        assert!((ensemble.margin(&[0.0, 0.0]) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn dart_weights_scale_tree_outputs() {
        let booster = json!({
            "name": "dart",
            "gbtree": {
                "name": "gbtree",
                "model": {
                    "trees": [stump(0, 0.5, -1.0, 1.0), stump(0, 0.5, -1.0, 1.0)],
                    "tree_info": [0, 0],
                    "gbtree_model_param": {"num_trees": "2"}
                }
            },
            "weight_drop": [1.0, 0.5]
        });
        let ensemble = model(booster, "binary:logistic", "0.5").to_ensemble().unwrap();
        assert!((ensemble.margin(&[1.0, 0.0]) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_unsupported_objective_and_booster() {
        let m = model(gbtree(vec![stump(0, 0.5, 0.0, 0.0)]), "reg:squarederror", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::UnsupportedObjective(_))
        ));

        let linear = model(json!({"name": "gblinear", "model": {}}), "binary:logistic", "0.5");
        assert!(matches!(
            linear.to_ensemble(),
            Err(ConversionError::UnsupportedBooster("gblinear"))
        ));
    }

    #[test]
    fn rejects_bad_child_index() {
        let mut tree = stump(0, 0.5, 0.0, 0.0);
        tree["right_children"] = json!([7, -1, -1]);
        let m = model(gbtree(vec![tree]), "binary:logistic", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::InvalidNodeIndex { child: 7, .. })
        ));

        let mut cyclic = stump(0, 0.5, 0.0, 0.0);
        cyclic["left_children"] = json!([0, -1, -1]);
        let m = model(gbtree(vec![cyclic]), "binary:logistic", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::InvalidNodeIndex { child: 0, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_feature_and_categorical_split() {
        let m = model(gbtree(vec![stump(5, 0.5, 0.0, 0.0)]), "binary:logistic", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::InvalidFeatureIndex { feature: 5, .. })
        ));

        let mut categorical = stump(0, 0.5, 0.0, 0.0);
        categorical["split_type"] = json!([1, 0, 0]);
        let m = model(gbtree(vec![categorical]), "binary:logistic", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::CategoricalSplit { tree: 0, node: 0 })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut tree = stump(0, 0.5, 0.0, 0.0);
        tree["split_conditions"] = json!([0.5, 0.0]);
        let m = model(gbtree(vec![tree]), "binary:logistic", "0.5");
        assert!(matches!(
            m.to_ensemble(),
            Err(ConversionError::LengthMismatch {
                array: "split_conditions",
                ..
            })
        ));
    }
}
