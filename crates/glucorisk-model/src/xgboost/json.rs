//! XGBoost JSON model format.
//!
//! Foreign types mirroring the document written by `Booster.save_model("*.json")`.
//! Only the parts needed for binary classification scoring are modelled; unknown
//! keys are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

// =============================================================================
// Custom deserializers for XGBoost-specific formats
// =============================================================================

/// `base_score` appears as a number, a string, an array, or a bracketed string
/// such as `"[5E-1]"` depending on the XGBoost version that wrote it.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                if let Ok(f) = s.parse::<f32>() {
                    return Ok(f);
                }
                let t = s.trim();
                if t.starts_with('[') && t.ends_with(']') {
                    if let Ok(f) = t[1..t.len() - 1].trim().parse::<f32>() {
                        return Ok(f);
                    }
                }
                return Err(SerdeError::custom(format!(
                    "cannot parse base_score from string: {}",
                    s
                )));
            }
            Value::Array(arr) => match arr.into_iter().next() {
                Some(first) => cur = first,
                None => return Err(SerdeError::custom("empty base_score array")),
            },
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ))
            }
        }
    }
}

fn flag_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim() {
            "1" => Some(true),
            "0" => Some(false),
            t if t.eq_ignore_ascii_case("true") => Some(true),
            t if t.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `default_left` is written as 0/1 integers by most versions and as booleans
/// by some.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|v| {
            flag_from_value(v).ok_or_else(|| SerdeError::custom(format!("invalid flag: {}", v)))
        })
        .collect()
}

// =============================================================================
// Tree / model level definitions
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    #[serde(default)]
    pub id: i32,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    /// Threshold for split nodes, leaf value for leaves
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(default)]
    pub base_weights: Vec<f32>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeModelParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_trees: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
    pub gbtree_model_param: GBTreeModelParam,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

/// Gradient booster variants (gbtree | gblinear | dart)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Gblinear {
        #[serde(default)]
        model: Value,
    },
    Dart {
        gbtree: GBTreeDefinition,
        weight_drop: Vec<f32>,
    },
}

impl GradientBooster {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gbtree { .. } => "gbtree",
            Self::Gblinear { .. } => "gblinear",
            Self::Dart { .. } => "dart",
        }
    }
}

// =============================================================================
// Objective / learner-level definitions
// =============================================================================

/// Objective block; only the name matters for scoring
#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_class: i64,
    #[serde_as(as = "DisplayFromStr")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_types: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// =============================================================================
// Top-level XGBoost model
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    #[serde(default)]
    pub version: Vec<u32>,
    pub learner: Learner,
}

impl XgbModel {
    /// Parse a model from a reader over the JSON document
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Parse a model from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Dotted version string of the XGBoost release that wrote the file
    pub fn version_string(&self) -> String {
        self.version
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_score_parses_number_string_array_and_bracketed() {
        let cases = [
            json!({"base_score": 0.5, "num_class": "0", "num_feature": "21"}),
            json!({"base_score": "5E-1", "num_class": "0", "num_feature": "21"}),
            json!({"base_score": [0.5], "num_class": "0", "num_feature": "21"}),
            json!({"base_score": "[5E-1]", "num_class": "0", "num_feature": "21"}),
        ];

        for case in cases {
            let param: LearnerModelParam = serde_json::from_value(case.clone()).unwrap();
            assert_eq!(param.base_score, 0.5, "{}", case);
            assert_eq!(param.num_feature, 21);
        }
    }

    #[test]
    fn base_score_rejects_garbage() {
        let v = json!({"base_score": "abc", "num_class": "0", "num_feature": "21"});
        assert!(serde_json::from_value::<LearnerModelParam>(v).is_err());

        let v = json!({"base_score": [], "num_class": "0", "num_feature": "21"});
        assert!(serde_json::from_value::<LearnerModelParam>(v).is_err());
    }

    #[test]
    fn default_left_accepts_ints_and_bools() {
        let tree = json!({
            "tree_param": {"num_nodes": "3", "num_feature": "21"},
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [0, 0, 0],
            "split_conditions": [0.5, -1.0, 1.0],
            "default_left": [1, false, "0"]
        });
        let tree: Tree = serde_json::from_value(tree).unwrap();
        assert_eq!(tree.default_left, vec![true, false, false]);
        assert_eq!(tree.tree_param.num_nodes, 3);
        assert!(tree.split_type.is_empty());
    }

    #[test]
    fn booster_tag_selects_variant() {
        let v = json!({"name": "gblinear", "model": {"weights": [0.1]}});
        let booster: GradientBooster = serde_json::from_value(v).unwrap();
        assert_eq!(booster.name(), "gblinear");
    }
}
