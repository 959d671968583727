//! Raw questionnaire answers as supplied by the caller

use glucorisk_core::{FeatureSchema, BMI};
use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Mapping from input name to the numeric answer.
///
/// Order of insertion is irrelevant: feature records are assembled by walking
/// the schema, never by iterating this map.
///
/// When deserialized, questionnaire inputs must be numbers. Entries under
/// other names are kept if numeric and dropped otherwise, so answer files may
/// carry extra annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawInputs(BTreeMap<String, f64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Number(f64),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for RawInputs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, AnswerValue>::deserialize(deserializer)?;
        let schema = FeatureSchema::standard();

        let mut answers = BTreeMap::new();
        for (name, value) in entries {
            match value {
                AnswerValue::Number(v) => {
                    answers.insert(name, v);
                }
                AnswerValue::Other(_) if name == BMI || schema.index_of(&name).is_some() => {
                    return Err(de::Error::custom(format!("answer '{}' must be a number", name)));
                }
                AnswerValue::Other(_) => {
                    debug!(input = %name, "Ignoring non-numeric unknown input")
                }
            }
        }
        Ok(Self(answers))
    }
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an answer
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    /// Remove an answer
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Supplied input names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for RawInputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_json_object() {
        let raw: RawInputs = serde_json::from_str(r#"{"HighBP": 1, "BMI": 27.5}"#).unwrap();
        assert_eq!(raw.get("HighBP"), Some(1.0));
        assert_eq!(raw.get("BMI"), Some(27.5));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_non_numeric_unknown_entries_dropped() {
        let raw: RawInputs =
            serde_json::from_str(r#"{"HighBP": 0, "note": "hi", "tags": [1, 2], "extra": 3}"#)
                .unwrap();
        assert_eq!(raw.get("HighBP"), Some(0.0));
        assert!(!raw.contains("note"));
        assert!(!raw.contains("tags"));
        assert_eq!(raw.get("extra"), Some(3.0));
    }

    #[test]
    fn test_non_numeric_known_input_rejected() {
        let err = serde_json::from_str::<RawInputs>(r#"{"HighBP": "yes"}"#).unwrap_err();
        assert!(err.to_string().contains("'HighBP' must be a number"), "{}", err);
        assert!(serde_json::from_str::<RawInputs>(r#"{"BMI": null}"#).is_err());
    }

    #[test]
    fn test_builder_and_from_iter_agree() {
        let built = RawInputs::new().with("Age", 5.0).with("Sex", 0.0);
        let collected: RawInputs = [("Sex", 0.0), ("Age", 5.0)].into_iter().collect();
        assert_eq!(built, collected);
    }
}
