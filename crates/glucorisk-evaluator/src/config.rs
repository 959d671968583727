//! Evaluator configuration

use crate::tier::TierPolicy;
use glucorisk_core::{Derivation, Error, FeatureSchema, Locale, Result, DEFAULT_COMPOSITE_NAME};
use glucorisk_model::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Everything that distinguishes one deployment of the evaluator from another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// How the composite health index is derived
    #[serde(default)]
    pub derivation: Derivation,

    /// Probability-to-tier mapping
    #[serde(default)]
    pub tier_policy: TierPolicy,

    /// Column name of the composite index in the trained model
    #[serde(default = "default_composite_name")]
    pub composite_name: String,

    /// Language for guidance and risk-factor labels
    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub model: ModelConfig,
}

impl EvaluatorConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid evaluator config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file, or fall back to defaults when the file does not exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No evaluator config found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.tier_policy.validate()?;
        self.schema().map(|_| ())
    }

    /// Feature schema described by this configuration
    pub fn schema(&self) -> Result<FeatureSchema> {
        FeatureSchema::new(self.derivation, self.composite_name.clone())
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            derivation: Derivation::default(),
            tier_policy: TierPolicy::default(),
            composite_name: default_composite_name(),
            locale: Locale::default(),
            model: ModelConfig::default(),
        }
    }
}

fn default_composite_name() -> String {
    DEFAULT_COMPOSITE_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EvaluatorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EvaluatorConfig::default());
        assert_eq!(config.derivation, Derivation::Product);
        assert_eq!(config.tier_policy, TierPolicy::default());
        assert_eq!(config.composite_name, DEFAULT_COMPOSITE_NAME);
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
derivation: rating_only
tier_policy:
  type: binary
composite_name: Health_Risk_Index
locale: es
model:
  path: /opt/models/retrained.json
"#;
        let config = EvaluatorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.derivation, Derivation::RatingOnly);
        assert_eq!(config.tier_policy, TierPolicy::Binary);
        assert_eq!(config.locale, Locale::Es);
        assert_eq!(config.model.path, PathBuf::from("/opt/models/retrained.json"));

        let schema = config.schema().unwrap();
        assert_eq!(schema.composite_name(), "Health_Risk_Index");
    }

    #[test]
    fn test_named_policies_round_trip() {
        for policy in [TierPolicy::Binary, TierPolicy::three_tier(0.25, 0.6).unwrap()] {
            let config = EvaluatorConfig {
                tier_policy: policy,
                ..EvaluatorConfig::default()
            };
            let yaml = serde_yaml::to_string(&config).unwrap();
            assert_eq!(EvaluatorConfig::from_yaml(&yaml).unwrap(), config);
        }
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let yaml = "tier_policy:\n  type: three_tier\n  moderate_above: 0.6\n  high_from: 0.4\n";
        assert!(matches!(EvaluatorConfig::from_yaml(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn test_colliding_composite_name_rejected() {
        assert!(matches!(
            EvaluatorConfig::from_yaml("composite_name: BMI"),
            Err(Error::Config(_))
        ));
        assert!(EvaluatorConfig::from_yaml("derivation: sum").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = EvaluatorConfig::from_file(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(missing, EvaluatorConfig::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glucorisk.yaml");
        std::fs::write(&path, "locale: es\n").unwrap();
        assert_eq!(EvaluatorConfig::from_file(&path).unwrap().locale, Locale::Es);
    }
}
