//! Model loading: turns the on-disk artifact into a ready predictor

use crate::config::ModelConfig;
use crate::predictor::Predictor;
use crate::xgboost::{TreeEnsemble, XgbModel};
use glucorisk_core::{Error, FeatureRecord, FeatureSchema, Result};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::{info, warn};

/// Source of predictors.
///
/// `load` is idempotent and has no side effect beyond reading the artifact.
pub trait ModelProvider: Send + Sync {
    /// Load a ready-to-use predictor
    fn load(&self) -> Result<Arc<dyn Predictor>>;

    /// Where this provider loads from, for logs
    fn source(&self) -> String;
}

/// Provider reading an XGBoost JSON model from the local file system
pub struct XgbModelProvider {
    config: ModelConfig,
    schema: FeatureSchema,
}

impl XgbModelProvider {
    /// Create a provider that validates artifacts against `schema`
    pub fn new(config: ModelConfig, schema: FeatureSchema) -> Self {
        Self { config, schema }
    }

    /// Provider for the standard schema
    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(ModelConfig::from_local(path), FeatureSchema::standard())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Load and validate the artifact as a concrete [`BoosterPredictor`]
    pub fn load_booster(&self) -> Result<BoosterPredictor> {
        let path = &self.config.path;
        info!(path = %path.display(), "Loading XGBoost model");

        if !path.exists() {
            return Err(Error::model_unavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            Error::model_unavailable(format!("failed to open {}: {}", path.display(), e))
        })?;
        let model = XgbModel::from_reader(BufReader::new(file)).map_err(|e| {
            Error::model_unavailable(format!(
                "{} is not a valid XGBoost JSON model: {}",
                path.display(),
                e
            ))
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "xgboost".to_string());

        let predictor = BoosterPredictor::from_model(name, &model, &self.schema)?;

        info!(
            model = %predictor.name,
            xgboost_version = %model.version_string(),
            trees = predictor.ensemble.num_trees(),
            features = predictor.ensemble.num_features(),
            "Model loaded successfully"
        );

        Ok(predictor)
    }
}

impl ModelProvider for XgbModelProvider {
    fn load(&self) -> Result<Arc<dyn Predictor>> {
        Ok(Arc::new(self.load_booster()?))
    }

    fn source(&self) -> String {
        self.config.path.display().to_string()
    }
}

/// Predictor backed by a gradient-boosted tree ensemble
#[derive(Debug, Clone)]
pub struct BoosterPredictor {
    name: String,
    ensemble: TreeEnsemble,
    feature_names: Vec<String>,
}

impl BoosterPredictor {
    /// Build from a parsed model, checking it against the schema.
    ///
    /// Feature count must equal the schema's. If the artifact declares feature
    /// names they must match the schema's names and order exactly.
    pub fn from_model(
        name: impl Into<String>,
        model: &XgbModel,
        schema: &FeatureSchema,
    ) -> Result<Self> {
        let name = name.into();
        let ensemble = model.to_ensemble().map_err(|e| {
            warn!(model = %name, error = %e, "Rejected incompatible model");
            Error::model_unavailable(format!("{}: {}", name, e))
        })?;

        if ensemble.num_features() != schema.len() {
            return Err(Error::model_unavailable(format!(
                "{} expects {} features, schema has {}",
                name,
                ensemble.num_features(),
                schema.len()
            )));
        }

        let declared = &model.learner.feature_names;
        let feature_names = if declared.is_empty() {
            warn!(model = %name, "Model declares no feature names, assuming schema order");
            schema.names().map(String::from).collect()
        } else if schema.matches_names(declared) {
            declared.clone()
        } else {
            return Err(Error::model_unavailable(format!(
                "{} feature names do not match the schema: {}",
                name,
                describe_mismatch(declared, schema)
            )));
        };

        Ok(Self {
            name,
            ensemble,
            feature_names,
        })
    }

    /// The underlying ensemble
    pub fn ensemble(&self) -> &TreeEnsemble {
        &self.ensemble
    }

    fn check_record(&self, record: &FeatureRecord<'_>) -> Result<()> {
        if record.schema().matches_names(&self.feature_names) {
            Ok(())
        } else {
            Err(Error::internal(format!(
                "feature record does not match {}: {}",
                self.name,
                describe_mismatch(&self.feature_names, record.schema())
            )))
        }
    }
}

fn describe_mismatch(names: &[String], schema: &FeatureSchema) -> String {
    if names.len() != schema.len() {
        return format!("{} names for {} slots", names.len(), schema.len());
    }
    names
        .iter()
        .zip(schema.names())
        .enumerate()
        .find(|(_, (given, expected))| given.as_str() != *expected)
        .map(|(i, (given, expected))| {
            format!("position {} is '{}', expected '{}'", i, given, expected)
        })
        .unwrap_or_else(|| "no difference".to_string())
}

impl Predictor for BoosterPredictor {
    fn predict_label(&self, record: &FeatureRecord<'_>) -> Result<u8> {
        Ok(u8::from(self.predict_probability(record)? > 0.5))
    }

    fn predict_probability(&self, record: &FeatureRecord<'_>) -> Result<f64> {
        self.check_record(record)?;
        Ok(self.ensemble.probability(record.values()))
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
