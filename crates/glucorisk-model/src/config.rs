//! Model artifact configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the trained artifact lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the XGBoost JSON model
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl ModelConfig {
    /// Configuration for a model at a local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/diabetes_xgb.json")
}
