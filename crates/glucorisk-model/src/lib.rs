//! GlucoRisk Model Provider
//!
//! Owns the trained classifier artifact and exposes it as a [`Predictor`].
//!
//! - [`XgbModelProvider`] reads an XGBoost JSON model (`Booster.save_model("*.json")`),
//!   validates it against the feature schema and builds a tree-ensemble predictor.
//! - [`PredictorSlot`] memoizes the loaded predictor with an explicit
//!   load / reload / teardown lifecycle.
//!
//! Evaluation logic only sees the [`Predictor`] trait, so it can run against
//! a fake predictor in tests or a retrained artifact in production.

pub mod config;
pub mod predictor;
pub mod provider;
pub mod slot;
pub mod xgboost;

pub use config::ModelConfig;
pub use predictor::{PredictionResult, Predictor};
pub use provider::{BoosterPredictor, ModelProvider, XgbModelProvider};
pub use slot::{global, install_global, teardown_global, PredictorSlot};
pub use xgboost::{ConversionError, TreeEnsemble, XgbModel};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::predictor::{PredictionResult, Predictor};
    pub use crate::provider::{ModelProvider, XgbModelProvider};
    pub use crate::slot::PredictorSlot;
}
