//! Predictor trait and common types

use glucorisk_core::{Error, FeatureRecord, Result};

/// Trait for loaded classifiers.
///
/// Implementations are immutable after load and safe to share across threads.
pub trait Predictor: Send + Sync {
    /// Predicted class, 0 or 1
    fn predict_label(&self, record: &FeatureRecord<'_>) -> Result<u8>;

    /// Positive-class probability in [0, 1]
    fn predict_probability(&self, record: &FeatureRecord<'_>) -> Result<f64>;

    /// Feature order the underlying model expects, when the artifact declares one
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Human-readable identifier for logs
    fn name(&self) -> &str;

    /// Run both scoring calls and check the probability contract
    fn predict(&self, record: &FeatureRecord<'_>) -> Result<PredictionResult> {
        let label = self.predict_label(record)?;
        let probability = self.predict_probability(record)?;
        PredictionResult::new(label, probability)
    }
}

/// Result of scoring one feature record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Predicted class
    pub label: u8,

    /// Positive-class probability (0.0-1.0)
    pub probability: f64,
}

impl PredictionResult {
    /// Create a result, rejecting labels other than 0/1 and probabilities outside [0, 1]
    pub fn new(label: u8, probability: f64) -> Result<Self> {
        if label > 1 {
            return Err(Error::internal(format!(
                "predictor returned label {}, expected 0 or 1",
                label
            )));
        }
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(Error::internal(format!(
                "predictor returned probability {}, expected a value in [0, 1]",
                probability
            )));
        }
        Ok(Self { label, probability })
    }
}
