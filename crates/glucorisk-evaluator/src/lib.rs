//! GlucoRisk Risk Evaluator
//!
//! Turns questionnaire answers into a diabetes-risk assessment:
//!
//! 1. validate raw answers against the feature schema
//! 2. derive the composite health index
//! 3. assemble the schema-ordered feature record
//! 4. score it with a [`Predictor`](glucorisk_model::Predictor)
//! 5. map the probability to a [`RiskTier`] and attach guidance
//!
//! `AnyHealthcare` is the only input with an implicit default (1, covered).
//! Every other missing or out-of-domain answer is an error.
//!
//! ```no_run
//! use glucorisk_evaluator::{EvaluatorConfig, RawInputs, RiskEvaluator};
//! use glucorisk_model::{ModelProvider, XgbModelProvider};
//!
//! # fn main() -> glucorisk_core::Result<()> {
//! let config = EvaluatorConfig::from_file("glucorisk.yaml")?;
//! let provider = XgbModelProvider::new(config.model.clone(), config.schema()?);
//! let evaluator = RiskEvaluator::new(&config, provider.load()?)?;
//!
//! let answers: RawInputs = serde_json::from_str(r#"{"HighBP": 0, "BMI": 22.0}"#)?;
//! let assessment = evaluator.evaluate(&answers)?;
//! println!("{} ({:.1}%)", assessment.tier, assessment.percent());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod evaluator;
pub mod factors;
pub mod guidance;
pub mod inputs;
pub mod tier;

pub use assembler::FeatureAssembler;
pub use config::EvaluatorConfig;
pub use evaluator::{describe_metrics, Assessment, RiskEvaluator};
pub use factors::{key_risk_factors, RiskFactor};
pub use guidance::{disclaimer, Guidance};
pub use inputs::RawInputs;
pub use tier::{RiskTier, TierPolicy};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EvaluatorConfig;
    pub use crate::evaluator::{Assessment, RiskEvaluator};
    pub use crate::inputs::RawInputs;
    pub use crate::tier::{RiskTier, TierPolicy};
}
