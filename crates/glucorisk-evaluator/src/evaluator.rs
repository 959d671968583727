//! The risk evaluator: raw answers in, tier and guidance out

use crate::assembler::FeatureAssembler;
use crate::config::EvaluatorConfig;
use crate::factors::{key_risk_factors, RiskFactor};
use crate::guidance::Guidance;
use crate::inputs::RawInputs;
use crate::tier::{RiskTier, TierPolicy};
use glucorisk_core::{slot, Error, FeatureSchema, Locale, Result};
use glucorisk_model::{PredictionResult, Predictor, PredictorSlot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub tier: RiskTier,

    /// Positive-class probability (0.0-1.0)
    pub probability: f64,

    /// Classifier label, independent of the tier policy
    pub label: u8,

    /// Value placed in the derived slot
    pub composite_index: f64,

    pub guidance: Guidance,

    pub risk_factors: Vec<RiskFactor>,
}

impl Assessment {
    /// Probability as a percentage for display
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Validates, assembles, scores and tiers questionnaire answers.
///
/// Holds no per-request state; share it across threads behind an `Arc`.
pub struct RiskEvaluator {
    assembler: FeatureAssembler,
    policy: TierPolicy,
    locale: Locale,
    predictor: Arc<dyn Predictor>,
}

impl RiskEvaluator {
    /// Build an evaluator around an already-loaded predictor.
    ///
    /// Fails with `Config` for invalid thresholds or composite name, and with
    /// `ModelUnavailable` when the predictor declares a feature order that
    /// differs from the configured schema.
    pub fn new(config: &EvaluatorConfig, predictor: Arc<dyn Predictor>) -> Result<Self> {
        config.validate()?;
        let schema = config.schema()?;

        if let Some(names) = predictor.feature_names() {
            if !schema.matches_names(names) {
                return Err(Error::model_unavailable(format!(
                    "predictor '{}' expects features [{}], schema declares [{}]",
                    predictor.name(),
                    names.join(", "),
                    schema.names().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        Ok(Self {
            assembler: FeatureAssembler::new(schema),
            policy: config.tier_policy,
            locale: config.locale,
            predictor,
        })
    }

    /// Build an evaluator from a predictor slot, loading it if needed
    pub fn from_slot(config: &EvaluatorConfig, slot: &PredictorSlot) -> Result<Self> {
        Self::new(config, slot.get()?)
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.assembler.schema()
    }

    pub fn policy(&self) -> TierPolicy {
        self.policy
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Evaluate one set of answers
    pub fn evaluate(&self, raw: &RawInputs) -> Result<Assessment> {
        let start = Instant::now();
        let result = self.evaluate_inner(raw);

        metrics::histogram!("glucorisk_evaluation_latency_us")
            .record(start.elapsed().as_micros() as f64);
        match &result {
            Ok(assessment) => {
                let tier = assessment.tier.as_str();
                metrics::counter!("glucorisk_evaluations_total", "tier" => tier).increment(1);
            }
            Err(e) => {
                metrics::counter!("glucorisk_evaluation_errors_total", "kind" => e.kind())
                    .increment(1);
                debug!(error = %e, "Evaluation failed");
            }
        }

        result
    }

    fn evaluate_inner(&self, raw: &RawInputs) -> Result<Assessment> {
        let record = self.assembler.assemble(raw)?;
        let prediction: PredictionResult = self.predictor.predict(&record)?;
        let tier = self.policy.classify(&prediction);

        let composite_index = record
            .at(slot::COMPOSITE)
            .ok_or_else(|| Error::internal("assembled record has no composite slot"))?;

        debug!(
            predictor = %self.predictor.name(),
            policy = self.policy.name(),
            composite_index,
            probability = prediction.probability,
            label = prediction.label,
            tier = %tier,
            "Evaluated risk"
        );

        Ok(Assessment {
            tier,
            probability: prediction.probability,
            label: prediction.label,
            composite_index,
            guidance: Guidance::for_tier(tier, self.locale),
            risk_factors: key_risk_factors(&record),
        })
    }
}

impl std::fmt::Debug for RiskEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEvaluator")
            .field("schema", self.assembler.schema())
            .field("policy", &self.policy)
            .field("locale", &self.locale)
            .field("predictor", &self.predictor.name())
            .finish()
    }
}

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        "glucorisk_evaluations_total",
        "Total number of successful evaluations by tier"
    );
    metrics::describe_counter!(
        "glucorisk_evaluation_errors_total",
        "Total number of failed evaluations by error kind"
    );
    metrics::describe_histogram!(
        "glucorisk_evaluation_latency_us",
        metrics::Unit::Microseconds,
        "Evaluation latency in microseconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucorisk_core::{FeatureRecord, DEFAULT_COMPOSITE_NAME};
    use glucorisk_model::ModelProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed probability and counts calls
    struct FixedPredictor {
        probability: f64,
        names: Option<Vec<String>>,
        calls: AtomicUsize,
    }

    impl FixedPredictor {
        fn new(probability: f64) -> Self {
            Self {
                probability,
                names: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Predictor for FixedPredictor {
        fn predict_label(&self, _record: &FeatureRecord<'_>) -> Result<u8> {
            Ok(u8::from(self.probability > 0.5))
        }

        fn predict_probability(&self, _record: &FeatureRecord<'_>) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probability)
        }

        fn feature_names(&self) -> Option<&[String]> {
            self.names.as_deref()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn inputs() -> RawInputs {
        [
            ("HighBP", 0.0),
            ("HighChol", 0.0),
            ("CholCheck", 0.0),
            ("Smoker", 0.0),
            ("Stroke", 0.0),
            ("HeartDiseaseorAttack", 0.0),
            ("PhysActivity", 0.0),
            ("Fruits", 0.0),
            ("Veggies", 0.0),
            ("HvyAlcoholConsump", 0.0),
            ("NoDocbcCost", 0.0),
            ("GenHlth", 1.0),
            ("MentHlth", 0.0),
            ("PhysHlth", 0.0),
            ("DiffWalk", 0.0),
            ("Sex", 0.0),
            ("Age", 5.0),
            ("Education", 4.0),
            ("Income", 5.0),
            ("BMI", 22.0),
        ]
        .into_iter()
        .collect()
    }

    fn evaluator(probability: f64, config: EvaluatorConfig) -> RiskEvaluator {
        RiskEvaluator::new(&config, Arc::new(FixedPredictor::new(probability))).unwrap()
    }

    #[test]
    fn test_tiers_under_default_policy() {
        let cases = [
            (0.25, RiskTier::Low),
            (0.42, RiskTier::Moderate),
            (0.81, RiskTier::High),
        ];
        for (p, tier) in cases {
            let a = evaluator(p, EvaluatorConfig::default()).evaluate(&inputs()).unwrap();
            assert_eq!(a.tier, tier, "p={}", p);
            assert_eq!(a.probability, p);
            assert_eq!(a.guidance, Guidance::for_tier(tier, Locale::En));
        }
    }

    #[test]
    fn test_binary_policy_follows_label() {
        let config = EvaluatorConfig {
            tier_policy: TierPolicy::Binary,
            ..EvaluatorConfig::default()
        };
        let a = evaluator(0.42, config).evaluate(&inputs()).unwrap();
        assert_eq!(a.tier, RiskTier::Low);
        assert_eq!(a.label, 0);
    }

    #[test]
    fn test_assessment_carries_composite_and_factors() {
        let a = evaluator(0.1, EvaluatorConfig::default())
            .evaluate(&inputs())
            .unwrap();
        assert_eq!(a.composite_index, 22.0);
        assert!((a.percent() - 10.0).abs() < 1e-9);
        assert_eq!(
            a.risk_factors,
            vec![RiskFactor::PhysicalInactivity, RiskFactor::PoorDiet]
        );
    }

    #[test]
    fn test_spanish_locale_guidance() {
        let config = EvaluatorConfig {
            locale: Locale::Es,
            ..EvaluatorConfig::default()
        };
        let a = evaluator(0.1, config).evaluate(&inputs()).unwrap();
        assert!(a.guidance.text().contains("Mantén tus hábitos saludables"));
    }

    #[test]
    fn test_validation_errors_skip_the_predictor() {
        let predictor = Arc::new(FixedPredictor::new(0.3));
        let evaluator =
            RiskEvaluator::new(&EvaluatorConfig::default(), predictor.clone()).unwrap();

        let mut missing = inputs();
        missing.remove("GenHlth");
        match evaluator.evaluate(&missing) {
            Err(Error::MissingFeature(names)) => assert_eq!(names, vec!["GenHlth"]),
            other => panic!("expected MissingFeature, got {:?}", other),
        }
        assert!(matches!(
            evaluator.evaluate(&inputs().with("Age", 14.0)),
            Err(Error::InvalidFeatureValue { .. })
        ));
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_out_of_range_probability_is_internal() {
        let evaluator = evaluator(1.5, EvaluatorConfig::default());
        assert!(matches!(evaluator.evaluate(&inputs()), Err(Error::Internal(_))));
    }

    #[test]
    fn test_predictor_with_mismatched_names_rejected() {
        let mut names: Vec<String> = FeatureSchema::standard().names().map(String::from).collect();
        names.swap(0, 1);
        let predictor = FixedPredictor {
            names: Some(names),
            ..FixedPredictor::new(0.2)
        };

        let result = RiskEvaluator::new(&EvaluatorConfig::default(), Arc::new(predictor));
        assert!(matches!(result, Err(Error::ModelUnavailable(_))));
    }

    #[test]
    fn test_predictor_with_matching_names_accepted() {
        let predictor = FixedPredictor {
            names: Some(FeatureSchema::standard().names().map(String::from).collect()),
            ..FixedPredictor::new(0.2)
        };
        let evaluator =
            RiskEvaluator::new(&EvaluatorConfig::default(), Arc::new(predictor)).unwrap();
        assert_eq!(evaluator.schema().composite_name(), DEFAULT_COMPOSITE_NAME);
    }

    #[test]
    fn test_invalid_policy_rejected_at_construction() {
        let config = EvaluatorConfig {
            tier_policy: TierPolicy::ThreeTier {
                moderate_above: 0.7,
                high_from: 0.3,
            },
            ..EvaluatorConfig::default()
        };
        let result = RiskEvaluator::new(&config, Arc::new(FixedPredictor::new(0.2)));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_slot_propagates_load_failure() {
        struct Unavailable;

        impl ModelProvider for Unavailable {
            fn load(&self) -> Result<Arc<dyn Predictor>> {
                Err(Error::model_unavailable("no artifact"))
            }

            fn source(&self) -> String {
                "nowhere".to_string()
            }
        }

        let slot = PredictorSlot::new(Arc::new(Unavailable));
        let result = RiskEvaluator::from_slot(&EvaluatorConfig::default(), &slot);
        assert!(matches!(result, Err(Error::ModelUnavailable(_))));
    }
}
