//! Risk tiers and the threshold policies that produce them

use glucorisk_core::{Error, Result};
use glucorisk_model::PredictionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk level reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from a prediction to a tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum TierPolicy {
    /// Label 1 is High, label 0 is Low. Never yields Moderate.
    Binary,

    /// Probability bands: `p <= moderate_above` is Low,
    /// `p >= high_from` is High, anything between is Moderate
    ThreeTier {
        #[serde(default = "default_moderate_above")]
        moderate_above: f64,

        #[serde(default = "default_high_from")]
        high_from: f64,
    },
}

fn default_moderate_above() -> f64 {
    0.30
}

fn default_high_from() -> f64 {
    0.50
}

impl Default for TierPolicy {
    /// Three bands at 0.30 and 0.50.
    ///
    /// Under this default a probability of 0.45 is Moderate even though the
    /// classifier's own label is 0; use [`TierPolicy::Binary`] to follow the label.
    fn default() -> Self {
        Self::ThreeTier {
            moderate_above: default_moderate_above(),
            high_from: default_high_from(),
        }
    }
}

impl TierPolicy {
    /// Three-tier policy with custom thresholds
    pub fn three_tier(moderate_above: f64, high_from: f64) -> Result<Self> {
        let policy = Self::ThreeTier {
            moderate_above,
            high_from,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Short name for logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::ThreeTier { .. } => "three_tier",
        }
    }

    /// Require `0 <= moderate_above < high_from <= 1`
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Binary => Ok(()),
            Self::ThreeTier {
                moderate_above,
                high_from,
            } => {
                let ordered =
                    moderate_above >= 0.0 && moderate_above < high_from && high_from <= 1.0;
                if ordered {
                    Ok(())
                } else {
                    Err(Error::config(format!(
                        "tier thresholds must satisfy 0 <= moderate_above < high_from <= 1, \
                         got {} and {}",
                        moderate_above, high_from
                    )))
                }
            }
        }
    }

    /// Tier for a scored record
    pub fn classify(&self, prediction: &PredictionResult) -> RiskTier {
        match *self {
            Self::Binary => {
                if prediction.label == 1 {
                    RiskTier::High
                } else {
                    RiskTier::Low
                }
            }
            Self::ThreeTier {
                moderate_above,
                high_from,
            } => {
                let p = prediction.probability;
                if p >= high_from {
                    RiskTier::High
                } else if p > moderate_above {
                    RiskTier::Moderate
                } else {
                    RiskTier::Low
                }
            }
        }
    }
}
