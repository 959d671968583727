//! Flagged lifestyle and clinical risk factors in an assembled record

use glucorisk_core::{slot, FeatureRecord, Locale};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// General-health rating worse than "good" (> 3)
    PoorGeneralHealth,
    HighBloodPressure,
    HighCholesterol,
    PhysicalInactivity,
    /// Does not eat both fruits and vegetables daily
    PoorDiet,
}

impl RiskFactor {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::PoorGeneralHealth, Locale::En) => "Poor general health",
            (Self::PoorGeneralHealth, Locale::Es) => "Salud general deficiente",
            (Self::HighBloodPressure, Locale::En) => "High blood pressure",
            (Self::HighBloodPressure, Locale::Es) => "Presión alta",
            (Self::HighCholesterol, Locale::En) => "High cholesterol",
            (Self::HighCholesterol, Locale::Es) => "Colesterol alto",
            (Self::PhysicalInactivity, Locale::En) => "Physical inactivity",
            (Self::PhysicalInactivity, Locale::Es) => "Inactividad física",
            (Self::PoorDiet, Locale::En) => "Poor diet",
            (Self::PoorDiet, Locale::Es) => "Dieta deficiente",
        }
    }
}

/// Factors present in `record`, in a fixed order
pub fn key_risk_factors(record: &FeatureRecord<'_>) -> Vec<RiskFactor> {
    let at = |index| record.at(index).unwrap_or(0.0);
    let yes = |index| at(index) == 1.0;

    let checks = [
        (at(slot::GEN_HLTH) > 3.0, RiskFactor::PoorGeneralHealth),
        (yes(slot::HIGH_BP), RiskFactor::HighBloodPressure),
        (yes(slot::HIGH_CHOL), RiskFactor::HighCholesterol),
        (!yes(slot::PHYS_ACTIVITY), RiskFactor::PhysicalInactivity),
        (!(yes(slot::FRUITS) && yes(slot::VEGGIES)), RiskFactor::PoorDiet),
    ];

    checks
        .into_iter()
        .filter_map(|(flagged, factor)| flagged.then_some(factor))
        .collect()
}
