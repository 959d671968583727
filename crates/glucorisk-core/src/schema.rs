//! Feature schema: the ordered, typed slot table the classifier was trained on
//!
//! The table below is the only place where feature names are mapped to slot
//! positions. Everything else addresses slots through [`slot`] indices or
//! through [`FeatureSchema::index_of`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of slots in the schema (20 raw answers plus the derived index)
pub const FEATURE_COUNT: usize = 21;

/// Column name the trained artifact uses for the derived index
pub const DEFAULT_COMPOSITE_NAME: &str = "Índice_de_Salud_General";

/// Name of the auxiliary BMI input consumed by the product derivation
pub const BMI: &str = "BMI";

/// Accepted BMI range
pub const BMI_RANGE: (f64, f64) = (10.0, 100.0);

/// Slot positions, in training order
pub mod slot {
    pub const HIGH_BP: usize = 0;
    pub const HIGH_CHOL: usize = 1;
    pub const CHOL_CHECK: usize = 2;
    pub const SMOKER: usize = 3;
    pub const STROKE: usize = 4;
    pub const HEART_DISEASE_OR_ATTACK: usize = 5;
    pub const PHYS_ACTIVITY: usize = 6;
    pub const FRUITS: usize = 7;
    pub const VEGGIES: usize = 8;
    pub const HVY_ALCOHOL_CONSUMP: usize = 9;
    pub const ANY_HEALTHCARE: usize = 10;
    pub const NO_DOC_BC_COST: usize = 11;
    pub const GEN_HLTH: usize = 12;
    pub const MENT_HLTH: usize = 13;
    pub const PHYS_HLTH: usize = 14;
    pub const DIFF_WALK: usize = 15;
    pub const SEX: usize = 16;
    pub const AGE: usize = 17;
    pub const EDUCATION: usize = 18;
    pub const INCOME: usize = 19;
    pub const COMPOSITE: usize = 20;
}

/// Display language for prompts and guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "es" | "spanish" | "español" => Ok(Self::Es),
            other => Err(format!("unknown locale '{}', expected 'en' or 'es'", other)),
        }
    }
}

/// Value domain of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Yes/no indicator, exactly 0 or 1
    Binary,
    /// Enumerated category, integer in `min..=max`
    Ordinal { min: u8, max: u8 },
    /// Count of days, integer in `0..=max`
    Count { max: u8 },
    /// Computed from other inputs, never supplied by the caller
    Derived,
}

impl FeatureKind {
    /// Check a raw value against this domain
    pub fn admits(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let integral = value.fract() == 0.0;
        match *self {
            Self::Binary => value == 0.0 || value == 1.0,
            Self::Ordinal { min, max } => {
                integral && value >= f64::from(min) && value <= f64::from(max)
            }
            Self::Count { max } => integral && value >= 0.0 && value <= f64::from(max),
            Self::Derived => true,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary {{0,1}}"),
            Self::Ordinal { min, max } => write!(f, "ordinal {}..={}", min, max),
            Self::Count { max } => write!(f, "count 0..={}", max),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// How the derived health risk index is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// General-health rating multiplied by BMI
    #[default]
    Product,
    /// General-health rating alone
    RatingOnly,
}

impl Derivation {
    /// Whether this rule consumes the auxiliary BMI input
    pub fn requires_bmi(self) -> bool {
        matches!(self, Self::Product)
    }

    /// Compute the index from the general-health rating and, if needed, BMI
    pub fn apply(self, gen_hlth: f64, bmi: Option<f64>) -> Result<f64> {
        match self {
            Self::Product => {
                let bmi = bmi.ok_or_else(|| Error::MissingFeature(vec![BMI.to_string()]))?;
                Ok(gen_hlth * bmi)
            }
            Self::RatingOnly => Ok(gen_hlth),
        }
    }
}

impl FromStr for Derivation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "rating_only" | "rating-only" => Ok(Self::RatingOnly),
            other => Err(format!(
                "unknown derivation '{}', expected 'product' or 'rating_only'",
                other
            )),
        }
    }
}

struct SlotDef {
    name: &'static str,
    kind: FeatureKind,
    default_value: Option<f64>,
    prompt_en: &'static str,
    prompt_es: &'static str,
}

const fn binary(name: &'static str, prompt_en: &'static str, prompt_es: &'static str) -> SlotDef {
    SlotDef {
        name,
        kind: FeatureKind::Binary,
        default_value: None,
        prompt_en,
        prompt_es,
    }
}

const fn ordinal(
    name: &'static str,
    min: u8,
    max: u8,
    prompt_en: &'static str,
    prompt_es: &'static str,
) -> SlotDef {
    SlotDef {
        name,
        kind: FeatureKind::Ordinal { min, max },
        default_value: None,
        prompt_en,
        prompt_es,
    }
}

const fn count(name: &'static str, prompt_en: &'static str, prompt_es: &'static str) -> SlotDef {
    SlotDef {
        name,
        kind: FeatureKind::Count { max: 30 },
        default_value: None,
        prompt_en,
        prompt_es,
    }
}

/// Raw slots in training order. The derived index follows as the last slot.
const RAW_SLOTS: [SlotDef; FEATURE_COUNT - 1] = [
    binary("HighBP", "Do you have high blood pressure?", "¿Tiene presión arterial alta?"),
    binary("HighChol", "Do you have high cholesterol?", "¿Tiene el colesterol alto?"),
    binary(
        "CholCheck",
        "Have you had a cholesterol check in the past 5 years?",
        "¿Ha realizado un chequeo de colesterol en los últimos 5 años?",
    ),
    binary("Smoker", "Are you a smoker?", "¿Es fumador?"),
    binary("Stroke", "Have you ever had a stroke?", "¿Ha tenido un derrame cerebral?"),
    binary(
        "HeartDiseaseorAttack",
        "Have you had heart disease or heart attack?",
        "¿Ha tenido enfermedad cardíaca o ataque al corazón?",
    ),
    binary("PhysActivity", "Do you engage in physical activity?", "¿Realiza actividad física?"),
    binary("Fruits", "Do you regularly consume fruits?", "¿Consume frutas regularmente?"),
    binary("Veggies", "Do you regularly consume vegetables?", "¿Consume verduras regularmente?"),
    binary(
        "HvyAlcoholConsump",
        "Do you engage in heavy alcohol consumption?",
        "¿Consume alcohol en exceso?",
    ),
    // Not asked by the questionnaire; the one sanctioned implicit default.
    SlotDef {
        name: "AnyHealthcare",
        kind: FeatureKind::Binary,
        default_value: Some(1.0),
        prompt_en: "Do you have healthcare coverage?",
        prompt_es: "¿Tiene acceso a atención médica?",
    },
    binary(
        "NoDocbcCost",
        "Have you avoided seeing a doctor due to cost?",
        "¿Ha evitado ir al médico por razones de costo?",
    ),
    ordinal(
        "GenHlth",
        1,
        5,
        "How would you rate your general health? (1=Excellent, 5=Poor)",
        "¿Cómo calificaría su salud general? (1=Excelente, 5=Deficiente)",
    ),
    count(
        "MentHlth",
        "Days of poor mental health (last 30 days)",
        "Días de mala salud mental (últimos 30 días)",
    ),
    count(
        "PhysHlth",
        "Days of poor physical health (last 30 days)",
        "Días de mala salud física (últimos 30 días)",
    ),
    binary("DiffWalk", "Do you have difficulty walking?", "¿Tiene dificultad para caminar?"),
    binary("Sex", "Gender (0=Female, 1=Male)", "Género (0=Femenino, 1=Masculino)"),
    ordinal("Age", 1, 13, "Age group (five-year bands)", "Rango de edad (tramos de cinco años)"),
    ordinal("Education", 1, 6, "Education level", "Nivel educativo"),
    ordinal("Income", 1, 8, "Income level", "Rango de ingreso"),
];

/// A single named, typed position in the schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSlot {
    name: String,
    kind: FeatureKind,
    default_value: Option<f64>,
    prompt_en: &'static str,
    prompt_es: &'static str,
}

impl FeatureSlot {
    /// Column name as the trained model knows it
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value domain
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Value substituted when the caller does not supply this slot
    pub fn default_value(&self) -> Option<f64> {
        self.default_value
    }

    pub fn is_derived(&self) -> bool {
        self.kind == FeatureKind::Derived
    }

    /// Question text for this slot
    pub fn prompt(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.prompt_en,
            Locale::Es => self.prompt_es,
        }
    }

    /// Validate a supplied value against the slot's domain
    pub fn check(&self, value: f64) -> Result<f64> {
        if self.kind.admits(value) {
            Ok(value)
        } else {
            Err(Error::invalid_value(self.name.clone(), value))
        }
    }
}

/// Ordered slot table plus the active derivation rule for the derived index
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
    derivation: Derivation,
}

impl FeatureSchema {
    /// Build the schema with the given derivation rule and derived-column name
    pub fn new(derivation: Derivation, composite_name: impl Into<String>) -> Result<Self> {
        let composite_name = composite_name.into();
        if composite_name.trim().is_empty() {
            return Err(Error::config("composite feature name must not be empty"));
        }
        if composite_name == BMI || RAW_SLOTS.iter().any(|d| d.name == composite_name) {
            return Err(Error::config(format!(
                "composite feature name '{}' collides with a raw input",
                composite_name
            )));
        }

        Ok(Self::build(derivation, composite_name))
    }

    /// The schema the bundled artifact was trained with
    pub fn standard() -> Self {
        Self::build(Derivation::default(), DEFAULT_COMPOSITE_NAME.to_string())
    }

    fn build(derivation: Derivation, composite_name: String) -> Self {
        let mut slots: Vec<FeatureSlot> = RAW_SLOTS
            .iter()
            .map(|def| FeatureSlot {
                name: def.name.to_string(),
                kind: def.kind,
                default_value: def.default_value,
                prompt_en: def.prompt_en,
                prompt_es: def.prompt_es,
            })
            .collect();
        slots.push(FeatureSlot {
            name: composite_name,
            kind: FeatureKind::Derived,
            default_value: None,
            prompt_en: "Composite health risk index (computed)",
            prompt_es: "Índice de salud general (calculado)",
        });

        Self { slots, derivation }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in training order
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// Slot at a given position
    pub fn slot(&self, index: usize) -> Option<&FeatureSlot> {
        self.slots.get(index)
    }

    /// Position of a named slot
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// Slot names in training order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// Slots the caller supplies (everything except the derived index)
    pub fn raw_slots(&self) -> impl Iterator<Item = (usize, &FeatureSlot)> {
        self.slots.iter().enumerate().filter(|(_, s)| !s.is_derived())
    }

    /// Active derivation rule
    pub fn derivation(&self) -> Derivation {
        self.derivation
    }

    /// Column name of the derived index
    pub fn composite_name(&self) -> &str {
        &self.slots[slot::COMPOSITE].name
    }

    /// Whether `names` matches this schema exactly, order included
    pub fn matches_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.len() == self.slots.len()
            && names
                .iter()
                .zip(self.names())
                .all(|(given, expected)| given.as_ref() == expected)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}
