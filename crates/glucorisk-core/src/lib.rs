//! GlucoRisk Core
//!
//! Core types shared across GlucoRisk components.
//!
//! This crate provides:
//! - The feature schema: ordered, typed slots the classifier was trained on
//! - Feature records built strictly in schema order
//! - The derivation rule for the composite health risk index
//! - Error types and result handling

pub mod error;
pub mod record;
pub mod schema;

pub use error::{Error, Result};
pub use record::FeatureRecord;
pub use schema::{
    slot, Derivation, FeatureKind, FeatureSchema, FeatureSlot, Locale, BMI, BMI_RANGE,
    DEFAULT_COMPOSITE_NAME, FEATURE_COUNT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::record::FeatureRecord;
    pub use crate::schema::{Derivation, FeatureSchema, Locale};
}
