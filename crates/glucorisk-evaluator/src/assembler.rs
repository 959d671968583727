//! Feature assembly: validate raw answers and build a schema-ordered record

use crate::inputs::RawInputs;
use glucorisk_core::{slot, Error, FeatureRecord, FeatureSchema, Result, BMI, BMI_RANGE};
use tracing::debug;

/// Builds feature records for one schema
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
}

impl FeatureAssembler {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Names the caller must supply under the active derivation, in schema order
    pub fn required_inputs(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .schema
            .raw_slots()
            .filter(|(_, s)| s.default_value().is_none())
            .map(|(_, s)| s.name())
            .collect();
        if self.schema.derivation().requires_bmi() {
            names.push(BMI);
        }
        names
    }

    /// Validate `raw` and build the record.
    ///
    /// Missing names are reported all at once before any domain check; domain
    /// violations are reported for the first offending input in schema order.
    pub fn assemble(&self, raw: &RawInputs) -> Result<FeatureRecord<'_>> {
        let missing: Vec<String> = self
            .required_inputs()
            .into_iter()
            .filter(|name| !raw.contains(name))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFeature(missing));
        }

        for name in raw.names() {
            match self.schema.index_of(name) {
                None if name != BMI => debug!(input = %name, "Ignoring unknown input"),
                Some(slot::COMPOSITE) => {
                    debug!(input = %name, "Ignoring supplied value for derived feature")
                }
                _ => {}
            }
        }

        // The derived slot is last, so BMI is checked after every raw slot
        FeatureRecord::build(&self.schema, |index, slot| {
            if slot.is_derived() {
                self.derive(raw)
            } else {
                self.raw_value(raw, index)
            }
        })
    }

    fn derive(&self, raw: &RawInputs) -> Result<f64> {
        let bmi = raw.get(BMI).map(check_bmi).transpose()?;
        let gen_hlth = self.raw_value(raw, slot::GEN_HLTH)?;
        self.schema.derivation().apply(gen_hlth, bmi)
    }

    /// Validated value for a raw slot, falling back to the slot's declared default
    fn raw_value(&self, raw: &RawInputs, index: usize) -> Result<f64> {
        let slot = self
            .schema
            .slot(index)
            .ok_or_else(|| Error::internal(format!("no slot at position {}", index)))?;
        let value = raw
            .get(slot.name())
            .or_else(|| slot.default_value())
            .ok_or_else(|| Error::MissingFeature(vec![slot.name().to_string()]))?;
        slot.check(value)
    }
}

fn check_bmi(value: f64) -> Result<f64> {
    let (min, max) = BMI_RANGE;
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::invalid_value(BMI, value))
    }
}
