//! Per-request feature records
//!
//! A [`FeatureRecord`] can only be built by walking a [`FeatureSchema`] slot by
//! slot, so its values are always in training order.

use crate::schema::{FeatureSchema, FeatureSlot, FEATURE_COUNT};
use crate::{Error, Result};

/// One request's feature values, ordered per the schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord<'s> {
    schema: &'s FeatureSchema,
    values: [f64; FEATURE_COUNT],
}

impl<'s> FeatureRecord<'s> {
    /// Build a record by asking `value_for` for each slot in schema order.
    ///
    /// Every produced value must be finite.
    pub fn build<F>(schema: &'s FeatureSchema, mut value_for: F) -> Result<Self>
    where
        F: FnMut(usize, &FeatureSlot) -> Result<f64>,
    {
        if schema.len() != FEATURE_COUNT {
            return Err(Error::internal(format!(
                "schema has {} slots, expected {}",
                schema.len(),
                FEATURE_COUNT
            )));
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (index, slot) in schema.slots().iter().enumerate() {
            let value = value_for(index, slot)?;
            if !value.is_finite() {
                return Err(Error::invalid_value(slot.name(), value));
            }
            values[index] = value;
        }

        Ok(Self { schema, values })
    }

    /// The schema this record was built from
    pub fn schema(&self) -> &'s FeatureSchema {
        self.schema
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Value of a named slot
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }

    /// Value at a slot position
    pub fn at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// (name, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema.names().zip(self.values.iter().copied())
    }

    /// Little-endian encoding of the values, slot by slot
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }
}
