use crate::enums::MetadataField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single attribute value as reported by a metadata source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// Whatever subset of fields the metadata source managed to report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    fields: HashMap<MetadataField, FieldValue>,
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: MetadataField, value: FieldValue) {
        self.fields.insert(field, value);
    }

    /// Builder-style variant of [`RawMetadata::insert`].
    pub fn with(mut self, field: MetadataField, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: MetadataField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Static descriptive attributes of an instrument, with every absent field
/// already replaced by its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    pub symbol: String,
    pub company: String,
    pub sector: String,
    pub industry: String,
    /// Market capitalisation in currency units (not billions).
    pub market_cap: f64,
}

impl InstrumentMetadata {
    /// Applies the per-field defaults uniformly to whatever the source returned.
    ///
    /// A field reported with the wrong kind of value (text where a number is
    /// expected, or the reverse) is treated as absent.
    pub fn resolve(symbol: &str, raw: &RawMetadata) -> Self {
        Self {
            symbol: symbol.to_string(),
            company: text_field(raw, MetadataField::Company),
            sector: text_field(raw, MetadataField::Sector),
            industry: text_field(raw, MetadataField::Industry),
            market_cap: number_field(raw, MetadataField::MarketCap),
        }
    }

    /// A record made entirely of defaults, used when the fetch itself failed.
    pub fn placeholder(symbol: &str) -> Self {
        Self::resolve(symbol, &RawMetadata::default())
    }

    /// Market capitalisation in billions, rounded to two decimals.
    pub fn market_cap_billions(&self) -> f64 {
        (self.market_cap / 1e9 * 100.0).round() / 100.0
    }
}

fn text_field(raw: &RawMetadata, field: MetadataField) -> String {
    match raw.get(field) {
        Some(FieldValue::Text(value)) if !value.trim().is_empty() => value.clone(),
        _ => match field.default_value() {
            FieldValue::Text(default) => default,
            FieldValue::Number(n) => n.to_string(),
        },
    }
}

fn number_field(raw: &RawMetadata, field: MetadataField) -> f64 {
    match raw.get(field) {
        Some(FieldValue::Number(value)) if value.is_finite() => *value,
        _ => match field.default_value() {
            FieldValue::Number(default) => default,
            FieldValue::Text(_) => 0.0,
        },
    }
}
