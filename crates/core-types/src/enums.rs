use crate::metadata::FieldValue;
use serde::{Deserialize, Serialize};

/// The descriptive attributes fetched for every instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Company,
    Sector,
    Industry,
    MarketCap,
}

impl MetadataField {
    pub const ALL: [MetadataField; 4] = [
        MetadataField::Company,
        MetadataField::Sector,
        MetadataField::Industry,
        MetadataField::MarketCap,
    ];

    /// The placeholder used when the metadata source does not report this field.
    pub fn default_value(&self) -> FieldValue {
        match self {
            MetadataField::Company | MetadataField::Sector | MetadataField::Industry => {
                FieldValue::Text("N/A".to_string())
            }
            MetadataField::MarketCap => FieldValue::Number(0.0),
        }
    }

    /// Column header used by the report sinks.
    pub fn label(&self) -> &'static str {
        match self {
            MetadataField::Company => "Company",
            MetadataField::Sector => "Sector",
            MetadataField::Industry => "Industry",
            MetadataField::MarketCap => "Market Cap (B)",
        }
    }
}
