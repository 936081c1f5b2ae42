//! # Vantage Core Types
//!
//! The shared data model of the workspace: price and return tables, single
//! series, and descriptive instrument metadata. Every other crate speaks in
//! these types, so this crate has no knowledge of networking, reporting, or
//! the web layer.

pub mod enums;
pub mod error;
pub mod frame;
pub mod metadata;
pub mod symbols;

// Re-export the core types to provide a clean public API.
pub use enums::MetadataField;
pub use error::CoreError;
pub use frame::{CumulativeReturnSeries, Frame, PriceHistory, PriceSeries, ReturnSeries, Series};
pub use metadata::{FieldValue, InstrumentMetadata, RawMetadata};
pub use symbols::parse_symbol_list;
