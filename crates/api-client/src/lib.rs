use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceHistory, RawMetadata};

pub mod error;
pub mod responses;
pub mod retry;
pub mod yahoo;
// --- Public API ---
pub use retry::RetryPolicy;
pub use yahoo::YahooClient;

/// The abstract interface for a historical price provider.
/// This trait is the contract the analyzer uses, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches daily closing prices for `symbol` from `start` (inclusive) to `end` (exclusive).
    ///
    /// An empty history is a valid answer; deciding whether it is usable is
    /// left to the caller.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, ApiError>;
}

/// The abstract interface for descriptive instrument attributes.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches whatever descriptive fields the provider knows for `symbol`.
    async fn fetch_metadata(&self, symbol: &str) -> Result<RawMetadata, ApiError>;
}
