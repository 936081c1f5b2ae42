use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Empty, misaligned, or non-positive price data.
    #[error("Invalid price data: {0}")]
    InvalidPriceData(String),

    /// Fewer than two observations.
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    /// The allocation vector does not match the instrument universe.
    #[error("Weight mismatch: {0}")]
    WeightMismatch(String),
}
