//! # Vantage Analytics Engine
//!
//! This crate computes descriptive return and risk statistics for a set of
//! instruments from their aligned daily closing prices.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `MetricsEngine` is a stateless calculator. It takes
//!   a price frame as input and produces an `AnalysisReport` as output.
//! - **No silent NaNs:** Bad prices are rejected up front, and statistics that are
//!   undefined for zero-variance series are reported as `None`.
//!
//! ## Public API
//!
//! - `MetricsEngine`: Runs every metric over a price frame.
//! - `metrics`: The individual `compute_*` operations.
//! - `AnalysisReport`, `SummaryRow`, `CorrelationMatrix`: The engine's output.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{Allocation, MetricsEngine};
pub use error::AnalyticsError;
pub use metrics::{
    compute_correlation, compute_cumulative, compute_drawdown, compute_max_drawdown,
    compute_portfolio_return, compute_returns, compute_sharpe, compute_total_return,
    compute_volatility, equal_weights, validate_prices, TRADING_DAYS_PER_YEAR,
};
pub use report::{AnalysisReport, CorrelationMatrix, SummaryRow};
