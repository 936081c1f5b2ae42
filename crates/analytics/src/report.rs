use chrono::NaiveDate;
use core_types::{CumulativeReturnSeries, Frame, PriceSeries, ReturnSeries, Series};
use serde::Serialize;

/// Return and risk statistics of one instrument (or of the whole portfolio).
///
/// Ratios are fractions, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub symbol: String,
    pub total_return: f64,
    pub volatility: Option<f64>,   // Option<> for series with fewer than two returns
    pub sharpe_ratio: Option<f64>, // Option<> for cases with no stdev
    pub max_drawdown: f64,
}

/// Symmetric instrument-by-instrument table of Pearson correlations.
///
/// An off-diagonal entry is `None` when either series has zero variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub(crate) fn new(symbols: Vec<String>, values: Vec<Vec<Option<f64>>>) -> Self {
        Self { symbols, values }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.at(i, j)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Everything the engine derives from one aligned price frame.
///
/// This struct is the output of the `MetricsEngine` and the data transfer
/// object consumed by the report sinks and the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weights: Vec<f64>,

    // I. Series
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub cumulative: CumulativeReturnSeries,
    /// Drawdown over the full price calendar (the first date is always 0).
    pub drawdown: Frame,
    pub portfolio_returns: Series,
    pub portfolio_cumulative: Series,

    // II. Tables
    pub summary: Vec<SummaryRow>,
    pub portfolio: SummaryRow,
    pub correlation: CorrelationMatrix,
}

impl AnalysisReport {
    pub fn symbols(&self) -> &[String] {
        self.prices.symbols()
    }

    pub fn summary_for(&self, symbol: &str) -> Option<&SummaryRow> {
        self.summary.iter().find(|row| row.symbol == symbol)
    }
}
