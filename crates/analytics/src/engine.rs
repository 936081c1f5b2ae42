use crate::error::AnalyticsError;
use crate::metrics::{
    compute_correlation, compute_cumulative, compute_drawdown, compute_max_drawdown,
    compute_portfolio_return, compute_returns, compute_series_cumulative, compute_sharpe,
    compute_total_return, compute_volatility, equal_weights, sample_std, series_drawdown,
    sharpe_ratio,
};
use crate::report::{AnalysisReport, SummaryRow};
use core_types::PriceSeries;

/// How the portfolio row weights its instruments.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Allocation {
    /// `1 / n` per instrument.
    #[default]
    Equal,
    /// Explicit weights in instrument order; must sum to 1.
    Fixed(Vec<f64>),
}

/// A stateless calculator for deriving return and risk metrics from prices.
#[derive(Debug, Default)]
pub struct MetricsEngine {
    allocation: Allocation,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocation(allocation: Allocation) -> Self {
        Self { allocation }
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `prices` - Aligned daily closing prices, one column per instrument.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisReport` or an `AnalyticsError`. No
    /// partial report is produced on failure.
    pub fn analyze(&self, prices: &PriceSeries) -> Result<AnalysisReport, AnalyticsError> {
        let returns = compute_returns(prices)?;
        let cumulative = compute_cumulative(&returns);

        let weights = match &self.allocation {
            Allocation::Equal => equal_weights(prices.width()),
            Allocation::Fixed(w) => w.clone(),
        };
        let portfolio_returns = compute_portfolio_return(&returns, &weights)?;
        let portfolio_cumulative = compute_series_cumulative(&portfolio_returns);

        let start_date = prices.dates()[0];
        let end_date = prices.dates()[prices.len() - 1];
        let drawdown = compute_drawdown(&cumulative).prepend_row(start_date, 0.0);

        let total_return = compute_total_return(prices)?;
        let volatility = compute_volatility(&returns);
        let sharpe = compute_sharpe(&returns);
        let max_drawdown = compute_max_drawdown(&drawdown);

        let summary = prices
            .symbols()
            .iter()
            .enumerate()
            .map(|(i, symbol)| SummaryRow {
                symbol: symbol.clone(),
                total_return: total_return[i],
                volatility: volatility[i],
                sharpe_ratio: sharpe[i],
                max_drawdown: max_drawdown[i],
            })
            .collect();

        let portfolio = SummaryRow {
            symbol: portfolio_returns.name.clone(),
            total_return: portfolio_cumulative.last().map_or(0.0, |v| v - 1.0),
            volatility: sample_std(&portfolio_returns.values),
            sharpe_ratio: sharpe_ratio(&portfolio_returns.values),
            max_drawdown: series_drawdown(&portfolio_cumulative.values)
                .into_iter()
                .fold(0.0, f64::min),
        };

        let correlation = compute_correlation(&returns);

        tracing::debug!(
            instruments = prices.width(),
            dates = prices.len(),
            %start_date,
            %end_date,
            "Metrics computed."
        );

        Ok(AnalysisReport {
            start_date,
            end_date,
            weights,
            prices: prices.clone(),
            returns,
            cumulative,
            drawdown,
            portfolio_returns,
            portfolio_cumulative,
            summary,
            portfolio,
            correlation,
        })
    }
}
