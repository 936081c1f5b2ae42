//! Closed-form return and risk metrics over aligned price frames.
//!
//! Every function here is pure. Inputs are validated before any ratio is
//! taken, so a bad price surfaces as an [`AnalyticsError`] instead of a NaN.

use crate::error::AnalyticsError;
use crate::report::CorrelationMatrix;
use core_types::{CumulativeReturnSeries, Frame, PriceSeries, ReturnSeries, Series};

/// Annualisation factor for daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Allowed deviation of an allocation's sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A standard deviation at or below this is treated as zero variance.
pub const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

/// Checks date alignment, positivity, and length of a price frame.
pub fn validate_prices(prices: &PriceSeries) -> Result<(), AnalyticsError> {
    if prices.width() == 0 {
        return Err(AnalyticsError::InvalidPriceData(
            "no instruments in price series".to_string(),
        ));
    }
    if prices.is_empty() {
        return Err(AnalyticsError::InvalidPriceData(
            "price series is empty after alignment".to_string(),
        ));
    }

    if let Some(w) = prices.dates().windows(2).find(|w| w[0] >= w[1]) {
        return Err(AnalyticsError::InvalidPriceData(format!(
            "dates are not strictly increasing ({} followed by {})",
            w[0], w[1]
        )));
    }

    for (symbol, column) in prices.iter_columns() {
        if let Some((i, price)) = column
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(AnalyticsError::InvalidPriceData(format!(
                "{} has non-positive or non-finite price {} on {}",
                symbol,
                price,
                prices.dates()[i]
            )));
        }
    }

    if prices.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "need at least 2 trading dates, got {}",
            prices.len()
        )));
    }

    Ok(())
}

/// Daily simple returns, `price[t] / price[t-1] - 1`. The first date is dropped.
pub fn compute_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    validate_prices(prices)?;

    let columns = prices
        .columns()
        .iter()
        .map(|column| column.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
        .collect();

    Frame::new(prices.dates()[1..].to_vec(), prices.symbols().to_vec(), columns)
        .map_err(|e| AnalyticsError::InvalidPriceData(e.to_string()))
}

/// Running product of `(1 + return)`, starting from an implicit 1.
pub fn compute_cumulative(returns: &ReturnSeries) -> CumulativeReturnSeries {
    returns.scan_columns(1.0, |acc, r| {
        *acc *= 1.0 + r;
        *acc
    })
}

/// Same as [`compute_cumulative`] for a single series.
pub fn compute_series_cumulative(series: &Series) -> Series {
    Series {
        name: series.name.clone(),
        dates: series.dates.clone(),
        values: series
            .values
            .iter()
            .scan(1.0, |acc, r| {
                *acc *= 1.0 + r;
                Some(*acc)
            })
            .collect(),
    }
}

/// `1 / n` for every instrument.
pub fn equal_weights(instrument_count: usize) -> Vec<f64> {
    if instrument_count == 0 {
        return Vec::new();
    }
    vec![1.0 / instrument_count as f64; instrument_count]
}

/// Per-date dot product of the return vector with a fixed allocation.
pub fn compute_portfolio_return(
    returns: &ReturnSeries,
    weights: &[f64],
) -> Result<Series, AnalyticsError> {
    if weights.len() != returns.width() {
        return Err(AnalyticsError::WeightMismatch(format!(
            "{} weights for {} instruments",
            weights.len(),
            returns.width()
        )));
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(AnalyticsError::WeightMismatch(
            "weights must be finite".to_string(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AnalyticsError::WeightMismatch(format!(
            "weights sum to {total}, expected 1"
        )));
    }

    let values = (0..returns.len())
        .map(|t| returns.row(t).zip(weights).map(|(r, w)| r * w).sum())
        .collect();

    Ok(Series {
        name: "Portfolio".to_string(),
        dates: returns.dates().to_vec(),
        values,
    })
}

/// `last / first - 1` for every instrument.
pub fn compute_total_return(prices: &PriceSeries) -> Result<Vec<f64>, AnalyticsError> {
    validate_prices(prices)?;
    Ok(prices
        .columns()
        .iter()
        .map(|c| c[c.len() - 1] / c[0] - 1.0)
        .collect())
}

/// Sample standard deviation of each instrument's returns.
pub fn compute_volatility(returns: &ReturnSeries) -> Vec<Option<f64>> {
    returns.columns().iter().map(|c| sample_std(c)).collect()
}

/// Annualised Sharpe ratio of each instrument; `None` for zero-variance series.
pub fn compute_sharpe(returns: &ReturnSeries) -> Vec<Option<f64>> {
    returns.columns().iter().map(|c| sharpe_ratio(c)).collect()
}

/// `cumulative[t] / running_max - 1`, with the running max seeded at the
/// implicit starting value of 1.
///
/// The result has one row per cumulative row. Use [`Frame::prepend_row`] with
/// the first price date to express it over the full price calendar.
pub fn compute_drawdown(cumulative: &CumulativeReturnSeries) -> Frame {
    cumulative.scan_columns(1.0_f64, |peak, value| {
        *peak = peak.max(value);
        value / *peak - 1.0
    })
}

/// Most negative value of each drawdown column (0 for a column that never drew down).
pub fn compute_max_drawdown(drawdown: &Frame) -> Vec<f64> {
    drawdown
        .columns()
        .iter()
        .map(|c| c.iter().copied().fold(0.0, f64::min))
        .collect()
}

/// Pairwise Pearson correlation of daily returns.
pub fn compute_correlation(returns: &ReturnSeries) -> CorrelationMatrix {
    let n = returns.width();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(returns.column(i), returns.column(j));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix::new(returns.symbols().to_vec(), values)
}

// --- Slice statistics ---

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Bessel-corrected standard deviation; `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    let std = sample_std(returns)?;
    if !std.is_finite() || std <= ZERO_VARIANCE_EPSILON {
        return None;
    }
    let ratio = mean(returns)? / std * TRADING_DAYS_PER_YEAR.sqrt();
    ratio.is_finite().then_some(ratio)
}

/// Drawdown of a single cumulative series, running max seeded at 1.
pub fn series_drawdown(cumulative: &[f64]) -> Vec<f64> {
    cumulative
        .iter()
        .scan(1.0_f64, |peak, &value| {
            *peak = peak.max(value);
            Some(value / *peak - 1.0)
        })
        .collect()
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let (std_a, std_b) = (sample_std(a)?, sample_std(b)?);
    if std_a <= ZERO_VARIANCE_EPSILON || std_b <= ZERO_VARIANCE_EPSILON {
        return None;
    }
    let (mean_a, mean_b) = (mean(a)?, mean(b)?);

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
