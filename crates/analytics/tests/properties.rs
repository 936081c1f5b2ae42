//! Property-based tests for the metrics engine.
//!
//! These tests use proptest to check the engine's guarantees over random
//! positive price paths.

use analytics::{
    compute_correlation, compute_cumulative, compute_drawdown, compute_max_drawdown,
    compute_portfolio_return, compute_returns, compute_total_return, equal_weights,
};
use chrono::{Days, NaiveDate};
use core_types::{Frame, PriceSeries};
use proptest::prelude::*;

fn frame(columns: Vec<Vec<f64>>) -> PriceSeries {
    let n = columns[0].len();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let dates = (0..n as u64).map(|i| start + Days::new(i)).collect();
    let symbols = (0..columns.len()).map(|i| format!("S{i}")).collect();
    Frame::new(dates, symbols, columns).unwrap()
}

/// A random positive price path of the given length.
fn price_path(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0f64, len)
}

/// Several price paths sharing one calendar.
fn price_table() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..40, 1usize..5).prop_flat_map(|(len, width)| {
        prop::collection::vec(price_path(len), width)
    })
}

proptest! {
    /// Returns always have exactly one row fewer than prices.
    #[test]
    fn returns_drop_exactly_one_row(columns in price_table()) {
        let prices = frame(columns);
        let returns = compute_returns(&prices).unwrap();
        prop_assert_eq!(returns.len(), prices.len() - 1);
        prop_assert_eq!(returns.width(), prices.width());
    }

    /// The last cumulative value round-trips with the total return.
    #[test]
    fn cumulative_ends_at_total_return_plus_one(columns in price_table()) {
        let prices = frame(columns);
        let cumulative = compute_cumulative(&compute_returns(&prices).unwrap());
        let total = compute_total_return(&prices).unwrap();

        for (i, t) in total.iter().enumerate() {
            let last = *cumulative.column(i).last().unwrap();
            prop_assert!((last - (t + 1.0)).abs() <= 1e-9 * last.max(1.0));
        }
    }

    /// Max drawdown is never positive.
    #[test]
    fn max_drawdown_is_non_positive(columns in price_table()) {
        let prices = frame(columns);
        let drawdown = compute_drawdown(&compute_cumulative(&compute_returns(&prices).unwrap()));
        for dd in compute_max_drawdown(&drawdown) {
            prop_assert!(dd <= 0.0);
            prop_assert!(dd > -1.0);
        }
    }

    /// A monotonically non-decreasing path never draws down.
    #[test]
    fn rising_prices_have_zero_drawdown(mut path in price_path(30)) {
        path.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let prices = frame(vec![path]);
        let drawdown = compute_drawdown(&compute_cumulative(&compute_returns(&prices).unwrap()));
        let max_dd = compute_max_drawdown(&drawdown)[0];
        prop_assert!(max_dd.abs() <= 1e-12);
    }

    /// The correlation matrix is symmetric with a unit diagonal and bounded entries.
    #[test]
    fn correlation_matrix_is_well_formed(columns in price_table()) {
        let prices = frame(columns);
        let corr = compute_correlation(&compute_returns(&prices).unwrap());
        let n = corr.len();

        for i in 0..n {
            prop_assert_eq!(corr.at(i, i), Some(1.0));
            for j in 0..n {
                prop_assert_eq!(corr.at(i, j), corr.at(j, i));
                if let Some(r) = corr.at(i, j) {
                    prop_assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
    }

    /// Two instruments with identical returns give back that same return series.
    #[test]
    fn identical_instruments_portfolio_equals_shared_returns(path in price_path(25), scale in 0.5f64..4.0) {
        let scaled: Vec<f64> = path.iter().map(|p| p * scale).collect();
        let prices = frame(vec![path, scaled]);
        let returns = compute_returns(&prices).unwrap();
        let portfolio = compute_portfolio_return(&returns, &equal_weights(2)).unwrap();

        for (p, r) in portfolio.values.iter().zip(returns.column(0)) {
            prop_assert!((p - r).abs() <= 1e-9);
        }
    }
}
