use crate::error::CoreError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The raw closing-price history of one instrument, as delivered by a price source.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// A date-indexed table with one column per instrument.
///
/// All columns share the same calendar. The same shape is used for prices,
/// daily returns, cumulative returns, and drawdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// Aligned closing prices.
pub type PriceSeries = Frame;
/// Daily simple returns; one row shorter than the prices they came from.
pub type ReturnSeries = Frame;
/// Running product of `(1 + return)`.
pub type CumulativeReturnSeries = Frame;

impl Frame {
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        if symbols.len() != columns.len() {
            return Err(CoreError::InvalidInput(
                "frame".to_string(),
                format!("{} symbols but {} columns", symbols.len(), columns.len()),
            ));
        }
        for (symbol, column) in symbols.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(CoreError::ShapeMismatch {
                    symbol: symbol.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    /// Aligns independent histories onto their common calendar.
    ///
    /// Only dates observed for every instrument survive, so leading dates
    /// before an instrument started trading are dropped. Duplicate dates
    /// within a history keep the last reported value.
    pub fn align(histories: &[PriceHistory]) -> Self {
        let by_date: Vec<BTreeMap<NaiveDate, f64>> = histories
            .iter()
            .map(|h| h.points.iter().copied().collect())
            .collect();

        let mut common: BTreeSet<NaiveDate> = match by_date.first() {
            Some(first) => first.keys().copied().collect(),
            None => BTreeSet::new(),
        };
        for series in by_date.iter().skip(1) {
            common.retain(|date| series.contains_key(date));
        }

        let dates: Vec<NaiveDate> = common.into_iter().collect();
        let columns = by_date
            .iter()
            .map(|series| dates.iter().map(|d| series[d]).collect())
            .collect();

        Self {
            dates,
            symbols: histories.iter().map(|h| h.symbol.clone()).collect(),
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn column_by_symbol(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of instruments.
    pub fn width(&self) -> usize {
        self.symbols.len()
    }

    /// The values of every instrument on the `index`-th date.
    pub fn row(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |c| c[index])
    }

    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Walks down every column with a running state seeded from `init`,
    /// emitting one output per input. The shape is preserved.
    pub fn scan_columns<S, F>(&self, init: S, mut f: F) -> Frame
    where
        S: Copy,
        F: FnMut(&mut S, f64) -> f64,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .scan(init, |state, &value| Some(f(state, value)))
                    .collect()
            })
            .collect();

        Frame {
            dates: self.dates.clone(),
            symbols: self.symbols.clone(),
            columns,
        }
    }

    /// Returns a copy with an extra first row where every instrument holds `value`.
    pub fn prepend_row(&self, date: NaiveDate, value: f64) -> Frame {
        let mut dates = Vec::with_capacity(self.dates.len() + 1);
        dates.push(date);
        dates.extend_from_slice(&self.dates);

        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut out = Vec::with_capacity(column.len() + 1);
                out.push(value);
                out.extend_from_slice(column);
                out
            })
            .collect();

        Frame {
            dates,
            symbols: self.symbols.clone(),
            columns,
        }
    }
}

/// A single named date-indexed series (e.g. the portfolio's returns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = Frame::new(
            vec![d(2), d(3)],
            vec!["AAPL".into()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::ShapeMismatch {
                symbol: "AAPL".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_symbol_column_count_mismatch() {
        let err = Frame::new(vec![d(2)], vec!["A".into(), "B".into()], vec![vec![1.0]]);
        assert!(matches!(err, Err(CoreError::InvalidInput(..))));
    }

    #[test]
    fn test_align_keeps_only_common_dates() {
        let aapl = PriceHistory::new("AAPL", vec![(d(2), 10.0), (d(3), 11.0), (d(4), 12.0), (d(5), 13.0)]);
        // Starts trading a day later and misses the 4th.
        let newco = PriceHistory::new("NEWCO", vec![(d(3), 5.0), (d(5), 6.0)]);

        let frame = Frame::align(&[aapl, newco]);

        assert_eq!(frame.dates(), &[d(3), d(5)]);
        assert_eq!(frame.symbols(), &["AAPL".to_string(), "NEWCO".to_string()]);
        assert_eq!(frame.column(0), &[11.0, 13.0]);
        assert_eq!(frame.column_by_symbol("NEWCO"), Some(&[5.0, 6.0][..]));
    }

    #[test]
    fn test_align_sorts_out_of_order_points() {
        let h = PriceHistory::new("X", vec![(d(4), 3.0), (d(2), 1.0), (d(3), 2.0)]);
        let frame = Frame::align(&[h]);
        assert_eq!(frame.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(frame.column(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_align_without_overlap_is_empty() {
        let a = PriceHistory::new("A", vec![(d(2), 1.0)]);
        let b = PriceHistory::new("B", vec![(d(3), 1.0)]);
        let frame = Frame::align(&[a, b]);
        assert!(frame.is_empty());
        assert_eq!(frame.width(), 2);
    }

    #[test]
    fn test_row_reads_across_instruments() {
        let frame = Frame::new(
            vec![d(2), d(3)],
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(frame.row(1).collect::<Vec<_>>(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_scan_columns_is_a_running_fold() {
        let frame = Frame::new(vec![d(2), d(3), d(4)], vec!["A".into()], vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let summed = frame.scan_columns(0.0, |acc, v| {
            *acc += v;
            *acc
        });
        assert_eq!(summed.column(0), &[1.0, 3.0, 6.0]);
        assert_eq!(summed.dates(), frame.dates());
    }

    #[test]
    fn test_prepend_row_adds_base_date() {
        let frame = Frame::new(vec![d(3)], vec!["A".into(), "B".into()], vec![vec![0.5], vec![0.7]]).unwrap();
        let with_base = frame.prepend_row(d(2), 0.0);
        assert_eq!(with_base.dates(), &[d(2), d(3)]);
        assert_eq!(with_base.column(1), &[0.0, 0.7]);
    }
}
