use analytics::{AnalysisReport, CorrelationMatrix, SummaryRow};
use core_types::{InstrumentMetadata, MetadataField};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Rendered in place of a statistic that is undefined.
pub const NOT_AVAILABLE: &str = "N/A";

pub const SUMMARY_HEADERS: [&str; 5] = [
    "Symbol",
    "Total Return (%)",
    "Volatility (%)",
    "Sharpe Ratio",
    "Max Drawdown (%)",
];

/// One summary row as shown to people: percentages, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub symbol: String,
    pub total_return_pct: Option<Decimal>,
    pub volatility_pct: Option<Decimal>,
    pub sharpe_ratio: Option<Decimal>,
    pub max_drawdown_pct: Option<Decimal>,
}

impl DisplayRow {
    pub fn from_row(row: &SummaryRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            total_return_pct: round2(row.total_return * 100.0),
            volatility_pct: row.volatility.and_then(|v| round2(v * 100.0)),
            sharpe_ratio: row.sharpe_ratio.and_then(round2),
            max_drawdown_pct: round2(row.max_drawdown * 100.0),
        }
    }

    /// The four statistics in column order.
    pub fn values(&self) -> [Option<Decimal>; 4] {
        [
            self.total_return_pct,
            self.volatility_pct,
            self.sharpe_ratio,
            self.max_drawdown_pct,
        ]
    }

    pub fn cells(&self) -> Vec<String> {
        std::iter::once(self.symbol.clone())
            .chain(self.values().into_iter().map(format_cell))
            .collect()
    }
}

/// The performance summary: one row per instrument, then the portfolio row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub rows: Vec<DisplayRow>,
}

impl SummaryTable {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let rows = report
            .summary
            .iter()
            .chain(std::iter::once(&report.portfolio))
            .map(DisplayRow::from_row)
            .collect();
        Self { rows }
    }

    pub fn to_display(&self) -> DisplayTable {
        DisplayTable {
            headers: SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: self.rows.iter().map(DisplayRow::cells).collect(),
        }
    }
}

/// A table of pre-formatted text cells, ready for a terminal or a browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn correlation_table(matrix: &CorrelationMatrix) -> DisplayTable {
    let headers = std::iter::once(String::new())
        .chain(matrix.symbols().iter().cloned())
        .collect();
    let rows = matrix
        .symbols()
        .iter()
        .zip(matrix.rows())
        .map(|(symbol, row)| {
            std::iter::once(symbol.clone())
                .chain(row.iter().map(|v| format_cell(v.and_then(round2))))
                .collect()
        })
        .collect();
    DisplayTable { headers, rows }
}

pub fn info_table(metadata: &[InstrumentMetadata]) -> DisplayTable {
    let headers = std::iter::once("Symbol".to_string())
        .chain(MetadataField::ALL.iter().map(|f| f.label().to_string()))
        .collect();
    let rows = metadata
        .iter()
        .map(|m| {
            vec![
                m.symbol.clone(),
                m.company.clone(),
                m.sector.clone(),
                m.industry.clone(),
                format!("{:.2}", m.market_cap_billions()),
            ]
        })
        .collect();
    DisplayTable { headers, rows }
}

/// Rounds half away from zero to two decimals. `None` for non-finite input.
pub fn round2(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

pub fn format_cell(value: Option<Decimal>) -> String {
    match value {
        Some(d) => format!("{d:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::MetricsEngine;
    use chrono::NaiveDate;
    use core_types::{Frame, RawMetadata};

    fn report() -> AnalysisReport {
        let dates = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let prices = Frame::new(
            dates,
            vec!["A".into(), "B".into()],
            vec![vec![100.0, 50.0, 100.0], vec![10.0, 10.0, 10.0]],
        )
        .unwrap();
        MetricsEngine::new().analyze(&prices).unwrap()
    }

    #[test]
    fn test_round2_is_half_away_from_zero() {
        assert_eq!(round2(0.125), Decimal::from_str_exact("0.13").ok());
        assert_eq!(round2(-0.125), Decimal::from_str_exact("-0.13").ok());
        assert_eq!(round2(f64::NAN), None);
    }

    #[test]
    fn test_summary_table_formats_percentages() {
        let table = SummaryTable::from_report(&report()).to_display();

        assert_eq!(table.headers[1], "Total Return (%)");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["A", "0.00", "106.07", "3.74", "-50.00"]);
        // A flat price has zero volatility and therefore no Sharpe ratio.
        assert_eq!(table.rows[1], vec!["B", "0.00", "0.00", "N/A", "0.00"]);
        assert_eq!(table.rows[2][0], "Portfolio");
    }

    #[test]
    fn test_correlation_table_marks_undefined_entries() {
        let table = correlation_table(&report().correlation);
        assert_eq!(table.headers, vec!["", "A", "B"]);
        assert_eq!(table.rows[0], vec!["A", "1.00", "N/A"]);
        assert_eq!(table.rows[1], vec!["B", "N/A", "1.00"]);
    }

    #[test]
    fn test_info_table_uses_defaults_and_billions() {
        let mut apple = InstrumentMetadata::placeholder("AAPL");
        apple.market_cap = 2_994_371_297_280.0;
        let table = info_table(&[apple, InstrumentMetadata::resolve("X", &RawMetadata::new())]);

        assert_eq!(
            table.headers,
            vec!["Symbol", "Company", "Sector", "Industry", "Market Cap (B)"]
        );
        assert_eq!(table.rows[0][4], "2994.37");
        assert_eq!(table.rows[1], vec!["X", "N/A", "N/A", "N/A", "0.00"]);
    }
}
