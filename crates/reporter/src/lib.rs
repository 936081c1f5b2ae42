//! # Vantage Reporter
//!
//! Turns an `Analysis` into things people look at: the rounded display
//! tables, the three-sheet Excel workbook, and SVG line charts.
//!
//! ## Public API
//!
//! - `SummaryTable`, `DisplayTable`: Percent-scaled, two-decimal tables with "N/A" for undefined values.
//! - `build_workbook`, `write_workbook`, `workbook_bytes`: The spreadsheet report.
//! - `price_chart`, `cumulative_chart`, `portfolio_chart`, `write_charts`: The charts.

pub mod charts;
pub mod error;
pub mod table;
pub mod workbook;

pub use charts::{cumulative_chart, portfolio_chart, price_chart, write_charts};
pub use error::ReporterError;
pub use table::{DisplayRow, DisplayTable, SummaryTable, correlation_table, info_table};
pub use workbook::{WORKBOOK_FILE_NAME, build_workbook, workbook_bytes, write_workbook};
