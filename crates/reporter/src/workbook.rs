use crate::error::ReporterError;
use crate::table::{NOT_AVAILABLE, SUMMARY_HEADERS, SummaryTable};
use analytics::CorrelationMatrix;
use analyzer::Analysis;
use core_types::{InstrumentMetadata, MetadataField};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

pub const SUMMARY_SHEET: &str = "Performance Summary";
pub const CORRELATION_SHEET: &str = "Correlation Matrix";
pub const INFO_SHEET: &str = "Stock Info";

/// Default file name of the downloadable report.
pub const WORKBOOK_FILE_NAME: &str = "Stock_Portfolio_Report.xlsx";

/// Builds the three-sheet report workbook in memory.
pub fn build_workbook(analysis: &Analysis) -> Result<Workbook, ReporterError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let summary = SummaryTable::from_report(&analysis.report);
    write_summary_sheet(workbook.add_worksheet(), &summary, &header)?;
    write_correlation_sheet(workbook.add_worksheet(), &analysis.report.correlation, &header)?;
    write_info_sheet(workbook.add_worksheet(), &analysis.metadata, &header)?;

    Ok(workbook)
}

pub fn write_workbook(analysis: &Analysis, path: &Path) -> Result<(), ReporterError> {
    let mut workbook = build_workbook(analysis)?;
    workbook.save(path)?;
    tracing::info!(path = %path.display(), "Excel report written.");
    Ok(())
}

/// The workbook as `.xlsx` bytes, for streaming as a download.
pub fn workbook_bytes(analysis: &Analysis) -> Result<Vec<u8>, ReporterError> {
    let mut workbook = build_workbook(analysis)?;
    Ok(workbook.save_to_buffer()?)
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    summary: &SummaryTable,
    header: &Format,
) -> Result<(), ReporterError> {
    sheet.set_name(SUMMARY_SHEET)?;
    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }
    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(2, 16)?;
    sheet.set_column_width(3, 14)?;
    sheet.set_column_width(4, 20)?;

    for (i, row) in summary.rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string_with_format(r, 0, &row.symbol, header)?;
        for (j, value) in row.values().into_iter().enumerate() {
            let c = j as u16 + 1;
            match value.and_then(|d| d.to_f64()) {
                Some(v) => sheet.write_number(r, c, v)?,
                None => sheet.write_string(r, c, NOT_AVAILABLE)?,
            };
        }
    }
    Ok(())
}

fn write_correlation_sheet(
    sheet: &mut Worksheet,
    matrix: &CorrelationMatrix,
    header: &Format,
) -> Result<(), ReporterError> {
    sheet.set_name(CORRELATION_SHEET)?;
    for (j, symbol) in matrix.symbols().iter().enumerate() {
        sheet.write_string_with_format(0, j as u16 + 1, symbol, header)?;
    }

    for (i, (symbol, row)) in matrix.symbols().iter().zip(matrix.rows()).enumerate() {
        let r = i as u32 + 1;
        sheet.write_string_with_format(r, 0, symbol, header)?;
        for (j, value) in row.iter().enumerate() {
            let c = j as u16 + 1;
            match value {
                Some(v) => sheet.write_number(r, c, *v)?,
                None => sheet.write_string(r, c, NOT_AVAILABLE)?,
            };
        }
    }
    Ok(())
}

fn write_info_sheet(
    sheet: &mut Worksheet,
    metadata: &[InstrumentMetadata],
    header: &Format,
) -> Result<(), ReporterError> {
    sheet.set_name(INFO_SHEET)?;
    sheet.write_string_with_format(0, 0, "Symbol", header)?;
    for (j, field) in MetadataField::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, j as u16 + 1, field.label(), header)?;
    }
    sheet.set_column_width(1, 28)?;
    sheet.set_column_width(2, 22)?;
    sheet.set_column_width(3, 30)?;
    sheet.set_column_width(4, 16)?;

    for (i, m) in metadata.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &m.symbol)?;
        sheet.write_string(r, 1, &m.company)?;
        sheet.write_string(r, 2, &m.sector)?;
        sheet.write_string(r, 3, &m.industry)?;
        sheet.write_number(r, 4, m.market_cap_billions())?;
    }
    Ok(())
}
