use crate::{AppState, error::AppError};
use analyzer::{Analysis, AnalysisRequest};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use reporter::{DisplayTable, SummaryTable, correlation_table, info_table};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const REPORT_DISPOSITION: &str = "attachment; filename=\"Stock_Portfolio_Report.xlsx\"";

/// The fields of the analysis form. Used as a JSON body and as a query string.
#[derive(Debug, Deserialize)]
pub struct AnalysisForm {
    pub symbols: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub summary: DisplayTable,
    pub info: DisplayTable,
    pub correlation: DisplayTable,
    pub charts: Charts,
    pub warnings: Vec<String>,
}

/// Inline SVG documents.
#[derive(Debug, Serialize)]
pub struct Charts {
    pub prices: String,
    pub cumulative: String,
    pub portfolio: String,
}

impl From<Analysis> for AnalysisResponse {
    fn from(analysis: Analysis) -> Self {
        let report = &analysis.report;
        Self {
            symbols: report.symbols().to_vec(),
            start_date: report.start_date,
            end_date: report.end_date,
            summary: SummaryTable::from_report(report).to_display(),
            info: info_table(&analysis.metadata),
            correlation: correlation_table(&report.correlation),
            charts: Charts {
                prices: reporter::price_chart(report),
                cumulative: reporter::cumulative_chart(report),
                portfolio: reporter::portfolio_chart(report),
            },
            warnings: analysis.warnings,
        }
    }
}

/// # GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

/// # POST /api/analyze
/// Runs a full analysis and returns the tables and charts.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    form: Result<Json<AnalysisForm>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let analysis = run_analysis(&state, &form).await?;
    Ok(Json(AnalysisResponse::from(analysis)))
}

/// # GET /api/report?symbols=...&start_date=...&end_date=...
/// Runs a full analysis and streams the Excel workbook as a download.
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    form: Result<Query<AnalysisForm>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let analysis = run_analysis(&state, &form).await?;
    let bytes = reporter::workbook_bytes(&analysis)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, REPORT_DISPOSITION),
        ],
        bytes,
    )
        .into_response())
}

async fn run_analysis(state: &AppState, form: &AnalysisForm) -> Result<Analysis, AppError> {
    let request = AnalysisRequest::parse(&form.symbols, form.start_date, form.end_date)?;
    Ok(state.analyzer.run(&request).await?)
}
