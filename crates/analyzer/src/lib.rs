use crate::error::{AnalyzerError, MetadataFetchError};
use analytics::{AnalysisReport, AnalyticsError, MetricsEngine};
use api_client::{MetadataSource, PriceSource};
use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{Frame, InstrumentMetadata, PriceHistory, parse_symbol_list};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;

pub mod error;

/// One user request: which instruments, over which date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisRequest {
    /// Parses a free-text symbol list such as `"aapl, msft,,GOOGL"`.
    pub fn parse(symbols_text: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, AnalyzerError> {
        let symbols = parse_symbol_list(symbols_text);
        if symbols.is_empty() {
            return Err(AnalyzerError::InvalidRequest(
                "enter at least one stock symbol".to_string(),
            ));
        }
        if start >= end {
            return Err(AnalyzerError::InvalidRequest(format!(
                "start date {start} must be before end date {end}"
            )));
        }
        Ok(Self { symbols, start, end })
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self, AnalyzerError> {
        Self::parse(&settings.symbols.join(","), settings.start_date, settings.end_date)
    }
}

/// The complete result of one run: the engine's report plus one metadata
/// record per requested symbol (in request order).
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub report: AnalysisReport,
    pub metadata: Vec<InstrumentMetadata>,
    /// Non-fatal problems, e.g. metadata that fell back to defaults.
    pub warnings: Vec<String>,
}

/// Runs fetch, alignment, and the metrics engine for a request.
pub struct Analyzer {
    prices: Arc<dyn PriceSource>,
    metadata: Arc<dyn MetadataSource>,
    engine: MetricsEngine,
    show_progress: bool,
}

impl Analyzer {
    pub fn new(prices: Arc<dyn PriceSource>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            prices,
            metadata,
            engine: MetricsEngine::new(),
            show_progress: false,
        }
    }

    /// Draws a terminal progress bar while fetching. Meant for batch mode.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetches, aligns, and analyzes the requested instruments.
    ///
    /// Any price or engine failure aborts the whole run. Metadata failures
    /// only degrade the affected record to defaults.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Analysis, AnalyzerError> {
        tracing::info!(
            symbols = ?request.symbols,
            start = %request.start,
            end = %request.end,
            "Starting analysis run."
        );
        let progress = self.progress_bar(request.symbols.len() as u64 * 2)?;

        // 1. Fetch prices, one symbol at a time.
        let mut histories = Vec::with_capacity(request.symbols.len());
        for symbol in &request.symbols {
            progress.set_message(format!("Fetching prices for {symbol}..."));
            let history = self
                .prices
                .fetch_history(symbol, request.start, request.end)
                .await
                .map_err(|source| AnalyzerError::PriceFetch {
                    symbol: symbol.clone(),
                    source,
                })?;

            if history.is_empty() {
                return Err(AnalyticsError::InvalidPriceData(format!(
                    "no prices returned for {symbol} between {} and {}",
                    request.start, request.end
                ))
                .into());
            }
            histories.push(PriceHistory::new(symbol.clone(), history.points));
            progress.inc(1);
        }

        // 2. Align and compute.
        let prices = Frame::align(&histories);
        let report = self.engine.analyze(&prices)?;

        // 3. Metadata, degrading to defaults on failure.
        let mut metadata = Vec::with_capacity(request.symbols.len());
        let mut warnings = Vec::new();
        for symbol in &request.symbols {
            progress.set_message(format!("Fetching info for {symbol}..."));
            match self.fetch_metadata(symbol).await {
                Ok(record) => metadata.push(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Using default metadata.");
                    warnings.push(e.to_string());
                    metadata.push(InstrumentMetadata::placeholder(symbol));
                }
            }
            progress.inc(1);
        }
        progress.finish_with_message("Analysis complete!");

        tracing::info!(
            dates = report.prices.len(),
            warnings = warnings.len(),
            "Analysis run finished."
        );
        Ok(Analysis {
            report,
            metadata,
            warnings,
        })
    }

    async fn fetch_metadata(&self, symbol: &str) -> Result<InstrumentMetadata, MetadataFetchError> {
        let raw = self
            .metadata
            .fetch_metadata(symbol)
            .await
            .map_err(|source| MetadataFetchError {
                symbol: symbol.to_string(),
                source,
            })?;
        Ok(InstrumentMetadata::resolve(symbol, &raw))
    }

    fn progress_bar(&self, len: u64) -> Result<ProgressBar, AnalyzerError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Ok(progress_bar)
    }
}
