use analytics::AnalyticsError;
use api_client::error::ApiError;
use core_types::CoreError;
use indicatif::style::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to fetch prices for {symbol}: {source}")]
    PriceFetch {
        symbol: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<TemplateError> for AnalyzerError {
    fn from(error: TemplateError) -> Self {
        AnalyzerError::ProgressBarTemplate(error.to_string())
    }
}

/// A metadata lookup that failed. Never aborts a run: the record falls back
/// to default values and the failure is reported as a warning.
#[derive(Error, Debug)]
#[error("Metadata unavailable for {symbol}: {source}")]
pub struct MetadataFetchError {
    pub symbol: String,
    #[source]
    pub source: ApiError,
}
