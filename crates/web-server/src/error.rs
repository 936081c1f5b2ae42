use analyzer::error::AnalyzerError;
use api_client::error::ApiError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reporter::ReporterError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error("Failed to build the report: {0}")]
    Report(#[from] ReporterError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Analyzer(AnalyzerError::InvalidRequest(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Analyzer(AnalyzerError::PriceFetch {
                source: ApiError::UnknownSymbol(_),
                ..
            })
            | AppError::Analyzer(AnalyzerError::Analytics(_))
            | AppError::Analyzer(AnalyzerError::Core(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Analyzer(AnalyzerError::PriceFetch { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Analyzer(AnalyzerError::ProgressBarTemplate(_)) | AppError::Report(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every failure becomes a single `{ "error": "<message>" }` body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
        } else {
            tracing::warn!(error = %self, "Request rejected.");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
