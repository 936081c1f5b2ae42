use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub price_source: PriceSourceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The instruments and date range analysed by the batch report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Ticker symbols (e.g., "AAPL").
    pub symbols: Vec<String>,
    /// First calendar date of the price window (inclusive).
    pub start_date: NaiveDate,
    /// Last calendar date of the price window (exclusive).
    pub end_date: NaiveDate,
}

/// Connection settings for the historical price and metadata source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceSourceConfig {
    pub base_url: String,
    /// Visited once to obtain the session cookie the metadata endpoint requires.
    pub cookie_url: String,
    pub user_agent: String,
    /// Upper bound on a single request, including reading the body.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Extra attempts after a retryable failure (network error, timeout, 429, 5xx).
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
}

/// Where the batch report writes its artifacts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub workbook_path: PathBuf,
    pub chart_dir: PathBuf,
}

/// Settings for the interactive web server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
}

/// Log verbosity and optional rolling log files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as "info" or "vantage=debug,info".
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml and still have it
// work with sensible defaults.

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "MSFT", "GOOGL", "TSLA", "AMZN"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) vantage/0.1".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from("Stock_Portfolio_Report.xlsx"),
            chart_dir: PathBuf::from("charts"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "vantage.log".to_string(),
        }
    }
}

impl Config {
    /// Rejects settings that would make every run fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "analysis.symbols must name at least one instrument".to_string(),
            ));
        }
        if self.analysis.start_date >= self.analysis.end_date {
            return Err(ConfigError::ValidationError(format!(
                "analysis.start_date ({}) must be before analysis.end_date ({})",
                self.analysis.start_date, self.analysis.end_date
            )));
        }
        if self.price_source.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "price_source.timeout must be greater than zero".to_string(),
            ));
        }
        if self.price_source.max_retries > 5 {
            return Err(ConfigError::ValidationError(format!(
                "price_source.max_retries is {}, at most 5 is allowed",
                self.price_source.max_retries
            )));
        }
        Ok(())
    }
}
