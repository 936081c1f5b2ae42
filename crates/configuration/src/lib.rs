use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use overrides::AnalysisOverrides;
pub use settings::{
    AnalysisSettings, Config, LoggingConfig, PriceSourceConfig, ReportConfig, ServerConfig,
};

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file (if it exists), layers `VANTAGE__*` environment
/// variables on top (e.g. `VANTAGE__ANALYSIS__SYMBOLS=AAPL,MSFT`), validates
/// the result, and returns the strongly-typed `Config`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("VANTAGE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("analysis.symbols"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), symbols = ?config.analysis.symbols, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_reads_file_and_defaults_the_rest() {
        let file = write_config(
            r#"
            [analysis]
            symbols = ["NVDA", "AMD"]
            start_date = "2023-01-01"
            end_date = "2023-12-31"

            [price_source]
            timeout = "3s"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.analysis.symbols, vec!["NVDA", "AMD"]);
        assert_eq!(config.analysis.start_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(config.price_source.timeout, Duration::from_secs(3));
        assert_eq!(config.price_source.max_retries, 1);
        assert_eq!(config.server.bind_address.port(), 3000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.analysis.symbols.len(), 5);
        assert_eq!(config.report.workbook_path, Path::new("Stock_Portfolio_Report.xlsx"));
    }

    #[test]
    fn test_load_config_returns_crate_level_config() {
        let file = write_config("[server]\nbind_address = \"0.0.0.0:9000\"\n");
        let config: crate::Config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_address.port(), 9000);
        assert_eq!(config.price_source.max_retries, 1);
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let file = write_config(
            r#"
            [analysis]
            symbols = ["AAPL"]
            start_date = "2024-01-01"
            end_date = "2023-01-01"
            "#,
        );
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_symbol_list_is_rejected() {
        let mut config = Config::default();
        config.analysis.symbols = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }
}
