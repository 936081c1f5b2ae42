use crate::settings::AnalysisSettings;
use chrono::NaiveDate;
use core_types::parse_symbol_list;

/// Command-line overrides for the analysed universe and window.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct AnalysisOverrides {
    /// Comma-separated ticker symbols (e.g., "AAPL, MSFT, GOOGL").
    #[cfg_attr(feature = "clap", arg(long))]
    pub symbols: Option<String>,

    /// The start date of the price window (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub from: Option<NaiveDate>,

    /// The end date of the price window (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub to: Option<NaiveDate>,
}

impl AnalysisSettings {
    /// Replaces every field the overrides set.
    pub fn apply(&mut self, overrides: &AnalysisOverrides) {
        if let Some(symbols) = &overrides.symbols {
            self.symbols = parse_symbol_list(symbols);
        }
        if let Some(from) = overrides.from {
            self.start_date = from;
        }
        if let Some(to) = overrides.to {
            self.end_date = to;
        }
    }
}
