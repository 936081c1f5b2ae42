use crate::error::ApiError;
use crate::responses::{ChartResponse, QuoteSummaryResponse, YahooErrorBody};
use crate::retry::RetryPolicy;
use crate::{MetadataSource, PriceSource};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use configuration::PriceSourceConfig;
use core_types::{FieldValue, MetadataField, PriceHistory, RawMetadata};
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A concrete implementation of `PriceSource` and `MetadataSource` for Yahoo Finance.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    cookie_url: String,
    retry: RetryPolicy,
    // The metadata endpoint rejects requests without a session crumb.
    // Cleared when the endpoint answers 401 so the next call fetches a new one.
    crumb: Arc<RwLock<Option<String>>>,
}

impl YahooClient {
    pub fn new(config: &PriceSourceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            retry: RetryPolicy::from(config),
            crumb: Arc::new(RwLock::new(None)),
        })
    }

    /// Builds `{base_url}/{path..}/{symbol}` with the symbol as one encoded path segment.
    fn endpoint(&self, path: &[&str], symbol: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidData(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidData(format!("base URL {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(path)
            .push(symbol);
        Ok(url)
    }

    /// One GET attempt. Maps 404 to `UnknownSymbol` and any other non-2xx to `Status`.
    async fn get_checked(
        &self,
        url: &str,
        query: &[(&str, String)],
        symbol: &str,
    ) -> Result<String, ApiError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(ApiError::UnknownSymbol(symbol.to_string()))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            })
        }
    }

    /// Returns the cached session crumb, fetching one first if there is none.
    async fn crumb(&self) -> Result<String, ApiError> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut slot = self.crumb.write().await;
        if let Some(crumb) = slot.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.fetch_crumb().await?;
        *slot = Some(crumb.clone());
        Ok(crumb)
    }

    /// Drops the cached crumb unless another task already replaced it.
    async fn invalidate_crumb(&self, stale: &str) {
        let mut slot = self.crumb.write().await;
        if slot.as_deref() == Some(stale) {
            *slot = None;
        }
    }

    async fn fetch_crumb(&self) -> Result<String, ApiError> {
        // Only primes the cookie jar; the response itself is irrelevant.
        let _ = tokio::time::timeout(self.retry.timeout, self.client.get(&self.cookie_url).send())
            .await;

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let text = self
            .retry
            .run("fetch_crumb", || self.get_checked(&url, &[], "crumb"))
            .await?;
        let crumb = text.trim();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(ApiError::InvalidData("empty session crumb".to_string()));
        }
        tracing::debug!("Obtained metadata session crumb.");
        Ok(crumb.to_string())
    }

    async fn quote_summary(&self, url: &Url, symbol: &str, crumb: &str) -> Result<String, ApiError> {
        let query = [
            ("modules", "price,assetProfile".to_string()),
            ("crumb", crumb.to_string()),
        ];
        self.retry
            .run("fetch_metadata", || self.get_checked(url.as_str(), &query, symbol))
            .await
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, ApiError> {
        let url = self.endpoint(&["v8", "finance", "chart"], symbol)?;
        let query = [
            ("period1", unix_seconds(start).to_string()),
            ("period2", unix_seconds(end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,splits".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];

        let text = self
            .retry
            .run("fetch_history", || self.get_checked(url.as_str(), &query, symbol))
            .await?;
        let response: ChartResponse =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;

        let history = parse_chart(symbol, response)?;
        tracing::debug!(symbol, points = history.len(), "Fetched price history.");
        Ok(history)
    }
}

#[async_trait]
impl MetadataSource for YahooClient {
    async fn fetch_metadata(&self, symbol: &str) -> Result<RawMetadata, ApiError> {
        let url = self.endpoint(&["v10", "finance", "quoteSummary"], symbol)?;
        let crumb = self.crumb().await?;

        let text = match self.quote_summary(&url, symbol, &crumb).await {
            // Yahoo rotated the session; one retry with a fresh crumb.
            Err(ApiError::Status { status: 401, .. }) => {
                tracing::debug!(symbol, "Session crumb rejected, fetching a new one.");
                self.invalidate_crumb(&crumb).await;
                let crumb = self.crumb().await?;
                self.quote_summary(&url, symbol, &crumb).await?
            }
            other => other?,
        };
        let response: QuoteSummaryResponse =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;

        parse_quote_summary(symbol, response)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn error_from_body(symbol: &str, error: YahooErrorBody) -> ApiError {
    if error.code.eq_ignore_ascii_case("Not Found") {
        ApiError::UnknownSymbol(symbol.to_string())
    } else {
        ApiError::InvalidData(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        ))
    }
}

/// Turns a chart payload into dated closes, preferring split/dividend-adjusted
/// closes when the payload carries them. Sessions without a close are skipped.
pub(crate) fn parse_chart(symbol: &str, response: ChartResponse) -> Result<PriceHistory, ApiError> {
    if let Some(error) = response.chart.error {
        return Err(error_from_body(symbol, error));
    }
    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceHistory::new(symbol, Vec::new()));
    };

    let sessions = result.timestamp.len();
    let closes = result
        .indicators
        .adjclose
        .first()
        .map(|a| &a.adjclose)
        .filter(|c| c.len() == sessions)
        .or_else(|| result.indicators.quote.first().map(|q| &q.close))
        .ok_or_else(|| ApiError::InvalidData(format!("no close prices for {symbol}")))?;

    if closes.len() != sessions {
        return Err(ApiError::InvalidData(format!(
            "{symbol}: {} timestamps but {} closes",
            sessions,
            closes.len()
        )));
    }

    let points = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| close.filter(|c| c.is_finite()).map(|c| (*ts, c)))
        .map(|(ts, close)| {
            DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
                .map(|dt| (dt.date_naive(), close))
                .ok_or_else(|| ApiError::InvalidData(format!("invalid timestamp {ts}")))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(PriceHistory::new(symbol, points))
}

pub(crate) fn parse_quote_summary(
    symbol: &str,
    response: QuoteSummaryResponse,
) -> Result<RawMetadata, ApiError> {
    if let Some(error) = response.quote_summary.error {
        return Err(error_from_body(symbol, error));
    }
    let Some(result) = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
    else {
        return Ok(RawMetadata::new());
    };

    let mut raw = RawMetadata::new();
    if let Some(price) = result.price {
        if let Some(name) = price.short_name.or(price.long_name) {
            raw.insert(MetadataField::Company, FieldValue::Text(name));
        }
        if let Some(cap) = price.market_cap.and_then(|m| m.raw) {
            raw.insert(MetadataField::MarketCap, FieldValue::Number(cap));
        }
    }
    if let Some(profile) = result.asset_profile {
        if let Some(sector) = profile.sector {
            raw.insert(MetadataField::Sector, FieldValue::Text(sector));
        }
        if let Some(industry) = profile.industry {
            raw.insert(MetadataField::Industry, FieldValue::Text(industry));
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_chart_prefers_adjusted_closes_and_skips_nulls() {
        let response = chart(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"AAPL","currency":"USD","gmtoffset":-18000},
                "timestamp":[1704205800,1704292200,1704378600],
                "indicators":{
                    "quote":[{"close":[185.64,184.25,181.91]}],
                    "adjclose":[{"adjclose":[184.73,null,181.02]}]
                }}],"error":null}}"#,
        );

        let history = parse_chart("AAPL", response).unwrap();
        assert_eq!(history.symbol, "AAPL");
        assert_eq!(
            history.points,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 184.73),
                (NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(), 181.02),
            ]
        );
    }

    #[test]
    fn test_parse_chart_falls_back_to_raw_closes() {
        let response = chart(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"MSFT","gmtoffset":0},
                "timestamp":[1704153600],
                "indicators":{"quote":[{"close":[370.87]}]}
                }],"error":null}}"#,
        );
        let history = parse_chart("MSFT", response).unwrap();
        assert_eq!(history.points, vec![(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 370.87)]);
    }

    #[test]
    fn test_parse_chart_not_found_is_unknown_symbol() {
        let response = chart(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        assert!(matches!(
            parse_chart("ZZZZ", response),
            Err(ApiError::UnknownSymbol(s)) if s == "ZZZZ"
        ));
    }

    #[test]
    fn test_parse_chart_empty_range_is_empty_history() {
        let response = chart(
            r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},"indicators":{"quote":[{}],"adjclose":[{}]}}],"error":null}}"#,
        );
        assert!(parse_chart("AAPL", response).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_length_mismatch_is_invalid() {
        let response = chart(
            r#"{"chart":{"result":[{"meta":{"symbol":"X"},"timestamp":[1,2],"indicators":{"quote":[{"close":[1.0]}]}}],"error":null}}"#,
        );
        assert!(matches!(parse_chart("X", response), Err(ApiError::InvalidData(_))));
    }

    #[test]
    fn test_parse_quote_summary_collects_known_fields() {
        let response: QuoteSummaryResponse = serde_json::from_str(
            r#"{"quoteSummary":{"result":[{
                "price":{"shortName":"Apple Inc.","marketCap":{"raw":2994371297280,"fmt":"2.99T"}},
                "assetProfile":{"sector":"Technology","industry":"Consumer Electronics"}
                }],"error":null}}"#,
        )
        .unwrap();

        let raw = parse_quote_summary("AAPL", response).unwrap();
        assert_eq!(
            raw.get(MetadataField::Company),
            Some(&FieldValue::Text("Apple Inc.".into()))
        );
        assert_eq!(
            raw.get(MetadataField::MarketCap),
            Some(&FieldValue::Number(2994371297280.0))
        );
        assert_eq!(
            raw.get(MetadataField::Industry),
            Some(&FieldValue::Text("Consumer Electronics".into()))
        );
    }

    #[test]
    fn test_parse_quote_summary_tolerates_missing_modules() {
        let response: QuoteSummaryResponse = serde_json::from_str(
            r#"{"quoteSummary":{"result":[{"price":{"marketCap":{}}}],"error":null}}"#,
        )
        .unwrap();
        let raw = parse_quote_summary("SPY", response).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_unix_seconds_is_utc_midnight() {
        assert_eq!(unix_seconds(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()), 1_640_995_200);
    }

    #[test]
    fn test_symbol_is_a_single_encoded_path_segment() {
        let client = YahooClient::new(&PriceSourceConfig {
            base_url: "https://query1.example.com/".to_string(),
            ..PriceSourceConfig::default()
        })
        .unwrap();

        let url = client.endpoint(&["v8", "finance", "chart"], "BRK-B").unwrap();
        assert_eq!(url.as_str(), "https://query1.example.com/v8/finance/chart/BRK-B");

        let url = client.endpoint(&["v8", "finance", "chart"], "A/B?x=1#y").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB%3Fx=1%23y");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    mod stub {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        const QUOTE: &str = r#"{"quoteSummary":{"result":[{"price":{"shortName":"Apple Inc."}}],"error":null}}"#;
        const INVALID_CRUMB: &str = r#"{"finance":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;

        /// Serves one response per connection. The first crumb handed out is
        /// "crumbA", every later one is "crumbB"; only crumbB is accepted.
        /// MSFT is always refused.
        pub async fn serve(listener: TcpListener, crumb_fetches: Arc<AtomicUsize>) {
            while let Ok((mut stream, _)) = listener.accept().await {
                let crumb_fetches = crumb_fetches.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request);
                    let target = request.split_whitespace().nth(1).unwrap_or("/");

                    let (status, body) = if target.starts_with("/v1/test/getcrumb") {
                        match crumb_fetches.fetch_add(1, Ordering::SeqCst) {
                            0 => ("200 OK", "crumbA"),
                            _ => ("200 OK", "crumbB"),
                        }
                    } else if target.starts_with("/v10/finance/quoteSummary/AAPL")
                        && target.contains("crumb=crumbB")
                    {
                        ("200 OK", QUOTE)
                    } else if target.starts_with("/v10/finance/quoteSummary/") {
                        ("401 Unauthorized", INVALID_CRUMB)
                    } else {
                        ("200 OK", "")
                    };

                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        }
    }

    #[tokio::test]
    async fn test_rejected_crumb_is_refreshed_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let crumb_fetches = Arc::new(AtomicUsize::new(0));
        tokio::spawn(stub::serve(listener, crumb_fetches.clone()));

        let client = YahooClient::new(&PriceSourceConfig {
            base_url: format!("http://{addr}"),
            cookie_url: format!("http://{addr}/cookie"),
            ..PriceSourceConfig::default()
        })
        .unwrap();

        // crumbA is refused, so the client fetches crumbB and repeats the call.
        let raw = client.fetch_metadata("AAPL").await.unwrap();
        assert_eq!(
            raw.get(MetadataField::Company),
            Some(&FieldValue::Text("Apple Inc.".into()))
        );
        assert_eq!(crumb_fetches.load(Ordering::SeqCst), 2);

        // The refreshed crumb is reused.
        client.fetch_metadata("AAPL").await.unwrap();
        assert_eq!(crumb_fetches.load(Ordering::SeqCst), 2);

        // A second refusal is returned instead of looping.
        assert!(matches!(
            client.fetch_metadata("MSFT").await,
            Err(ApiError::Status { status: 401, .. })
        ));
        assert_eq!(crumb_fetches.load(Ordering::SeqCst), 3);
    }
}
