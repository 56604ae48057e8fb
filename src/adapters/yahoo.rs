//! U.S. equity K-line provider backed by the Yahoo v8 chart endpoint.
//!
//! The chart payload carries parallel arrays (`timestamp` plus per-field
//! OHLCV arrays) with nullable entries; rows missing any OHLC value are
//! skipped rather than surfaced as partial records.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::domain::KlineRecord;
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::{normalize_records, ColumnMap, RawTable};
use crate::request::{UsIntradayRequest, UsKlineRequest};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// U.S. equity K-line provider.
#[derive(Clone)]
pub struct YahooProvider {
    http: Arc<dyn HttpClient>,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

/// How chart timestamps render into record dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateRender {
    Daily,
    Intraday,
}

impl DateRender {
    fn render(self, unix_ts: i64) -> Result<String, FetchError> {
        let ts = OffsetDateTime::from_unix_timestamp(unix_ts)
            .map_err(|e| FetchError::upstream(format!("invalid chart timestamp {unix_ts}: {e}")))?;

        let format = match self {
            Self::Daily => format_description!("[year]-[month]-[day]"),
            Self::Intraday => format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        };
        ts.format(&format)
            .map_err(|e| FetchError::upstream(format!("unformattable chart timestamp {unix_ts}: {e}")))
    }
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn column_map() -> ColumnMap {
        ColumnMap::new([
            ("date", "date"),
            ("Open", "open"),
            ("Close", "close"),
            ("High", "high"),
            ("Low", "low"),
            ("Volume", "volume"),
        ])
        .expect("yahoo column map is complete")
    }

    /// Fetch daily/weekly/monthly K-lines for `[start, end)`.
    pub async fn kline(&self, req: &UsKlineRequest) -> Result<Vec<KlineRecord>, FetchError> {
        self.fetch_chart(
            req.symbol.as_str(),
            req.start,
            req.end,
            req.interval.as_str(),
            req.prepost,
            DateRender::Daily,
        )
        .await
    }

    /// Fetch intraday K-lines for `[start, end)`.
    pub async fn intraday_kline(
        &self,
        req: &UsIntradayRequest,
    ) -> Result<Vec<KlineRecord>, FetchError> {
        self.fetch_chart(
            req.symbol.as_str(),
            req.start,
            req.end,
            req.interval.as_str(),
            req.prepost,
            DateRender::Intraday,
        )
        .await
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
        interval: &str,
        prepost: bool,
        render: DateRender,
    ) -> Result<Vec<KlineRecord>, FetchError> {
        let url = format!(
            "{CHART_ENDPOINT}/{}?period1={}&period2={}&interval={interval}&includePrePost={prepost}",
            urlencoding::encode(symbol),
            unix_midnight(start),
            unix_midnight(end),
        );
        let request =
            HttpRequest::get(url).with_header("referer", "https://finance.yahoo.com/");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| FetchError::upstream(format!("yahoo transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(FetchError::upstream(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        let chart_response: YahooChartResponse = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::upstream(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = &chart_response.chart.error {
            let description = error
                .description
                .as_deref()
                .or(error.code.as_deref())
                .unwrap_or("unknown error");
            return Err(FetchError::upstream(format!(
                "yahoo chart API error: {description}"
            )));
        }

        let Some(result) = chart_response
            .chart
            .result
            .as_ref()
            .and_then(|results| results.first())
        else {
            return Err(FetchError::upstream("no chart data in response"));
        };

        let Some(timestamp) = result.timestamp.as_ref() else {
            // A symbol with no bars in range comes back without timestamps.
            return Ok(Vec::new());
        };
        let quote = result
            .indicators
            .quote
            .first()
            .ok_or_else(|| FetchError::upstream("no quote data in chart response"))?;

        let columns = ["date", "Open", "Close", "High", "Low", "Volume"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(timestamp.len());
        for (i, &ts) in timestamp.iter().enumerate() {
            let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
                quote.open.get(i),
                quote.high.get(i),
                quote.low.get(i),
                quote.close.get(i),
            ) else {
                continue;
            };
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);

            rows.push(vec![
                Value::String(render.render(ts)?),
                json!(open),
                json!(close),
                json!(high),
                json!(low),
                json!(volume),
            ]);
        }

        normalize_records(&RawTable::new(columns, rows), &Self::column_map())
    }
}

fn unix_midnight(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Symbol, UsInterval, UsIntradayInterval};
    use crate::error::FetchErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use time::macros::date;

    #[derive(Debug)]
    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn json(body: &str) -> Self {
            Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failure(message: &str) -> Self {
            Self {
                response: Err(HttpError::new(message)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|r| r.url.clone())
                .collect()
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    // Unix timestamps 2024-01-02 / 2024-01-03 00:00 UTC.
    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704240000, 1704153600],
                "indicators": {
                    "quote": [{
                        "open":   [186.1, 184.2],
                        "high":   [188.4, 186.0],
                        "low":    [185.0, 183.9],
                        "close":  [187.2, 185.6],
                        "volume": [52000000, 48000000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn daily_request() -> UsKlineRequest {
        UsKlineRequest::new(
            Symbol::parse("AAPL").expect("valid symbol"),
            date!(2024 - 01 - 01),
            date!(2024 - 02 - 01),
        )
        .expect("valid request")
    }

    #[tokio::test]
    async fn parses_chart_and_sorts_ascending() {
        let client = Arc::new(CannedHttpClient::json(CHART_BODY));
        let provider = YahooProvider::with_http_client(client.clone());

        let records = provider
            .kline(&daily_request())
            .await
            .expect("kline should succeed");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2024-01-02");
        assert_eq!(records[0].close, 185.6);
        assert_eq!(records[1].date, "2024-01-03");
        assert_eq!(records[1].volume, 52_000_000.0);

        let urls = client.recorded_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("/v8/finance/chart/AAPL?"));
        assert!(urls[0].contains("interval=1d"));
        assert!(urls[0].contains("includePrePost=false"));
    }

    #[tokio::test]
    async fn request_carries_interval_and_prepost_overrides() {
        let client = Arc::new(CannedHttpClient::json(CHART_BODY));
        let provider = YahooProvider::with_http_client(client.clone());
        let request = daily_request()
            .with_interval(UsInterval::OneWeek)
            .with_prepost(true);

        provider.kline(&request).await.expect("kline should succeed");

        let urls = client.recorded_urls();
        assert!(urls[0].contains("interval=1wk"));
        assert!(urls[0].contains("includePrePost=true"));
    }

    #[tokio::test]
    async fn intraday_renders_datetime_dates() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704207600],
                    "indicators": {
                        "quote": [{
                            "open": [185.0], "high": [185.9],
                            "low": [184.5], "close": [185.5],
                            "volume": [3200000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let client = Arc::new(CannedHttpClient::json(body));
        let provider = YahooProvider::with_http_client(client.clone());
        let request = UsIntradayRequest::new(
            Symbol::parse("AAPL").expect("valid symbol"),
            date!(2024 - 01 - 02),
            date!(2024 - 01 - 03),
        )
        .expect("valid request")
        .with_interval(UsIntradayInterval::SixtyMinutes);

        let records = provider
            .intraday_kline(&request)
            .await
            .expect("intraday kline should succeed");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-01-02 15:00:00");
        assert!(client.recorded_urls()[0].contains("interval=60m"));
    }

    #[tokio::test]
    async fn skips_rows_with_missing_ohlc_values() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "open":   [184.2, null],
                            "high":   [186.0, 188.4],
                            "low":    [183.9, 185.0],
                            "close":  [185.6, 187.2],
                            "volume": [48000000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let client = Arc::new(CannedHttpClient::json(body));
        let provider = YahooProvider::with_http_client(client);

        let records = provider
            .kline(&daily_request())
            .await
            .expect("kline should succeed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-01-02");
    }

    #[tokio::test]
    async fn chart_error_surfaces_as_upstream() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let client = Arc::new(CannedHttpClient::json(body));
        let provider = YahooProvider::with_http_client(client);

        let err = provider
            .kline(&daily_request())
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::Upstream);
        assert!(err.message().contains("may be delisted"));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_upstream() {
        let client = Arc::new(CannedHttpClient::failure("upstream timeout"));
        let provider = YahooProvider::with_http_client(client);

        let err = provider
            .kline(&daily_request())
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::Upstream);
        assert!(err.retryable());
        assert!(err.message().contains("upstream timeout"));
    }

    #[tokio::test]
    async fn missing_timestamps_yield_empty_series() {
        let body = r#"{
            "chart": {
                "result": [{
                    "indicators": {"quote": [{"open": [], "high": [], "low": [], "close": [], "volume": []}]}
                }],
                "error": null
            }
        }"#;
        let client = Arc::new(CannedHttpClient::json(body));
        let provider = YahooProvider::with_http_client(client);

        let records = provider
            .kline(&daily_request())
            .await
            .expect("kline should succeed");
        assert!(records.is_empty());
    }
}
