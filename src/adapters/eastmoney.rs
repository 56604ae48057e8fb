//! A-share K-line provider backed by the Eastmoney kline endpoint.
//!
//! Daily/weekly/monthly and minute-bucket series come from the same
//! endpoint; the `klt` parameter selects the granularity and `fqt` the
//! price adjustment. Kline rows arrive as comma-joined strings in the
//! requested field order (`f51..f56`).

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::macros::format_description;
use time::Date;

use crate::domain::KlineRecord;
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::{normalize_records, parse_kline_date, ColumnMap, RawTable};
use crate::request::{CnIntradayRequest, CnKlineRequest};

const KLINE_ENDPOINT: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
/// Requested kline fields: date, open, close, high, low, volume.
const KLINE_FIELDS: &str = "f51,f52,f53,f54,f55,f56";
const KLINE_FIELD_COUNT: usize = 6;

/// A-share K-line provider.
#[derive(Clone)]
pub struct EastmoneyProvider {
    http: Arc<dyn HttpClient>,
}

impl Default for EastmoneyProvider {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl EastmoneyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn column_map() -> ColumnMap {
        ColumnMap::new([
            ("f51", "date"),
            ("f52", "open"),
            ("f53", "close"),
            ("f54", "high"),
            ("f55", "low"),
            ("f56", "volume"),
        ])
        .expect("eastmoney column map is complete")
    }

    /// Fetch daily/weekly/monthly K-lines for the requested date range.
    ///
    /// One upstream attempt per call; transport failures and provider
    /// errors surface unchanged as upstream errors.
    pub async fn kline(&self, req: &CnKlineRequest) -> Result<Vec<KlineRecord>, FetchError> {
        let url = format!(
            "{KLINE_ENDPOINT}?secid={}&klt={}&fqt={}&beg={}&end={}&fields1=f1,f2,f3,f4,f5,f6&fields2={KLINE_FIELDS}",
            secid(req.symbol.as_str()),
            req.period.klt(),
            req.adjust.fqt(),
            compact_date(req.start),
            compact_date(req.end),
        );

        let table = self.fetch_table(&url).await?;
        normalize_records(&table, &Self::column_map())
    }

    /// Fetch intraday minute K-lines, optionally bounded by `start`/`end`
    /// (inclusive calendar dates). Without bounds the provider's full
    /// available history is returned.
    pub async fn intraday_kline(
        &self,
        req: &CnIntradayRequest,
    ) -> Result<Vec<KlineRecord>, FetchError> {
        req.validate()?;

        let beg = req.start.map_or_else(|| String::from("0"), compact_date);
        let end = req
            .end
            .map_or_else(|| String::from("20500101"), compact_date);
        let url = format!(
            "{KLINE_ENDPOINT}?secid={}&klt={}&fqt={}&beg={beg}&end={end}&fields1=f1,f2,f3,f4,f5,f6&fields2={KLINE_FIELDS}",
            secid(req.symbol.as_str()),
            req.period.klt(),
            req.adjust.fqt(),
        );

        let table = self.fetch_table(&url).await?;
        let mut records = normalize_records(&table, &Self::column_map())?;

        if req.start.is_some() || req.end.is_some() {
            records.retain(|record| {
                parse_kline_date(&record.date)
                    .map(|dt| {
                        req.start.is_none_or(|start| dt.date() >= start)
                            && req.end.is_none_or(|end| dt.date() <= end)
                    })
                    .unwrap_or(false)
            });
        }

        Ok(records)
    }

    async fn fetch_table(&self, url: &str) -> Result<RawTable, FetchError> {
        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| FetchError::upstream(format!("eastmoney transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(FetchError::upstream(format!(
                "eastmoney returned status {}",
                response.status
            )));
        }

        let payload: EastmoneyKlineResponse = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::upstream(format!("failed to parse eastmoney payload: {e}")))?;

        let Some(data) = payload.data else {
            return Err(FetchError::upstream(
                "eastmoney returned no kline data for this request",
            ));
        };

        let columns = KLINE_FIELDS.split(',').map(String::from).collect();
        let mut rows = Vec::with_capacity(data.klines.len());
        for (row_index, line) in data.klines.iter().enumerate() {
            let values: Vec<Value> = line
                .split(',')
                .take(KLINE_FIELD_COUNT)
                .map(|field| Value::String(field.to_owned()))
                .collect();
            if values.len() != KLINE_FIELD_COUNT {
                return Err(FetchError::upstream(format!(
                    "eastmoney kline row {row_index} has {} fields, expected {KLINE_FIELD_COUNT}",
                    values.len()
                )));
            }
            rows.push(values);
        }

        Ok(RawTable::new(columns, rows))
    }
}

/// Eastmoney security id: market prefix `1.` for Shanghai-listed `6xxxxx`
/// codes, `0.` for Shenzhen and others.
fn secid(symbol: &str) -> String {
    let market = if symbol.starts_with('6') { "1" } else { "0" };
    format!("{market}.{symbol}")
}

fn compact_date(date: Date) -> String {
    let compact = format_description!("[year][month][day]");
    date.format(&compact)
        .unwrap_or_else(|_| date.to_string().replace('-', ""))
}

#[derive(Debug, Clone, Deserialize)]
struct EastmoneyKlineResponse {
    #[serde(default)]
    data: Option<EastmoneyKlineData>,
}

#[derive(Debug, Clone, Deserialize)]
struct EastmoneyKlineData {
    #[serde(default)]
    klines: Vec<String>,
}
