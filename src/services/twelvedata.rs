//! Twelve Data REST client for intraday price quotes.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::services::market_data::{FetchError, PriceQuoteService, QuoteRequest, RawSeries};
use crate::services::normalizer::FieldMap;

pub struct TwelveDataClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TwelveDataClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    fn series_url(&self, request: &QuoteRequest) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/time_series", self.base_url.trim_end_matches('/')))
            .map_err(|e| FetchError::Connectivity(format!("invalid base url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("symbol", &request.symbol)
            .append_pair("interval", &request.interval)
            .append_pair("outputsize", &request.output_size.to_string())
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }
}

/// Extract the `values` array from a `time_series` payload.
///
/// Twelve Data reports failures in-band as `{"status":"error","code":...}`;
/// code 429 means the credit quota is exhausted.
pub fn parse_time_series(body: &Value) -> Result<RawSeries, FetchError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let code = body
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(0);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        if code == StatusCode::TOO_MANY_REQUESTS.as_u16() {
            return Err(FetchError::RateLimited(message));
        }
        return Err(FetchError::Status { code, message });
    }

    let values = body
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Malformed("missing 'values' array".to_string()))?;

    Ok(RawSeries {
        records: values.clone(),
        fields: FieldMap::TWELVE_DATA,
    })
}

#[async_trait]
impl PriceQuoteService for TwelveDataClient {
    async fn fetch_series(&self, request: &QuoteRequest) -> Result<RawSeries, FetchError> {
        let url = self.series_url(request)?;
        debug!(symbol = %request.symbol, interval = %request.interval, "TwelveData: requesting {}", request.symbol);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::RateLimited(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        let series = parse_time_series(&body)?;
        debug!(
            symbol = %request.symbol,
            records = series.records.len(),
            "TwelveData: received {} records for {}",
            series.records.len(),
            request.symbol
        );
        Ok(series)
    }
}
