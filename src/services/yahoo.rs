//! Yahoo Finance chart client, used for the 10-year yield (`^TNX`).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::services::market_data::{FetchError, RawSeries, YieldRequest, YieldService};
use crate::services::normalizer::FieldMap;

pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; mafafx/0.1)")
            .build()
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn chart_url(&self, request: &YieldRequest) -> Result<Url, FetchError> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| FetchError::Connectivity(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Connectivity("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", request.symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("range", &request.period)
            .append_pair("interval", &request.interval);
        Ok(url)
    }
}

/// Turn the columnar chart payload into row records. Rows without a close
/// (market gaps) are dropped.
pub fn parse_chart(body: &Value) -> Result<RawSeries, FetchError> {
    let chart = body
        .get("chart")
        .ok_or_else(|| FetchError::Malformed("missing 'chart'".to_string()))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(FetchError::Status { code: 0, message });
    }

    let result = &chart["result"][0];
    let timestamps = result["timestamp"]
        .as_array()
        .ok_or_else(|| FetchError::Malformed("missing 'timestamp' column".to_string()))?;
    let quote = &result["indicators"]["quote"][0];
    if !quote.is_object() {
        return Err(FetchError::Malformed("missing quote indicators".to_string()));
    }

    let records = timestamps
        .iter()
        .enumerate()
        .filter(|(i, _)| !quote["close"][*i].is_null())
        .map(|(i, ts)| {
            json!({
                "timestamp": ts,
                "open": quote["open"][i],
                "high": quote["high"][i],
                "low": quote["low"][i],
                "close": quote["close"][i],
            })
        })
        .collect();

    Ok(RawSeries {
        records,
        fields: FieldMap::CANONICAL,
    })
}

#[async_trait]
impl YieldService for YahooChartClient {
    async fn fetch_series(&self, request: &YieldRequest) -> Result<RawSeries, FetchError> {
        let url = self.chart_url(request)?;
        debug!(symbol = %request.symbol, range = %request.period, "Yahoo: requesting chart for {}", request.symbol);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(format!(
                "chart request for {} throttled",
                request.symbol
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        parse_chart(&body)
    }
}
