//! Upstream collaborator interfaces consumed by the orchestrator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::error::{EngineError, Feed};
use crate::models::CalendarEvent;
use crate::services::normalizer::{FieldMap, NormalizeError};

/// Transport-level outcome of an upstream call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connectivity(String),

    #[error("request timed out")]
    Timeout,

    #[error("upstream returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("quota exhausted: {0}")]
    RateLimited(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Attach the feed the call was made for.
    pub fn for_feed(self, feed: Feed) -> EngineError {
        match self {
            FetchError::RateLimited(message) => EngineError::RateLimited { feed, message },
            other => EngineError::DataUnavailable {
                feed,
                reason: other.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for FetchError {
    /// The request URL is dropped from the message: it can carry credentials.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                code: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            FetchError::Connectivity(e.to_string())
        }
    }
}

/// Map a normalizer reason code onto the feed it came from.
pub fn normalize_failure(feed: Feed, error: NormalizeError) -> EngineError {
    EngineError::data_unavailable(feed, error.to_string())
}

/// Raw OHLC records as returned by a source, plus the names of its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub records: Vec<Value>,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbol: String,
    pub interval: String,
    pub output_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldRequest {
    pub symbol: String,
    pub period: String,
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarQuery {
    pub country: String,
    pub impact: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl CalendarQuery {
    /// Whether an event passes the country, impact and date filters.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        let at = event.timestamp.with_timezone(&Utc);
        event.country.eq_ignore_ascii_case(&self.country)
            && event.impact.eq_ignore_ascii_case(&self.impact)
            && at >= self.from
            && at <= self.to
    }
}

/// Intraday OHLC quotes for the primary asset and the proxy instrument.
#[async_trait]
pub trait PriceQuoteService: Send + Sync {
    async fn fetch_series(&self, request: &QuoteRequest) -> Result<RawSeries, FetchError>;
}

/// OHLC series for an auxiliary rate instrument.
#[async_trait]
pub trait YieldService: Send + Sync {
    async fn fetch_series(&self, request: &YieldRequest) -> Result<RawSeries, FetchError>;
}

/// Macro-economic calendar.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn fetch_events(&self, query: &CalendarQuery) -> Result<Vec<CalendarEvent>, FetchError>;
}
