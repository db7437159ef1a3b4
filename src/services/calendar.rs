//! Weekly macro calendar feed (Forex Factory JSON export format).

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::CalendarEvent;
use crate::services::market_data::{CalendarQuery, CalendarService, FetchError};

#[derive(Debug, Clone, Deserialize)]
pub struct RawCalendarEvent {
    pub title: String,
    pub country: String,
    pub date: String,
    pub impact: String,
    #[serde(default)]
    pub forecast: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

impl RawCalendarEvent {
    fn into_event(self) -> Option<CalendarEvent> {
        let timestamp = DateTime::parse_from_rfc3339(self.date.trim()).ok()?;
        Some(CalendarEvent {
            timestamp,
            title: self.title,
            country: self.country,
            impact: self.impact,
            actual: non_blank(self.actual),
            forecast: non_blank(self.forecast),
            previous: non_blank(self.previous),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Keep the events matching `query`, ordered by time. Entries with an
/// unparsable date are skipped.
pub fn filter_events(raw: Vec<RawCalendarEvent>, query: &CalendarQuery) -> Vec<CalendarEvent> {
    let total = raw.len();
    let mut events: Vec<CalendarEvent> = raw
        .into_iter()
        .filter_map(RawCalendarEvent::into_event)
        .filter(|event| query.matches(event))
        .collect();
    events.sort_by_key(|e| e.timestamp);

    debug!(
        total = total,
        kept = events.len(),
        country = %query.country,
        impact = %query.impact,
        "Calendar: kept {} of {} events",
        events.len(),
        total
    );
    events
}

pub struct CalendarClient {
    url: String,
    client: reqwest::Client,
}

impl CalendarClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl CalendarService for CalendarClient {
    async fn fetch_events(&self, query: &CalendarQuery) -> Result<Vec<CalendarEvent>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited("calendar feed throttled".to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let raw: Vec<RawCalendarEvent> = response.json().await?;
        Ok(filter_events(raw, query))
    }
}
