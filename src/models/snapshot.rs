use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Feed;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::BiasSignal;

/// Macro calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub title: String,
    pub country: String,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Optional feed that failed during a cycle and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedFeed {
    pub feed: Feed,
    pub reason: String,
}

/// What the notifier did with this cycle's bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// Same state as the last emitted one, or neutral.
    #[default]
    Suppressed,
    /// Transition detected and dispatched to the recipients.
    Dispatched { delivered: usize, failed: usize },
}

/// Everything the presentation layer gets to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub primary_asset: IndicatorSet,
    pub proxy_asset: IndicatorSet,
    pub yield_change: f64,
    pub calendar_events: Vec<CalendarEvent>,
    pub bias: BiasSignal,
    pub alert: AlertStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub degraded: Vec<DegradedFeed>,
    pub generated_at: DateTime<Utc>,
}
