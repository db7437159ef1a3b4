//! Error taxonomy shared by the evaluation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upstream feed an error or degradation originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Primary,
    Proxy,
    Yield,
    Calendar,
}

impl Feed {
    /// A failure on a fatal feed aborts the whole evaluation cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Feed::Primary | Feed::Proxy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Primary => "primary",
            Feed::Proxy => "proxy",
            Feed::Yield => "yield",
            Feed::Calendar => "calendar",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the engine. None of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("data unavailable from {feed} feed: {reason}")]
    DataUnavailable { feed: Feed, reason: String },

    #[error("{feed} feed rate limited: {message}")]
    RateLimited { feed: Feed, message: String },

    #[error("{feed} feed degraded: {reason}")]
    DegradedSource { feed: Feed, reason: String },

    #[error("notification to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },

    #[error("notification memory store error: {0}")]
    MemoryStore(String),
}

impl EngineError {
    pub fn data_unavailable(feed: Feed, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            feed,
            reason: reason.into(),
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::DataUnavailable { .. } => "data_unavailable",
            EngineError::RateLimited { .. } => "rate_limited",
            EngineError::DegradedSource { .. } => "degraded_source",
            EngineError::Delivery { .. } => "delivery",
            EngineError::MemoryStore(_) => "memory_store",
        }
    }

    pub fn feed(&self) -> Option<Feed> {
        match self {
            EngineError::DataUnavailable { feed, .. }
            | EngineError::RateLimited { feed, .. }
            | EngineError::DegradedSource { feed, .. } => Some(*feed),
            _ => None,
        }
    }

    /// Convert a failure into the non-fatal variant used by optional feeds.
    pub fn into_degraded(self) -> Self {
        match self {
            EngineError::DataUnavailable { feed, reason } => {
                EngineError::DegradedSource { feed, reason }
            }
            EngineError::RateLimited { feed, message } => EngineError::DegradedSource {
                feed,
                reason: format!("rate limited: {}", message),
            },
            other => other,
        }
    }
}
