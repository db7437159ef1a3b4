//! Canonical OHLC candles and price series.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::services::normalizer::NormalizeError;

/// Minimum number of candles a usable series must hold.
pub const MIN_SERIES_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Build a candle, widening `high`/`low` so that `low <= {open, close} <= high`.
    pub fn new(open: f64, high: f64, low: f64, close: f64, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            timestamp,
            open,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            close,
        }
    }

    /// Candle where only the close is known.
    pub fn from_close(close: f64, timestamp: DateTime<FixedOffset>) -> Self {
        Self::new(close, close, close, close, timestamp)
    }
}

/// Ascending, duplicate-free candle sequence produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    candles: Vec<Candle>,
    inverse: bool,
}

impl PriceSeries {
    /// Sort by timestamp, drop duplicate timestamps (the last record wins)
    /// and reject series that are too short to compute a change.
    pub fn new(mut candles: Vec<Candle>, inverse: bool) -> Result<Self, NormalizeError> {
        if candles.is_empty() {
            return Err(NormalizeError::Empty);
        }

        // Stable sort keeps upstream order among equal timestamps.
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        if deduped.len() < MIN_SERIES_LEN {
            return Err(NormalizeError::InsufficientCandles(deduped.len()));
        }

        Ok(Self {
            candles: deduped,
            inverse,
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Whether the series stands in for an inverted quantity.
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }
}
