use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Support, pivot point and resistance over a recent candle window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotLevels {
    pub support: f64,
    pub pivot_point: f64,
    pub resistance: f64,
}

/// Edge case an indicator resolved locally to its documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationFallback {
    /// Not enough closes for the RSI period; RSI reported as 50.
    InsufficientHistory,
    /// Average loss was zero; RSI saturated at 100.
    ZeroAverageLoss,
    /// Previous close was zero; percent change reported as 0.
    ZeroPreviousClose,
    /// Non-finite input; the indicator fell back to its neutral value.
    NonFiniteInput,
    /// No candles in the pivot window; levels zeroed.
    EmptyWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub value: f64,
}

/// Indicators derived from one price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub symbol: String,
    /// Display price. For inverse series this is `100 / close`.
    pub last_price: f64,
    pub last_close: f64,
    pub percent_change: f64,
    pub rsi: f64,
    pub pivot: PivotLevels,
    pub inverse: bool,
    pub as_of: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub history: Vec<HistoryPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fallbacks: Vec<ComputationFallback>,
}

impl IndicatorSet {
    pub fn has_fallback(&self, fallback: ComputationFallback) -> bool {
        self.fallbacks.contains(&fallback)
    }
}
