//! RSI (Relative Strength Index) indicator

use crate::models::indicators::ComputationFallback;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI reported when there is not enough data to say anything.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI value plus the fallback that produced it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiReading {
    pub value: f64,
    pub fallback: Option<ComputationFallback>,
}

impl RsiReading {
    fn computed(value: f64) -> Self {
        Self {
            value,
            fallback: None,
        }
    }

    fn fallback(value: f64, fallback: ComputationFallback) -> Self {
        Self {
            value,
            fallback: Some(fallback),
        }
    }
}

/// Calculate RSI with Wilder smoothing.
///
/// RSI = 100 - (100 / (1 + RS)), RS = Average Gain / Average Loss.
/// The averages are seeded with the simple mean of the first `period` deltas
/// and every later delta is folded in as `(avg * (period - 1) + value) / period`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> RsiReading {
    if period == 0 || closes.len() < period + 1 {
        return RsiReading::fallback(NEUTRAL_RSI, ComputationFallback::InsufficientHistory);
    }

    if closes.iter().any(|c| !c.is_finite()) {
        return RsiReading::fallback(NEUTRAL_RSI, ComputationFallback::NonFiniteInput);
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let (seed, rest) = deltas.split_at(period);
    let mut avg_gain = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / p;
    let mut avg_loss = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / p;

    for delta in rest {
        avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
    }

    if avg_loss == 0.0 {
        return RsiReading::fallback(100.0, ComputationFallback::ZeroAverageLoss);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));
    if !rsi.is_finite() {
        return RsiReading::fallback(NEUTRAL_RSI, ComputationFallback::NonFiniteInput);
    }

    RsiReading::computed(rsi.clamp(0.0, 100.0))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> RsiReading {
    calculate_rsi(closes, DEFAULT_RSI_PERIOD)
}
