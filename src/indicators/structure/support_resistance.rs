//! Support, resistance and pivot levels

use crate::models::indicators::{ComputationFallback, PivotLevels};
use crate::models::Candle;

pub const DEFAULT_PIVOT_WINDOW: usize = 24;

/// Calculate support and resistance levels over the most recent `window` candles.
///
/// Resistance is the highest high, support the lowest low and the pivot point
/// the mean close. Shorter series use every candle available; an empty window
/// yields zeroed levels.
pub fn calculate_support_resistance(
    candles: &[Candle],
    window: usize,
) -> (PivotLevels, Option<ComputationFallback>) {
    let start = candles.len().saturating_sub(window.max(1));
    let recent = &candles[start..];

    if recent.is_empty() {
        return (PivotLevels::default(), Some(ComputationFallback::EmptyWindow));
    }

    let finite = recent
        .iter()
        .all(|c| c.low.is_finite() && c.high.is_finite() && c.close.is_finite());
    if !finite {
        return (PivotLevels::default(), Some(ComputationFallback::NonFiniteInput));
    }

    // Closes are folded into the extremes so the pivot can never escape them,
    // even for candles built without the OHLC invariant.
    let support = recent
        .iter()
        .map(|c| c.low.min(c.close))
        .fold(f64::INFINITY, f64::min);
    let resistance = recent
        .iter()
        .map(|c| c.high.max(c.close))
        .fold(f64::NEG_INFINITY, f64::max);
    let mean_close = recent.iter().map(|c| c.close).sum::<f64>() / recent.len() as f64;

    if !mean_close.is_finite() {
        return (PivotLevels::default(), Some(ComputationFallback::NonFiniteInput));
    }

    (
        PivotLevels {
            support,
            pivot_point: mean_close.clamp(support, resistance),
            resistance,
        },
        None,
    )
}

/// Calculate support/resistance with default window (24)
pub fn calculate_support_resistance_default(
    candles: &[Candle],
) -> (PivotLevels, Option<ComputationFallback>) {
    calculate_support_resistance(candles, DEFAULT_PIVOT_WINDOW)
}
