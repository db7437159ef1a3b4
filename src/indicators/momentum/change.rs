//! Bar-over-bar percent change

use crate::models::indicators::{ComputationFallback, HistoryPoint};
use crate::models::PriceSeries;

/// Percent change between the two most recent closes.
///
/// The sign is flipped for inverse series so that a rising proxy instrument
/// reads as a falling underlying quantity.
pub fn percent_change(closes: &[f64], inverse: bool) -> (f64, Option<ComputationFallback>) {
    if closes.len() < 2 {
        return (0.0, Some(ComputationFallback::InsufficientHistory));
    }

    let previous = closes[closes.len() - 2];
    let last = closes[closes.len() - 1];
    if !previous.is_finite() || !last.is_finite() {
        return (0.0, Some(ComputationFallback::NonFiniteInput));
    }
    if previous == 0.0 {
        return (0.0, Some(ComputationFallback::ZeroPreviousClose));
    }

    let change = (last - previous) / previous * 100.0;
    if inverse {
        (-change, None)
    } else {
        (change, None)
    }
}

/// Display price for a series. Inverse series are shown as `100 / close`.
pub fn display_price(close: f64, inverse: bool) -> f64 {
    if !inverse {
        return close;
    }
    if close == 0.0 || !close.is_finite() {
        return 0.0;
    }
    100.0 / close
}

/// Chart series: raw closes, or the inverted per-bar change for proxy series.
pub fn history(series: &PriceSeries) -> Vec<HistoryPoint> {
    let candles = series.candles();
    if !series.is_inverse() {
        return candles
            .iter()
            .map(|c| HistoryPoint {
                timestamp: c.timestamp,
                value: c.close,
            })
            .collect();
    }

    candles
        .windows(2)
        .filter_map(|w| {
            let (change, fallback) = percent_change(&[w[0].close, w[1].close], true);
            fallback.is_none().then(|| HistoryPoint {
                timestamp: w[1].timestamp,
                value: change,
            })
        })
        .collect()
}
