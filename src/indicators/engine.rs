//! Indicator engine: one price series in, one indicator set out.

use tracing::debug;

use super::momentum::{calculate_rsi, display_price, history, percent_change, DEFAULT_RSI_PERIOD};
use super::structure::{calculate_support_resistance, DEFAULT_PIVOT_WINDOW};
use crate::models::{IndicatorSet, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub pivot_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            pivot_window: DEFAULT_PIVOT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> IndicatorParams {
        self.params
    }

    /// Compute every indicator for `series`. Never fails: edge cases land in
    /// `IndicatorSet::fallbacks` with their documented default values.
    pub fn compute(&self, symbol: &str, series: &PriceSeries) -> IndicatorSet {
        let closes = series.closes();
        let inverse = series.is_inverse();
        let last = series.last();

        let (change, change_fallback) = percent_change(&closes, inverse);
        let rsi = calculate_rsi(&closes, self.params.rsi_period);
        let (pivot, pivot_fallback) =
            calculate_support_resistance(series.candles(), self.params.pivot_window);

        let fallbacks: Vec<_> = [change_fallback, rsi.fallback, pivot_fallback]
            .into_iter()
            .flatten()
            .collect();

        if !fallbacks.is_empty() {
            debug!(
                symbol = %symbol,
                fallbacks = ?fallbacks,
                candles = series.len(),
                "IndicatorEngine: {} resolved {} computation fallback(s)",
                symbol,
                fallbacks.len()
            );
        }

        IndicatorSet {
            symbol: symbol.to_string(),
            last_price: display_price(last.close, inverse),
            last_close: last.close,
            percent_change: change,
            rsi: rsi.value,
            pivot,
            inverse,
            as_of: last.timestamp,
            history: history(series),
            fallbacks,
        }
    }
}
