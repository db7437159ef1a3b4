//! Weighted, threshold-based bias scoring.
//!
//! Weights are fixed heuristics, deliberately asymmetric per factor: the yield
//! move weighs heaviest, then the dollar proxy, then momentum.

use serde::{Deserialize, Serialize};

use crate::models::signal::{BiasSignal, SignalReason};
use crate::signals::decision::classify;

pub const DXY_THRESHOLD: f64 = 0.05;
pub const DXY_WEIGHT: i32 = 4;
pub const YIELD_THRESHOLD: f64 = 0.5;
pub const YIELD_WEIGHT: i32 = 5;
pub const RSI_OVERBOUGHT: f64 = 60.0;
pub const RSI_OVERSOLD: f64 = 40.0;
pub const RSI_WEIGHT: i32 = 1;

/// Largest absolute score the factors can add up to.
pub const MAX_SCORE: i32 = DXY_WEIGHT + YIELD_WEIGHT + RSI_WEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasInputs {
    /// Percent change of the (already inverted) dollar proxy.
    pub dxy_change: f64,
    /// Percent change of the yield instrument; 0 when unavailable.
    pub yield_change: f64,
    /// RSI of the primary asset.
    pub rsi: f64,
}

pub struct BiasScorer;

impl BiasScorer {
    /// Signed score in `[-MAX_SCORE, MAX_SCORE]` plus the reasons behind it.
    pub fn score(inputs: &BiasInputs) -> (i32, Vec<SignalReason>) {
        let mut score = 0;
        let mut reasons = Vec::new();
        let mut add = |weight: i32, description: String| {
            score += weight;
            reasons.push(SignalReason {
                description,
                weight,
            });
        };

        if inputs.dxy_change > DXY_THRESHOLD {
            add(-DXY_WEIGHT, format!("Dollar strengthening: {:+.3}%", inputs.dxy_change));
        } else if inputs.dxy_change < -DXY_THRESHOLD {
            add(DXY_WEIGHT, format!("Dollar weakening: {:+.3}%", inputs.dxy_change));
        }

        if inputs.yield_change > YIELD_THRESHOLD {
            add(-YIELD_WEIGHT, format!("Yields rising: {:+.2}%", inputs.yield_change));
        } else if inputs.yield_change < -YIELD_THRESHOLD {
            add(YIELD_WEIGHT, format!("Yields falling: {:+.2}%", inputs.yield_change));
        }

        if inputs.rsi > RSI_OVERBOUGHT {
            add(RSI_WEIGHT, format!("Momentum bullish: RSI {:.1}", inputs.rsi));
        } else if inputs.rsi < RSI_OVERSOLD {
            add(-RSI_WEIGHT, format!("Momentum bearish: RSI {:.1}", inputs.rsi));
        }

        (score, reasons)
    }

    pub fn evaluate(inputs: &BiasInputs) -> BiasSignal {
        let (score, reasons) = Self::score(inputs);
        BiasSignal {
            state: classify(score),
            score,
            reasons,
        }
    }
}
