use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete directional bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalState {
    StrongSell,
    Sell,
    #[default]
    Neutral,
    Buy,
    StrongBuy,
}

impl SignalState {
    pub fn label(&self) -> &'static str {
        match self {
            SignalState::StrongSell => "STRONG SELL",
            SignalState::Sell => "SELL",
            SignalState::Neutral => "NEUTRAL",
            SignalState::Buy => "BUY",
            SignalState::StrongBuy => "STRONG BUY",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, SignalState::Buy | SignalState::StrongBuy)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, SignalState::Sell | SignalState::StrongSell)
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReason {
    pub description: String,
    pub weight: i32,
}

/// Scored bias for one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasSignal {
    pub state: SignalState,
    pub score: i32,
    pub reasons: Vec<SignalReason>,
}
