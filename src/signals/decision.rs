//! Score to signal state mapping

use crate::models::signal::SignalState;

pub const STRONG_BUY_MIN: i32 = 6;
pub const BUY_MIN: i32 = 2;
pub const STRONG_SELL_MAX: i32 = -6;
pub const SELL_MAX: i32 = -2;

/// Map a score to a state. Checked top to bottom, first match wins.
pub fn classify(score: i32) -> SignalState {
    if score >= STRONG_BUY_MIN {
        SignalState::StrongBuy
    } else if score >= BUY_MIN {
        SignalState::Buy
    } else if score <= STRONG_SELL_MAX {
        SignalState::StrongSell
    } else if score <= SELL_MAX {
        SignalState::Sell
    } else {
        SignalState::Neutral
    }
}
