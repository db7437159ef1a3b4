//! Momentum indicators: RSI, percent change

pub mod change;
pub mod rsi;

pub use change::*;
pub use rsi::*;
