//! Market structure indicators: support/resistance pivots

pub mod support_resistance;

pub use support_resistance::*;
