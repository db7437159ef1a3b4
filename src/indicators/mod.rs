pub mod engine;

pub mod momentum;
pub mod structure;

pub use engine::{IndicatorEngine, IndicatorParams};
