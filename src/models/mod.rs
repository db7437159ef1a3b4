//! Shared data models spanning the engine layers.

pub mod candle;
pub mod indicators;
pub mod signal;
pub mod snapshot;

pub use candle::{Candle, PriceSeries, MIN_SERIES_LEN};
pub use indicators::{ComputationFallback, HistoryPoint, IndicatorSet, PivotLevels};
pub use signal::{BiasSignal, SignalReason, SignalState};
pub use snapshot::{AlertStatus, CalendarEvent, DegradedFeed, MarketSnapshot};
