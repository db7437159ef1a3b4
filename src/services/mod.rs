//! Upstream feeds and the orchestration of one evaluation cycle's fetches.

pub mod calendar;
pub mod market_data;
pub mod normalizer;
pub mod orchestrator;
pub mod twelvedata;
pub mod yahoo;

pub use calendar::CalendarClient;
pub use market_data::{
    CalendarQuery, CalendarService, FetchError, PriceQuoteService, QuoteRequest, RawSeries,
    YieldRequest, YieldService,
};
pub use orchestrator::{MarketData, MarketDataOrchestrator, OrchestratorSettings};
pub use twelvedata::TwelveDataClient;
pub use yahoo::YahooChartClient;
