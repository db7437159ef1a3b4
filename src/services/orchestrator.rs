//! Market data orchestrator: fans out to every upstream feed for one cycle.
//!
//! Primary and proxy series are mandatory; yield and calendar are optional
//! and degrade to defaults when they fail. Every sub-fetch goes through the
//! shared [`RateLimitedCache`] with its own TTL.

use chrono::{DateTime, FixedOffset, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::RateLimitedCache;
use crate::config::{AppConfig, CacheTtls};
use crate::error::{EngineError, Feed};
use crate::indicators::momentum::percent_change;
use crate::indicators::{IndicatorEngine, IndicatorParams};
use crate::models::{CalendarEvent, DegradedFeed, IndicatorSet};
use crate::services::market_data::{
    normalize_failure, CalendarQuery, CalendarService, FetchError, PriceQuoteService,
    QuoteRequest, YieldRequest, YieldService,
};
use crate::services::normalizer::{fixed_offset_hours, normalize};

#[derive(Debug, Clone)]
pub struct CalendarSettings {
    pub country: String,
    pub impact: String,
    pub lookback: chrono::Duration,
    pub lookahead: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub primary: QuoteRequest,
    pub proxy: QuoteRequest,
    pub yield_request: Option<YieldRequest>,
    pub calendar: Option<CalendarSettings>,
    pub ttls: CacheTtls,
    pub offset: FixedOffset,
    pub request_timeout: Duration,
    pub indicators: IndicatorParams,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let hours = |h: i64| chrono::Duration::try_hours(h).unwrap_or_else(chrono::Duration::zero);
        let quote = |symbol: &str| QuoteRequest {
            symbol: symbol.to_string(),
            interval: config.quotes.interval.clone(),
            output_size: config.quotes.output_size,
        };

        Self {
            primary: quote(&config.quotes.primary_symbol),
            proxy: quote(&config.quotes.proxy_symbol),
            yield_request: config.yields.enabled.then(|| YieldRequest {
                symbol: config.yields.symbol.clone(),
                period: config.yields.period.clone(),
                interval: config.yields.interval.clone(),
            }),
            calendar: config.calendar.enabled.then(|| CalendarSettings {
                country: config.calendar.country.clone(),
                impact: config.calendar.impact.clone(),
                lookback: hours(config.calendar.lookback_hours),
                lookahead: hours(config.calendar.lookahead_hours),
            }),
            ttls: config.ttls.clone(),
            offset: fixed_offset_hours(config.tz_offset_hours),
            request_timeout: config.request_timeout,
            indicators: IndicatorParams {
                rsi_period: config.rsi_period,
                pivot_window: config.pivot_window,
            },
        }
    }
}

/// Output of one successful fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub primary: IndicatorSet,
    pub proxy: IndicatorSet,
    /// `None` when the yield feed is disabled or degraded.
    pub yield_change: Option<f64>,
    pub calendar_events: Vec<CalendarEvent>,
    pub degraded: Vec<DegradedFeed>,
}

pub struct MarketDataOrchestrator {
    quotes: Arc<dyn PriceQuoteService>,
    yields: Option<Arc<dyn YieldService>>,
    calendar: Option<Arc<dyn CalendarService>>,
    cache: Arc<RateLimitedCache>,
    engine: IndicatorEngine,
    settings: OrchestratorSettings,
}

impl MarketDataOrchestrator {
    pub fn new(
        quotes: Arc<dyn PriceQuoteService>,
        cache: Arc<RateLimitedCache>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            quotes,
            yields: None,
            calendar: None,
            cache,
            engine: IndicatorEngine::new(settings.indicators),
            settings,
        }
    }

    pub fn with_yield_service(mut self, service: Arc<dyn YieldService>) -> Self {
        self.yields = Some(service);
        self
    }

    pub fn with_calendar_service(mut self, service: Arc<dyn CalendarService>) -> Self {
        self.calendar = Some(service);
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Invalidate every memoised feed.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Fetch every feed concurrently and assemble the cycle's market data.
    pub async fn collect(&self) -> Result<MarketData, EngineError> {
        let (primary, proxy, yield_change, calendar_events) = tokio::join!(
            self.price_indicators(Feed::Primary, &self.settings.primary, false),
            self.price_indicators(Feed::Proxy, &self.settings.proxy, true),
            self.yield_change(),
            self.calendar_events(),
        );

        let primary = primary?;
        let proxy = proxy?;

        let mut degraded = Vec::new();
        let yield_change = yield_change.unwrap_or_else(|e| {
            degraded.push(degrade(Feed::Yield, e));
            None
        });
        let calendar_events = calendar_events.unwrap_or_else(|e| {
            degraded.push(degrade(Feed::Calendar, e));
            Vec::new()
        });

        debug!(
            primary = %primary.symbol,
            proxy = %proxy.symbol,
            events = calendar_events.len(),
            degraded = degraded.len(),
            "Orchestrator: collected market data"
        );

        Ok(MarketData {
            primary,
            proxy,
            yield_change,
            calendar_events,
            degraded,
        })
    }

    async fn price_indicators(
        &self,
        feed: Feed,
        request: &QuoteRequest,
        inverse: bool,
    ) -> Result<IndicatorSet, EngineError> {
        let key = format!(
            "price:{}:{}:{}:{}",
            request.symbol, request.interval, request.output_size, inverse
        );
        let ttl = self.settings.ttls.price;

        self.cache
            .get_or_compute_with(
                &key,
                || async move {
                    let raw = self
                        .timed(self.quotes.fetch_series(request))
                        .await
                        .map_err(|e| e.for_feed(feed))?;
                    let series = normalize(&raw.records, &raw.fields, inverse, self.settings.offset)
                        .map_err(|e| normalize_failure(feed, e))?;
                    Ok::<_, EngineError>(self.engine.compute(&request.symbol, &series))
                },
                |result| cache_ttl(result, ttl),
            )
            .await
    }

    async fn yield_change(&self) -> Result<Option<f64>, EngineError> {
        let (Some(service), Some(request)) = (&self.yields, &self.settings.yield_request) else {
            return Ok(None);
        };
        let key = format!("yield:{}:{}:{}", request.symbol, request.period, request.interval);
        let ttl = self.settings.ttls.yield_rate;

        self.cache
            .get_or_compute_with(
                &key,
                || async move {
                    let raw = self
                        .timed(service.fetch_series(request))
                        .await
                        .map_err(|e| e.for_feed(Feed::Yield))?;
                    let series = normalize(&raw.records, &raw.fields, false, self.settings.offset)
                        .map_err(|e| normalize_failure(Feed::Yield, e))?;
                    let (change, _) = percent_change(&series.closes(), false);
                    Ok::<_, EngineError>(Some(change))
                },
                |result| cache_ttl(result, ttl),
            )
            .await
    }

    async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, EngineError> {
        let (Some(service), Some(settings)) = (&self.calendar, &self.settings.calendar) else {
            return Ok(Vec::new());
        };
        let key = format!("calendar:{}:{}", settings.country, settings.impact);
        let ttl = self.settings.ttls.calendar;
        let offset = self.settings.offset;

        self.cache
            .get_or_compute_with(
                &key,
                || async move {
                    let query = calendar_window(settings, self.cache.clock().now());
                    let events = self
                        .timed(service.fetch_events(&query))
                        .await
                        .map_err(|e| e.for_feed(Feed::Calendar))?;
                    Ok::<_, EngineError>(events
                        .into_iter()
                        .map(|mut event| {
                            event.timestamp = event.timestamp.with_timezone(&offset);
                            event
                        })
                        .collect::<Vec<_>>())
                },
                |result| cache_ttl(result, ttl),
            )
            .await
    }

    async fn timed<T, Fut>(&self, request: Fut) -> Result<T, FetchError>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        tokio::time::timeout(self.settings.request_timeout, request)
            .await
            .unwrap_or(Err(FetchError::Timeout))
    }
}

/// Rolling calendar window around `now`.
pub fn calendar_window(settings: &CalendarSettings, now: DateTime<Utc>) -> CalendarQuery {
    CalendarQuery {
        country: settings.country.clone(),
        impact: settings.impact.clone(),
        from: now.checked_sub_signed(settings.lookback).unwrap_or(now),
        to: now.checked_add_signed(settings.lookahead).unwrap_or(now),
    }
}

/// Successful values and quota exhaustion are kept for the TTL window; any
/// other failure is retried on the next cycle.
fn cache_ttl<T>(result: &Result<T, EngineError>, ttl: Duration) -> Option<Duration> {
    match result {
        Ok(_) | Err(EngineError::RateLimited { .. }) => Some(ttl),
        Err(_) => None,
    }
}

fn degrade(feed: Feed, error: EngineError) -> DegradedFeed {
    let kind = error.kind();
    let error = error.into_degraded();
    warn!(
        feed = %feed,
        kind = kind,
        error = %error,
        "Orchestrator: {} feed degraded, continuing with defaults",
        feed
    );
    DegradedFeed {
        feed,
        reason: match error {
            EngineError::DegradedSource { reason, .. } => reason,
            other => other.to_string(),
        },
    }
}
