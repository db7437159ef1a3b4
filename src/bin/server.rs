//! MafaFX Signal Engine Server
//!
//! Runs the evaluation cycle on a timer, alerts on bias transitions and
//! serves the latest snapshot over HTTP.

use mafafx::cache::RateLimitedCache;
use mafafx::config::{get_environment, AppConfig};
use mafafx::core::{start_server, AppState, CycleScheduler, SignalRuntime};
use mafafx::logging::init_logging;
use mafafx::metrics::Metrics;
use mafafx::notifications::{RedisMemoryStore, SignalTransitionNotifier, TelegramSink};
use mafafx::services::calendar::CalendarClient;
use mafafx::services::orchestrator::{MarketDataOrchestrator, OrchestratorSettings};
use mafafx::services::twelvedata::TwelveDataClient;
use mafafx::services::yahoo::YahooChartClient;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_logging();

    let config = AppConfig::from_env()?;
    info!(
        environment = %get_environment(),
        port = config.port,
        primary = %config.quotes.primary_symbol,
        proxy = %config.quotes.proxy_symbol,
        "Starting MafaFX Signal Engine Server"
    );

    let metrics = Arc::new(Metrics::new()?);
    let cache = Arc::new(RateLimitedCache::with_system_clock());

    let quotes = Arc::new(TwelveDataClient::new(
        config.quotes.base_url.clone(),
        config.quotes.api_key.clone(),
        config.request_timeout,
    )?);
    let mut orchestrator =
        MarketDataOrchestrator::new(quotes, cache, OrchestratorSettings::from_config(&config));
    if config.yields.enabled {
        orchestrator = orchestrator.with_yield_service(Arc::new(YahooChartClient::new(
            config.yields.base_url.clone(),
            config.request_timeout,
        )?));
    }
    if config.calendar.enabled {
        orchestrator = orchestrator.with_calendar_service(Arc::new(CalendarClient::new(
            config.calendar.url.clone(),
            config.request_timeout,
        )?));
    }

    let notifier = match &config.telegram {
        Some(telegram) if !telegram.chat_ids.is_empty() => {
            info!(
                recipients = telegram.chat_ids.len(),
                "Telegram alerts enabled for {} recipients",
                telegram.chat_ids.len()
            );
            let sink = TelegramSink::new(
                telegram.base_url.clone(),
                telegram.bot_token.clone(),
                config.request_timeout,
            )?;
            SignalTransitionNotifier::new(Arc::new(sink), telegram.chat_ids.clone())
        }
        _ => {
            warn!("No notification recipients configured, transitions will only be logged");
            SignalTransitionNotifier::disabled()
        }
    };

    let mut runtime = SignalRuntime::new(orchestrator, notifier).with_metrics(metrics.clone());
    if let Some(redis_url) = &config.redis_url {
        match RedisMemoryStore::connect(redis_url, config.memory_key.clone()).await {
            Ok(store) => runtime = runtime.with_memory_store(Arc::new(store)),
            Err(e) => warn!(error = %e, "Redis unavailable, notification memory will not persist"),
        }
    }
    let runtime = Arc::new(runtime);
    if let Err(e) = runtime.restore_memory().await {
        warn!(error = %e, "Failed to restore notification memory, starting from neutral");
    }

    let scheduler = if config.eval_interval_seconds > 0 {
        let scheduler = CycleScheduler::new(runtime.clone(), config.eval_interval_seconds)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        scheduler
            .start()
            .await
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        Some(scheduler)
    } else {
        info!("Signal evaluation timer disabled (set EVAL_INTERVAL_SECONDS to enable)");
        None
    };

    // first snapshot without waiting for the first tick
    let warmup = runtime.clone();
    tokio::spawn(async move {
        let _ = warmup.run_cycle().await;
    });

    let state = AppState::new(runtime, metrics);
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }

    Ok(())
}
