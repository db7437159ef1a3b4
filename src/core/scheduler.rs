//! Timer trigger for evaluation cycles

use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::runtime::SignalRuntime;

/// Cron expression firing every `interval_seconds`, aligned to the wall clock.
///
/// Only intervals that divide a minute, an hour or a day evenly can be
/// written as a cron step; anything else returns `None`.
pub fn cron_expression(interval_seconds: u64) -> Option<String> {
    let s = interval_seconds;
    if s == 0 {
        return None;
    }
    if s < 60 && 60 % s == 0 {
        Some(format!("*/{} * * * * *", s))
    } else if s % 60 == 0 && s < 3600 && 3600 % s == 0 {
        Some(format!("0 */{} * * * *", s / 60))
    } else if s % 3600 == 0 && s < 86_400 && 86_400 % s == 0 {
        Some(format!("0 0 */{} * * *", s / 3600))
    } else {
        None
    }
}

/// How ticks are produced.
#[derive(Debug, Clone)]
pub enum Cadence {
    /// Wall-clock aligned cron schedule.
    Cron(Schedule),
    /// Fixed period from start, for intervals cron cannot step evenly.
    Every(Duration),
}

/// Runs [`SignalRuntime::run_cycle`] on every tick.
pub struct CycleScheduler {
    runtime: Arc<SignalRuntime>,
    cadence: Cadence,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CycleScheduler {
    /// # Arguments
    /// * `runtime` - runtime whose cycle is triggered
    /// * `interval_seconds` - evaluation interval in seconds (0 = disabled)
    pub fn new(
        runtime: Arc<SignalRuntime>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_seconds == 0 {
            return Err("Scheduler disabled: interval_seconds is 0".into());
        }

        let cadence = match cron_expression(interval_seconds) {
            Some(cron_expr) => {
                let schedule = Schedule::from_str(&cron_expr)
                    .map_err(|e| format!("Invalid cron expression '{}': {}", cron_expr, e))?;
                info!(
                    interval = interval_seconds,
                    cron = %cron_expr,
                    "CycleScheduler: created with interval {}s (cron: {})",
                    interval_seconds,
                    cron_expr
                );
                Cadence::Cron(schedule)
            }
            None => {
                info!(
                    interval = interval_seconds,
                    "CycleScheduler: created with fixed interval {}s",
                    interval_seconds
                );
                Cadence::Every(Duration::from_secs(interval_seconds))
            }
        };

        Ok(Self {
            runtime,
            cadence,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.is_running().await {
            return Err("CycleScheduler already running".into());
        }

        let runtime = self.runtime.clone();
        let cadence = self.cadence.clone();

        let handle = tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for first tick...");
            match cadence {
                Cadence::Cron(schedule) => loop {
                    match schedule.upcoming(chrono::Utc).next() {
                        Some(next_tick) => {
                            let now = chrono::Utc::now();
                            if next_tick > now {
                                let wait = (next_tick - now).to_std().unwrap_or_default();
                                tokio::time::sleep(wait).await;
                            }
                        }
                        None => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            continue;
                        }
                    }
                    debug!("CycleScheduler: tick");
                    // failures are logged by the runtime; the next tick tries again
                    let _ = runtime.run_cycle().await;
                },
                Cadence::Every(period) => {
                    let mut ticker =
                        tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        debug!("CycleScheduler: tick");
                        let _ = runtime.run_cycle().await;
                    }
                }
            }
        });

        *self.handle.write().await = Some(handle);
        info!("CycleScheduler: started successfully");
        Ok(())
    }

    pub async fn stop(&self) {
        if let Some(h) = self.handle.write().await.take() {
            h.abort();
            info!("CycleScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
