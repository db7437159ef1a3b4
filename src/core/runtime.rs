//! Evaluation cycle: collect, score, notify, publish.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::{AlertStatus, MarketSnapshot};
use crate::notifications::{MemoryStore, NotificationMemory, SignalTransitionNotifier};
use crate::services::orchestrator::MarketDataOrchestrator;
use crate::signals::{BiasInputs, BiasScorer};

/// Owns the notifier memory and the last published snapshot.
///
/// The memory lives inside the cycle mutex, so two cycles never run at the
/// same time and a cycle always sees the memory left by the previous one.
pub struct SignalRuntime {
    orchestrator: MarketDataOrchestrator,
    notifier: SignalTransitionNotifier,
    cycle: Mutex<NotificationMemory>,
    latest: RwLock<Option<MarketSnapshot>>,
    last_error: RwLock<Option<EngineError>>,
    memory_store: Option<Arc<dyn MemoryStore>>,
    metrics: Option<Arc<Metrics>>,
}

impl SignalRuntime {
    pub fn new(orchestrator: MarketDataOrchestrator, notifier: SignalTransitionNotifier) -> Self {
        Self {
            orchestrator,
            notifier,
            cycle: Mutex::new(NotificationMemory::default()),
            latest: RwLock::new(None),
            last_error: RwLock::new(None),
            memory_store: None,
            metrics: None,
        }
    }

    pub fn with_memory_store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.memory_store = Some(store);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_memory(self, memory: NotificationMemory) -> Self {
        Self {
            cycle: Mutex::new(memory),
            ..self
        }
    }

    /// Load the persisted memory, if a store is configured and holds one.
    pub async fn restore_memory(&self) -> Result<Option<NotificationMemory>, EngineError> {
        let Some(store) = &self.memory_store else {
            return Ok(None);
        };
        let restored = store.load().await?;
        if let Some(memory) = restored {
            *self.cycle.lock().await = memory;
            info!(
                state = %memory.last_emitted_state,
                "SignalRuntime: restored last emitted state {}",
                memory.last_emitted_state
            );
        }
        Ok(restored)
    }

    pub async fn memory(&self) -> NotificationMemory {
        *self.cycle.lock().await
    }

    /// Last successfully published snapshot.
    pub async fn snapshot(&self) -> Option<MarketSnapshot> {
        self.latest.read().await.clone()
    }

    /// Failure of the most recent cycle, cleared by the next success.
    pub async fn last_error(&self) -> Option<EngineError> {
        self.last_error.read().await.clone()
    }

    /// Run one evaluation cycle. Waits for any cycle already in progress.
    pub async fn run_cycle(&self) -> Result<MarketSnapshot, EngineError> {
        let mut memory = self.cycle.lock().await;
        self.evaluate(&mut memory).await
    }

    /// Drop every cached feed and evaluate again immediately.
    pub async fn force_refresh(&self) -> Result<MarketSnapshot, EngineError> {
        let mut memory = self.cycle.lock().await;
        self.orchestrator.clear_cache().await;
        info!("SignalRuntime: cache cleared, forcing refresh");
        self.evaluate(&mut memory).await
    }

    async fn evaluate(
        &self,
        memory: &mut NotificationMemory,
    ) -> Result<MarketSnapshot, EngineError> {
        let started = Instant::now();

        let data = match self.orchestrator.collect().await {
            Ok(data) => data,
            Err(e) => {
                self.record_failure(&e, started).await;
                return Err(e);
            }
        };

        let bias = BiasScorer::evaluate(&BiasInputs {
            dxy_change: data.proxy.percent_change,
            yield_change: data.yield_change.unwrap_or(0.0),
            rsi: data.primary.rsi,
        });

        let before = *memory;
        let alert = self.notifier.process(memory, &bias, &data.primary).await;
        if *memory != before {
            self.persist(memory).await;
        }

        let snapshot = MarketSnapshot {
            primary_asset: data.primary,
            proxy_asset: data.proxy,
            yield_change: data.yield_change.unwrap_or(0.0),
            calendar_events: data.calendar_events,
            bias,
            alert,
            degraded: data.degraded,
            generated_at: Utc::now(),
        };

        info!(
            state = %snapshot.bias.state,
            score = snapshot.bias.score,
            price = snapshot.primary_asset.last_price,
            degraded = snapshot.degraded.len(),
            "SignalRuntime: cycle complete, bias {} ({:+})",
            snapshot.bias.state,
            snapshot.bias.score
        );

        if let Some(metrics) = &self.metrics {
            metrics
                .evaluation_cycles_total
                .with_label_values(&["success"])
                .inc();
            metrics
                .evaluation_duration_seconds
                .observe(started.elapsed().as_secs_f64());
            metrics.bias_score.set(f64::from(snapshot.bias.score));
            for degraded in &snapshot.degraded {
                metrics
                    .source_failures_total
                    .with_label_values(&[degraded.feed.as_str(), "degraded_source"])
                    .inc();
            }
            match snapshot.alert {
                AlertStatus::Suppressed => metrics
                    .notifications_total
                    .with_label_values(&["suppressed"])
                    .inc(),
                AlertStatus::Dispatched { delivered, failed } => {
                    metrics
                        .notifications_total
                        .with_label_values(&["delivered"])
                        .inc_by(delivered as u64);
                    metrics
                        .notifications_total
                        .with_label_values(&["failed"])
                        .inc_by(failed as u64);
                }
            }
        }

        *self.latest.write().await = Some(snapshot.clone());
        *self.last_error.write().await = None;
        Ok(snapshot)
    }

    async fn record_failure(&self, e: &EngineError, started: Instant) {
        let feed = e.feed().map(|f| f.as_str()).unwrap_or("none");
        match e {
            EngineError::RateLimited { .. } => warn!(
                feed = feed,
                kind = e.kind(),
                error = %e,
                "SignalRuntime: upstream quota exhausted, keeping previous snapshot"
            ),
            _ => error!(
                feed = feed,
                kind = e.kind(),
                error = %e,
                "SignalRuntime: cycle aborted, data unavailable"
            ),
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_source_failure(e);
            metrics
                .evaluation_cycles_total
                .with_label_values(&[e.kind()])
                .inc();
            metrics
                .evaluation_duration_seconds
                .observe(started.elapsed().as_secs_f64());
        }

        *self.last_error.write().await = Some(e.clone());
    }

    async fn persist(&self, memory: &NotificationMemory) {
        let Some(store) = &self.memory_store else {
            return;
        };
        if let Err(e) = store.save(memory).await {
            error!(error = %e, "SignalRuntime: failed to persist notification memory");
        }
    }
}
