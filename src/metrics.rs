//! Prometheus metrics for the HTTP surface and the evaluation cycle.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::error::EngineError;

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub evaluation_cycles_total: IntCounterVec,
    pub evaluation_duration_seconds: Histogram,
    pub source_failures_total: IntCounterVec,
    pub notifications_total: IntCounterVec,
    pub bias_score: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let evaluation_cycles_total = IntCounterVec::new(
            Opts::new("evaluation_cycles_total", "Evaluation cycles by outcome"),
            &["outcome"],
        )?;
        let evaluation_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "evaluation_duration_seconds",
            "Duration of one evaluation cycle in seconds",
        ))?;
        let source_failures_total = IntCounterVec::new(
            Opts::new("source_failures_total", "Upstream failures by feed and kind"),
            &["feed", "kind"],
        )?;
        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Notification deliveries by result"),
            &["result"],
        )?;
        let bias_score = Gauge::new("bias_score", "Most recent bias score")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(evaluation_cycles_total.clone()))?;
        registry.register(Box::new(evaluation_duration_seconds.clone()))?;
        registry.register(Box::new(source_failures_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(bias_score.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            evaluation_cycles_total,
            evaluation_duration_seconds,
            source_failures_total,
            notifications_total,
            bias_score,
        })
    }

    pub fn record_source_failure(&self, error: &EngineError) {
        let feed = error.feed().map(|f| f.as_str()).unwrap_or("none");
        self.source_failures_total
            .with_label_values(&[feed, error.kind()])
            .inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
