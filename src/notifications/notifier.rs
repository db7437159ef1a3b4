use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{AlertStatus, BiasSignal, IndicatorSet, SignalState};
use crate::notifications::memory::NotificationMemory;
use crate::notifications::sink::NotificationSink;

/// Emits one alert per signal state transition.
pub struct SignalTransitionNotifier {
    sink: Option<Arc<dyn NotificationSink>>,
    recipients: Vec<String>,
}

impl SignalTransitionNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>, recipients: Vec<String>) -> Self {
        Self {
            sink: Some(sink),
            recipients,
        }
    }

    /// Notifier that tracks transitions but has nowhere to send them.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            recipients: Vec::new(),
        }
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Whether `state` would be emitted given `memory`.
    pub fn should_emit(memory: &NotificationMemory, state: SignalState) -> bool {
        state != SignalState::Neutral && state != memory.last_emitted_state
    }

    /// Compare the new bias against memory and dispatch if it is a transition.
    ///
    /// Memory advances whether or not delivery succeeded. Failed sends are
    /// logged and never retried.
    pub async fn process(
        &self,
        memory: &mut NotificationMemory,
        bias: &BiasSignal,
        primary: &IndicatorSet,
    ) -> AlertStatus {
        if !Self::should_emit(memory, bias.state) {
            return AlertStatus::Suppressed;
        }

        let previous = memory.last_emitted_state;
        memory.last_emitted_state = bias.state;

        info!(
            from = %previous,
            to = %bias.state,
            score = bias.score,
            "SignalTransitionNotifier: transition {} -> {}",
            previous,
            bias.state
        );

        let Some(sink) = &self.sink else {
            return AlertStatus::Dispatched {
                delivered: 0,
                failed: 0,
            };
        };

        let text = format_alert(bias, primary);
        let results = join_all(
            self.recipients
                .iter()
                .map(|recipient| sink.send(recipient, &text)),
        )
        .await;

        let mut delivered = 0;
        let mut failed = 0;
        for (recipient, result) in self.recipients.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    error!(recipient = %recipient, error = %e, "SignalTransitionNotifier: delivery to {} failed", recipient);
                }
            }
        }

        AlertStatus::Dispatched { delivered, failed }
    }
}

pub fn format_alert(bias: &BiasSignal, primary: &IndicatorSet) -> String {
    let mut text = format!(
        "{} {}\nPrice: {:.2} ({:+.2}%)\nRSI: {:.1}\nScore: {:+}",
        primary.symbol,
        bias.state.label(),
        primary.last_price,
        primary.percent_change,
        primary.rsi,
        bias.score
    );
    for reason in &bias.reasons {
        text.push_str(&format!("\n- {}", reason.description));
    }
    text
}
