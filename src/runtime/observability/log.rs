use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{info, warn};

/// Log-based observer: forwards every event to `tracing`.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::GameStart { game_id } => {
                info!(game_id = %game_id, "game.start");
            }
            ObserverEvent::GameEnd {
                outcome,
                transitions,
                duration_ms,
            } => {
                info!(outcome = %outcome, transitions, duration_ms, "game.end");
            }
            ObserverEvent::RouteDecision {
                role,
                route,
                reason,
            } => {
                info!(role = %role, route = ?route, reason = %reason, "route.decision");
            }
            ObserverEvent::Correction { role, correction } => {
                warn!(role = %role, correction = ?correction, "action.correction");
            }
            ObserverEvent::ActionExecuted {
                action,
                origin,
                duration_ms,
                success,
            } => {
                info!(action = %action, origin = %origin, duration_ms, success, "action.executed");
            }
            ObserverEvent::MessageEmitted { author, content } => {
                info!(author = ?author, content = %content, "message.emitted");
            }
            ObserverEvent::NodeOrderAnomaly {
                step,
                expected,
                observed,
            } => {
                warn!(step, expected = %expected, observed = %observed, "node_order.anomaly");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::RequestLatency { role, duration_ms } => {
                info!(role = %role, latency_ms = duration_ms, "metric.request_latency");
            }
            ObserverMetric::TokensUsed { role, tokens } => {
                info!(role = %role, tokens, "metric.tokens_used");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
