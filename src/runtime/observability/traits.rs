use serde::Serialize;
use std::time::Duration;

use crate::core::game::action::ActionKind;
use crate::core::game::audit::Node;
use crate::core::game::corrector::Correction;
use crate::core::game::router::RouteKind;
use crate::core::game::state::{Author, Role};

/// Events the observer can record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObserverEvent {
    GameStart {
        game_id: String,
    },
    GameEnd {
        outcome: String,
        transitions: u32,
        duration_ms: u64,
    },
    RouteDecision {
        role: Role,
        route: RouteKind,
        reason: String,
    },
    Correction {
        role: Role,
        correction: Correction,
    },
    ActionExecuted {
        action: ActionKind,
        origin: Role,
        duration_ms: u64,
        success: bool,
    },
    MessageEmitted {
        author: Author,
        content: String,
    },
    NodeOrderAnomaly {
        step: usize,
        expected: Node,
        observed: Node,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum ObserverMetric {
    RequestLatency { role: Role, duration_ms: u64 },
    TokensUsed { role: Role, tokens: u64 },
}

impl ObserverMetric {
    pub fn request_latency(role: Role, duration: Duration) -> Self {
        Self::RequestLatency {
            role,
            duration_ms: duration_ms(duration),
        }
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Core observability trait. One instance per game, injected into every
/// component that reports.
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
