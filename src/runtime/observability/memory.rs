use std::sync::Mutex;

use super::traits::{Observer, ObserverEvent, ObserverMetric};

/// Keeps everything it receives. Used by tests and by callers that want to
/// inspect a finished game without parsing logs.
#[derive(Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<ObserverEvent>>,
    metrics: Mutex<Vec<ObserverMetric>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> Vec<ObserverMetric> {
        self.metrics
            .lock()
            .map(|metrics| metrics.clone())
            .unwrap_or_default()
    }
}

impl Observer for MemoryObserver {
    fn record_event(&self, event: &ObserverEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.push(metric.clone());
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
