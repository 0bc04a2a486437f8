pub mod jsonl;
pub mod log;
pub mod memory;
pub mod multi;
pub mod noop;
pub mod traits;

pub use self::log::LogObserver;
pub use jsonl::JsonlObserver;
pub use memory::MemoryObserver;
pub use multi::MultiObserver;
pub use noop::NoopObserver;
pub use traits::{Observer, ObserverEvent, ObserverMetric};

use std::sync::Arc;

use crate::config::ObservabilityConfig;

/// Factory: build the observer for one game from config.
///
/// `backend` is a comma-separated list; more than one entry yields a
/// [`MultiObserver`]. A JSONL file that cannot be opened is skipped with a
/// warning rather than failing the game.
pub fn create_observer(config: &ObservabilityConfig, game_id: &str) -> Arc<dyn Observer> {
    let mut observers: Vec<Box<dyn Observer>> = Vec::new();

    for backend in config
        .backend
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        match backend {
            "log" => observers.push(Box::new(LogObserver::new())),
            "jsonl" => match JsonlObserver::create(&config.log_dir, game_id) {
                Ok(observer) => observers.push(Box::new(observer)),
                Err(e) => tracing::warn!(
                    dir = %config.log_dir.display(),
                    error = %e,
                    "Failed to open JSONL game log, skipping"
                ),
            },
            "none" | "noop" => {}
            other => {
                tracing::warn!("Unknown observability backend '{other}', ignoring");
            }
        }
    }

    match observers.len() {
        0 => Arc::new(NoopObserver),
        1 => match observers.pop() {
            Some(only) => Arc::from(only),
            None => Arc::new(NoopObserver),
        },
        _ => Arc::new(MultiObserver::new(observers)),
    }
}
