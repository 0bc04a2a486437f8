use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use super::traits::{Observer, ObserverEvent, ObserverMetric};

/// Append-only JSONL trace of one game: one object per event or metric,
/// stamped with the game id and an RFC 3339 timestamp.
pub struct JsonlObserver {
    game_id: String,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlObserver {
    /// Opens (or creates) `<dir>/<game_id>.jsonl`.
    pub fn create(dir: &Path, game_id: &str) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{game_id}.jsonl"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            game_id: game_id.to_string(),
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record<T: Serialize>(&self, record: &T) {
        let mut line = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(e) => {
                warn!(error = %e, "jsonl observer: failed to serialize record");
                return;
            }
        };
        line.insert("game_id".into(), Value::String(self.game_id.clone()));
        line.insert("ts".into(), Value::String(Utc::now().to_rfc3339()));

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = serde_json::to_writer(&mut *writer, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
        {
            warn!(path = %self.path.display(), error = %e, "jsonl observer: write failed");
        }
    }
}

impl Observer for JsonlObserver {
    fn record_event(&self, event: &ObserverEvent) {
        self.write_record(event);
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        self.write_record(metric);
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock()
            && let Err(e) = writer.flush()
        {
            warn!(path = %self.path.display(), error = %e, "jsonl observer: flush failed");
        }
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

impl Drop for JsonlObserver {
    fn drop(&mut self) {
        self.flush();
    }
}
