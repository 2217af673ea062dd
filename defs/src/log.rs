use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_facade(self) -> ::log::Level {
        match self {
            LogLevel::Debug => ::log::Level::Debug,
            LogLevel::Info => ::log::Level::Info,
            LogLevel::Warn => ::log::Level::Warn,
            LogLevel::Error => ::log::Level::Error,
        }
    }
}

/// One structured log event, append-only per run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunLog {
    pub epoch: u128,
    pub timestamp: String,
    pub run_id: String,
    pub stage: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Receives every log entry of a run as it is produced. Sinks are
/// failure-tolerant by contract: a returned error is recorded on the log
/// facade and otherwise ignored, it never interrupts the run.
pub trait LogSink: Send + Sync {
    fn append(&self, entry: &RunLog) -> Result<(), anyhow::Error>;
}

/// Shared log buffer for one run. Clones share the same underlying entry
/// list, so the orchestrator can hand a logger to the terraform runner and
/// still see its output in the final result.
#[derive(Clone)]
pub struct RunLogger {
    run_id: String,
    entries: Arc<Mutex<Vec<RunLog>>>,
    sink: Option<Arc<dyn LogSink>>,
}

impl RunLogger {
    pub fn new(run_id: &str) -> Self {
        RunLogger {
            run_id: run_id.to_string(),
            entries: Arc::new(Mutex::new(Vec::new())),
            sink: None,
        }
    }

    pub fn with_sink(run_id: &str, sink: Arc<dyn LogSink>) -> Self {
        RunLogger {
            run_id: run_id.to_string(),
            entries: Arc::new(Mutex::new(Vec::new())),
            sink: Some(sink),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log(&self, stage: &str, level: LogLevel, message: &str) {
        self.log_with(stage, level, message, None);
    }

    pub fn log_with(&self, stage: &str, level: LogLevel, message: &str, metadata: Option<Value>) {
        let entry = RunLog {
            epoch: std::time::UNIX_EPOCH.elapsed().map(|d| d.as_millis()).unwrap_or(0),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            run_id: self.run_id.clone(),
            stage: stage.to_string(),
            level,
            message: message.to_string(),
            metadata,
        };
        ::log::log!(
            level.to_facade(),
            "[{}] {}: {}",
            self.run_id,
            stage,
            message
        );
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.append(&entry) {
                ::log::debug!("[{}] log sink failed: {}", self.run_id, e);
            }
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    pub fn debug(&self, stage: &str, message: &str) {
        self.log(stage, LogLevel::Debug, message);
    }

    pub fn info(&self, stage: &str, message: &str) {
        self.log(stage, LogLevel::Info, message);
    }

    pub fn warn(&self, stage: &str, message: &str) {
        self.log(stage, LogLevel::Warn, message);
    }

    pub fn error(&self, stage: &str, message: &str) {
        self.log(stage, LogLevel::Error, message);
    }

    /// Snapshot of all entries so far, in append order.
    pub fn entries(&self) -> Vec<RunLog> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}
