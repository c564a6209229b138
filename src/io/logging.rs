//! Logging sinks the process runner reports to.
use std::sync::{Arc, Mutex};

use tracing::Level;

const MEMORY_SINK_CAPACITY: usize = 1000;

/// Leveled logging capability injected into [`crate::Html2Pdf`].
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn debug(&self, message: &str) {
        (**self).debug(message);
    }
}

/// Forwards records to `tracing` under the `html2pdf::process` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "html2pdf::process", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "html2pdf::process", "{}", message);
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, message: String) -> Self {
        let timestamp = chrono::Utc::now().format("%H:%M:%S").to_string();
        Self {
            level,
            timestamp,
            message,
        }
    }
}

/// Bounded in-memory sink. Clones share one buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.buffer.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.push(LogEntry::new(level, message.to_string()));
            if buf.len() > MEMORY_SINK_CAPACITY {
                buf.remove(0);
            }
        }
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::DEBUG, message);
    }
}
