// Diagnostics
// Logging collaborator used by the classifier for conditions the caller should
// see (malformed input). Defaults to forwarding into `tracing`.

use std::sync::Mutex;
use tracing::Level;

pub trait DiagnosticSink: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "section_scan::diagnostics", "{}", message),
            Level::WARN => tracing::warn!(target: "section_scan::diagnostics", "{}", message),
            Level::INFO => tracing::info!(target: "section_scan::diagnostics", "{}", message),
            Level::DEBUG => tracing::debug!(target: "section_scan::diagnostics", "{}", message),
            _ => tracing::trace!(target: "section_scan::diagnostics", "{}", message),
        }
    }
}

/// Keeps diagnostics in memory, e.g. to surface them next to a result.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }
}

impl DiagnosticSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_levels() {
        let sink = MemorySink::new();
        sink.log(Level::ERROR, "bad input");
        sink.log(Level::INFO, "ok");
        assert_eq!(sink.count_at(Level::ERROR), 1);
        assert_eq!(sink.entries()[1].1, "ok");
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.log(Level::WARN, "no subscriber installed");
    }
}
