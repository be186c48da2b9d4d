//! Injected logging collaborator for pipeline stages.
//!
//! Stages never log through a process-global directly; they receive a
//! [`StageObserver`] and report row counts, computed bounds, and skip
//! decisions through it. The observer is a pure side channel: it must not
//! influence control flow or output content.

use std::sync::Mutex;

/// Trait for receiving stage-boundary log messages.
///
/// Implementations must be `Send + Sync` so a single observer can serve
/// pipelines running on different threads.
pub trait StageObserver: Send + Sync {
    /// Informational message (row counts, computed bounds).
    fn info(&self, message: &str);

    /// Warning message (skipped stage, missing column).
    fn warn(&self, message: &str);

    /// Error message (dataset aborted).
    fn error(&self, message: &str);
}

/// Observer that forwards everything to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Observer that buffers messages in memory.
///
/// Useful in tests to assert what a stage reported without capturing a
/// subscriber.
#[derive(Debug, Default)]
pub struct BufferedObserver {
    entries: Mutex<Vec<String>>,
}

impl BufferedObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages recorded so far, prefixed with their level.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(&self, level: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("{level}: {message}"));
    }
}

impl StageObserver for BufferedObserver {
    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_observer_records_levels() {
        let observer = BufferedObserver::new();
        observer.info("loaded 10 rows");
        observer.warn("column missing");
        observer.error("aborted");

        let messages = observer.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], "info: loaded 10 rows");
        assert_eq!(messages[1], "warn: column missing");
        assert_eq!(messages[2], "error: aborted");
    }

    #[test]
    fn test_observer_is_object_safe() {
        let observer = BufferedObserver::new();
        let as_dyn: &dyn StageObserver = &observer;
        as_dyn.info("through the trait object");
        assert_eq!(observer.messages().len(), 1);
    }
}
