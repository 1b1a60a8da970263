//! Leveled diagnostic sink.
//!
//! Decoders never abort on recoverable anomalies (unexpected children,
//! missing structs, count mismatches); they report them here and carry on.
//! The sink is a pure side channel: nothing it does feeds back into control
//! flow.

use std::fmt;

use parking_lot::Mutex;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERR",
        })
    }
}

/// Receiver for decoder diagnostics.
pub trait DiagnosticSink {
    /// Record one formatted message.
    fn log(&self, level: Level, message: fmt::Arguments<'_>);

    fn info(&self, message: fmt::Arguments<'_>) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.log(Level::Error, message);
    }
}

/// Forwards diagnostics to the `tracing` facade under the `rwbs` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        match level {
            Level::Info => tracing::info!(target: "rwbs", "{message}"),
            Level::Warn => tracing::warn!(target: "rwbs", "{message}"),
            Level::Error => tracing::error!(target: "rwbs", "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn log(&self, _level: Level, _message: fmt::Arguments<'_>) {}
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Records every diagnostic for later inspection.
///
/// Useful for strict validation: decode, then reject the result if any
/// `Warn` or `Error` entries were produced.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Drain the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of entries at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.entries.lock().iter().filter(|d| d.level == level).count()
    }

    /// Whether any entry is `Warn` or worse.
    pub fn has_warnings(&self) -> bool {
        self.entries.lock().iter().any(|d| d.level >= Level::Warn)
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|d| d.message.contains(needle))
    }
}

impl DiagnosticSink for CollectingSink {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        self.entries.lock().push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.info(format_args!("hello {}", 1));
        sink.warn(format_args!("Unsupported chunk in {}: {}", "Clump", "Light"));

        assert_eq!(sink.count(Level::Info), 1);
        assert_eq!(sink.count(Level::Warn), 1);
        assert!(sink.has_warnings());
        assert!(sink.contains("Unsupported chunk in Clump"));
        assert_eq!(sink.diagnostics()[0].to_string(), "[INFO] hello 1");

        assert_eq!(sink.take().len(), 2);
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_null_sink_is_silent() {
        NullSink.error(format_args!("ignored"));
    }
}
