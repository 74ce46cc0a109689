//! Diagnostic sink management

use clonewire_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// One diagnostic record handed to the sink callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic<'a> {
    pub level: LogLevel,
    /// Log target (module path or explicit target such as `clonewire::bridge`)
    pub target: &'a str,
    pub message: &'a str,
}

/// Callback receiving diagnostics
pub type DiagnosticCallback = Arc<dyn Fn(&Diagnostic<'_>) + Send + Sync>;

/// Global diagnostic sink
static DIAGNOSTIC_SINK: OnceCell<DiagnosticSink> = OnceCell::new();

/// Level-filtered holder for the diagnostic callback
///
/// Swallowed bridge failures end up here when the [`DiagnosticLayer`](crate::DiagnosticLayer)
/// is installed, which is how an embedding application observes them.
pub struct DiagnosticSink {
    callback: RwLock<Option<DiagnosticCallback>>,
    level: AtomicU8,
}

impl DiagnosticSink {
    /// Create a new sink
    pub fn new() -> Self {
        Self {
            callback: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// Get the global sink instance
    pub fn global() -> &'static DiagnosticSink {
        DIAGNOSTIC_SINK.get_or_init(DiagnosticSink::new)
    }

    /// Set or clear the callback
    pub fn set_callback(&self, callback: Option<DiagnosticCallback>) {
        *self.callback.write() = callback;
    }

    pub fn has_callback(&self) -> bool {
        self.callback.read().is_some()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// Check if a log level is enabled
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Invoke the callback if set and level is enabled
    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }

        // Release the lock before running foreign code
        let Some(callback) = self.callback.read().clone() else {
            return;
        };

        callback(&Diagnostic {
            level,
            target,
            message,
        });
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
