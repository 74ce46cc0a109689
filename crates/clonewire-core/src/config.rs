//! Codec configuration types

use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the codec, its function bridges and logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deadline for remote calls in milliseconds
    ///
    /// `None` leaves a call pending until its peer replies, however long that takes.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            call_timeout_ms: None,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the remote call deadline
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Remote call deadline, if any
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Parsed log level; unrecognized names fall back to `Info`
    pub fn level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }
}
