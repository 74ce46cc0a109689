//! clonewire-core - Value model, handles and channel ports
//!
//! This crate provides the foundational types the codec operates on:
//! - [`Value`] tree model with [`ErrorValue`], [`AppObject`] and [`Reconstruct`]
//! - Host-native handles: [`Buffer`], [`BufferView`], [`Blob`], [`Stream`], [`Port`]
//! - [`Function`] values backed by the [`Callable`] trait
//! - [`host::structured_clone`], the host deep-copy-with-transfer primitive
//! - [`CodecError`] and [`CodecConfig`]

mod config;
mod error;
mod function;
mod handle;
pub mod host;
mod port;
mod value;

pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
pub use function::{CallResult, Callable, Function};
pub use handle::{Blob, Buffer, BufferView, Stream, Transferable};
pub use port::Port;
pub use value::{AppObject, ErrorValue, Reconstruct, Value};

/// Log levels for diagnostics
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }

    /// Parse a case-insensitive level name
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "off" => Some(LogLevel::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppObject, Blob, Buffer, BufferView, CallResult, Callable, CodecConfig, CodecError,
        CodecResult, ErrorValue, Function, LogLevel, Port, Reconstruct, Stream, Transferable,
        Value,
    };
}

#[cfg(test)]
mod lib_tests;
