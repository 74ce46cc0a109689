//! clonewire-logging - Diagnostics for clonewire
//!
//! This crate provides:
//! - [`DiagnosticSink`] holding a level-filtered diagnostic callback
//! - [`DiagnosticLayer`] tracing layer that forwards events to the sink
//! - [`init_logging`] to install the layer driven by a [`CodecConfig`](clonewire_core::CodecConfig)

mod layer;
mod sink;

pub use clonewire_core::LogLevel;
pub use layer::{DiagnosticLayer, init_logging};
pub use sink::{Diagnostic, DiagnosticCallback, DiagnosticSink};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Diagnostic, DiagnosticCallback, DiagnosticLayer, DiagnosticSink, LogLevel, init_logging,
    };
}
