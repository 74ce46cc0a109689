//! # clonewire
//!
//! Extends a host's deep-clone-with-transfer step so that an object graph sent
//! over a channel can carry values the clone alone cannot:
//! - `undefined`, keyed collections (`Map`) and unique collections (`Set`)
//! - application types, rebuilt on the receiving side through a registry
//! - error names outside the standard set
//! - functions, which arrive as proxies that call back over a private channel
//!
//! ## Sending a value
//!
//! ```ignore
//! use clonewire::prelude::*;
//!
//! let (tx, rx) = Port::pair();
//!
//! let value = Value::object([
//!     ("tags", Value::set([Value::from("a"), Value::from("b")])),
//!     ("double", Value::Function(Function::sync(|args| {
//!         Ok(Value::from(args[0].as_f64().unwrap_or_default() * 2.0))
//!     }))),
//! ]);
//!
//! let encoded = clonewire::encode(&value)?;
//! encoded.post(&tx)?;
//!
//! let received = clonewire::decode(rx.recv().await.unwrap_or_default())?;
//! let double = received.get("double").and_then(Value::as_function).unwrap();
//! assert_eq!(double.call(vec![Value::from(21)]).await, Ok(Value::from(42)));
//! ```
//!
//! ## Custom types
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Point { x: f64, y: f64 }
//!
//! impl AppObject for Point {
//!     fn type_tag(&self) -> Option<&str> { Some(Self::TYPE_TAG) }
//!     fn to_payload(&self) -> Option<Value> {
//!         Some(Value::Array(vec![Value::from(self.x), Value::from(self.y)]))
//!     }
//! }
//!
//! impl Reconstruct for Point {
//!     const TYPE_TAG: &'static str = "Point";
//!     fn reconstruct(payload: Value) -> CodecResult<Self> {
//!         let [x, y]: [f64; 2] = payload.deserialize_into()?;
//!         Ok(Point { x, y })
//!     }
//! }
//!
//! // On every receiving side, before the first message arrives
//! clonewire::register::<Point>()?;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`clonewire_core`] - Value model, handles, ports and the host clone
//! - [`clonewire_codec`] - Encoder, decoder, registry and function bridge
//! - [`clonewire_logging`] - Diagnostic sink and tracing layer

// Re-export core types
pub use clonewire_core::{
    AppObject, Blob, Buffer, BufferView, CallResult, Callable, CodecConfig, CodecError,
    CodecResult, ErrorValue, Function, LogLevel, Port, Reconstruct, Stream, Transferable, Value,
    host,
};

// Re-export codec types
pub use clonewire_codec::{
    Codec, CodecBuilder, Encoded, Escaped, Kind, ReconstructFn, Registry, SENTINEL,
};

// Re-export logging
pub use clonewire_logging::{
    Diagnostic, DiagnosticCallback, DiagnosticLayer, DiagnosticSink, init_logging,
};

// Re-export common dependencies that codec users need
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Encode `value` with the process-wide codec
///
/// Pass `data` to the host clone (for example [`Port::post`]) together with
/// `transferables`. Functions inside `value` need a running tokio runtime.
pub fn encode(value: &Value) -> CodecResult<Encoded> {
    Codec::global().encode(value)
}

/// Decode a received value with the process-wide codec
///
/// Fails with [`CodecError::UnknownType`] if a custom type was never registered.
pub fn decode(data: Value) -> CodecResult<Value> {
    Codec::global().decode(data)
}

/// Register a custom type with the process-wide registry
pub fn register<T: Reconstruct>() -> CodecResult<()> {
    Registry::global().register::<T>()
}

/// Prelude module for convenient imports.
///
/// Use `use clonewire::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        AppObject, Blob, Buffer, BufferView, CallResult, Callable, Codec, CodecConfig,
        CodecError, CodecResult, Encoded, ErrorValue, Function, Port, Reconstruct, Registry,
        Stream, Transferable, Value, async_trait,
    };

    // Serde derives for payload types
    pub use serde::{Deserialize, Serialize};
}
