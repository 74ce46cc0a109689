//! Codec handle tying the registry, configuration and runtime together

use crate::decoder::Decoder;
use crate::encoder::{Encoded, Encoder, Escaped};
use crate::registry::Registry;
use clonewire_core::{CodecConfig, CodecError, CodecResult, Reconstruct, Value};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Process-wide codec backed by the global registry
static GLOBAL_CODEC: OnceCell<Codec> = OnceCell::new();

/// Encoder and decoder sharing one registry and configuration
///
/// Cloning is cheap; clones share everything. Proxies decoded by a codec keep a
/// clone of it to encode their arguments and decode replies.
///
/// # Example
///
/// ```ignore
/// let codec = Codec::new();
/// let encoded = codec.encode(&Value::set([Value::from(1), Value::from(2)]))?;
/// let decoded = codec.decode(encoded.data)?;
/// ```
#[derive(Clone)]
pub struct Codec {
    inner: Arc<CodecInner>,
}

struct CodecInner {
    registry: Arc<Registry>,
    config: CodecConfig,
    runtime: Option<Handle>,
}

impl Codec {
    /// Codec with a private, empty registry and default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    /// Process-wide codec backed by [`Registry::global`]
    pub fn global() -> Codec {
        GLOBAL_CODEC
            .get_or_init(|| Codec::builder().registry(Registry::global()).build())
            .clone()
    }

    /// Encode a value for the host clone
    ///
    /// Functions inside `value` start serving immediately, on the configured runtime
    /// or the current one.
    pub fn encode(&self, value: &Value) -> CodecResult<Encoded> {
        Encoder::new(self).encode(value)
    }

    /// Run only the escaping walk, leaving `_ref` placeholders in place
    pub fn escape(&self, value: &Value) -> CodecResult<Escaped> {
        Encoder::new(self).escape_only(value)
    }

    /// Decode a value produced by the host clone of encoded data
    pub fn decode(&self, data: Value) -> CodecResult<Value> {
        Decoder::new(self).decode(data)
    }

    /// Register a custom type with this codec's registry
    pub fn register<T: Reconstruct>(&self) -> CodecResult<()> {
        self.inner.registry.register::<T>()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.inner.config
    }

    /// Runtime that function bridges are spawned on
    pub(crate) fn runtime(&self) -> CodecResult<Handle> {
        match &self.inner.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| CodecError::RuntimeUnavailable),
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("types", &self.inner.registry.len())
            .field("config", &self.inner.config)
            .field("runtime", &self.inner.runtime.is_some())
            .finish()
    }
}

/// Builder for [`Codec`]
#[derive(Default)]
pub struct CodecBuilder {
    registry: Option<Arc<Registry>>,
    config: CodecConfig,
    runtime: Option<Handle>,
}

impl CodecBuilder {
    /// Share an existing registry
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn function bridges on this runtime instead of the current one
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Codec {
        Codec {
            inner: Arc::new(CodecInner {
                registry: self.registry.unwrap_or_default(),
                config: self.config,
                runtime: self.runtime,
            }),
        }
    }
}

#[cfg(test)]
#[path = "codec/codec_tests.rs"]
mod codec_tests;
