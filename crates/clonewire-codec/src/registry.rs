//! Custom-type registry

use clonewire_core::{CodecError, CodecResult, Reconstruct, Value};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Reconstruct hook stored per type tag
pub type ReconstructFn = Arc<dyn Fn(Value) -> CodecResult<Value> + Send + Sync>;

/// Process-wide default registry
static GLOBAL_REGISTRY: OnceCell<Arc<Registry>> = OnceCell::new();

/// Maps type tags to reconstruct hooks
///
/// The receiving side fills this in before decoding any message that uses a tag.
/// Nothing is ever removed automatically.
pub struct Registry {
    entries: DashMap<String, ReconstructFn>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get the process-wide registry used by the global codec
    pub fn global() -> Arc<Registry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Registry::new()))
            .clone()
    }

    /// Register a type through its static reconstruct hook
    pub fn register<T: Reconstruct>(&self) -> CodecResult<()> {
        self.register_fn(T::TYPE_TAG, |payload| {
            Ok(Value::Custom(Arc::new(T::reconstruct(payload)?)))
        })
    }

    /// Register a reconstruct closure for `tag`
    ///
    /// Re-registering a tag replaces the earlier entry.
    pub fn register_fn<F>(&self, tag: impl Into<String>, reconstruct: F) -> CodecResult<()>
    where
        F: Fn(Value) -> CodecResult<Value> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(CodecError::InvalidRegistration(
                "type tag must be a non-empty string".to_string(),
            ));
        }

        if self.entries.insert(tag.clone(), Arc::new(reconstruct)).is_some() {
            tracing::debug!(tag = %tag, "replaced custom type registration");
        } else {
            tracing::debug!(tag = %tag, "registered custom type");
        }
        Ok(())
    }

    /// Rebuild an instance from its payload
    pub fn reconstruct(&self, tag: &str, payload: Value) -> CodecResult<Value> {
        // Clone the hook out so no shard lock is held while user code runs
        let hook = self
            .entries
            .get(tag)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CodecError::UnknownType(tag.to_string()))?;
        hook(payload)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        tags.sort();
        tags
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
