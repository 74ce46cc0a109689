//! Encoding side: escape a value graph into tagged arrays
//!
//! Encoding is two walks. The escape walk is pre-order: it rewrites every value the
//! text form cannot carry into a tagged array and moves handles into the verbatim
//! table, leaving `_ref` placeholders behind. The resolve walk then swaps every
//! placeholder for the handle it stands for, so the host clone sees the real
//! buffer, port or error while everything else stays in tagged form.

use crate::Codec;
use crate::bridge;
use crate::tag::{Kind, reference, ref_index, starts_with_sentinel, tagged};
use clonewire_core::{
    AppObject, CodecError, CodecResult, ErrorValue, Function, Port, Transferable, Value,
};
use std::sync::Arc;

/// Output of [`Codec::encode`](crate::Codec::encode)
///
/// Pass `data` to [`Port::post`] (or any host clone) together with
/// `transferables`. `revokables` are the serving ends of function bridges; closing
/// one stops the bridge for that function.
#[derive(Debug, Default)]
pub struct Encoded {
    pub data: Value,
    pub transferables: Vec<Transferable>,
    pub revokables: Vec<Port>,
}

impl Encoded {
    /// Send the encoded value over `port`, moving its transferables
    pub fn post(&self, port: &Port) -> CodecResult<()> {
        port.post(self.data.clone(), &self.transferables)
    }
}

/// Escaped tree before placeholder resolution
///
/// `tree` holds only text-representable values (unless it carries application
/// objects with no capabilities) and every handle lives in `verbatim`.
#[derive(Debug, Default)]
pub struct Escaped {
    pub tree: Value,
    pub verbatim: Vec<Value>,
}

impl Escaped {
    /// Render the tree as JSON text
    pub fn to_json_string(&self) -> CodecResult<String> {
        let json = serde_json::Value::try_from(&self.tree)?;
        Ok(serde_json::to_string(&json)?)
    }

    /// Swap every `_ref` placeholder for its verbatim entry
    pub fn resolve(self) -> CodecResult<Value> {
        resolve(self.tree, &self.verbatim)
    }
}

fn resolve(tree: Value, verbatim: &[Value]) -> CodecResult<Value> {
    match tree {
        Value::Array(items) => {
            if let Some(pos) = ref_index(&items) {
                let entry = verbatim
                    .get(pos)
                    .cloned()
                    .ok_or(CodecError::InvalidReference(pos))?;
                return resolve_entry(entry, verbatim);
            }
            Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| resolve(item, verbatim))
                    .collect::<CodecResult<_>>()?,
            ))
        }
        Value::Object(fields) => Ok(Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| Ok((k, resolve(v, verbatim)?)))
                .collect::<CodecResult<_>>()?,
        )),
        other => Ok(other),
    }
}

/// An error's escaped cause is stored inside the verbatim entry itself
fn resolve_entry(entry: Value, verbatim: &[Value]) -> CodecResult<Value> {
    match entry {
        Value::Error(mut err) => {
            if let Some(cause) = err.cause.take() {
                err.cause = Some(resolve(cause, verbatim)?);
            }
            Ok(Value::Error(err))
        }
        other => Ok(other),
    }
}

/// Per-call encoder state
pub(crate) struct Encoder<'a> {
    codec: &'a Codec,
    verbatim: Vec<Value>,
    transferables: Vec<Transferable>,
    revokables: Vec<Port>,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(codec: &'a Codec) -> Self {
        Self {
            codec,
            verbatim: Vec::new(),
            transferables: Vec::new(),
            revokables: Vec::new(),
        }
    }

    /// Run the escape walk and the resolve walk
    pub(crate) fn encode(mut self, value: &Value) -> CodecResult<Encoded> {
        let tree = self.escape(value)?;
        let data = resolve(tree, &self.verbatim)?;
        Ok(Encoded {
            data,
            transferables: self.transferables,
            revokables: self.revokables,
        })
    }

    /// Run only the escape walk
    ///
    /// Functions are still bridged, so their serving ends stay alive for as long
    /// as the remote ends do.
    pub(crate) fn escape_only(mut self, value: &Value) -> CodecResult<Escaped> {
        let tree = self.escape(value)?;
        Ok(Escaped {
            tree,
            verbatim: self.verbatim,
        })
    }

    fn escape(&mut self, value: &Value) -> CodecResult<Value> {
        match value {
            Value::Undefined => Ok(tagged(Kind::Escaped, [])),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Ok(value.clone())
            }
            Value::Array(items) => self.escape_seq(items.iter()),
            Value::Object(fields) => Ok(Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.escape(v)?)))
                    .collect::<CodecResult<_>>()?,
            )),
            Value::Map(entries) => {
                let pairs = entries
                    .iter()
                    .map(|(k, v)| self.escape_seq([k, v].into_iter()))
                    .collect::<CodecResult<Vec<_>>>()?;
                Ok(tagged(Kind::Map, [self.wrap_seq(pairs)]))
            }
            Value::Set(items) => {
                let values = self.escape_seq(items.iter())?;
                Ok(tagged(Kind::Set, [values]))
            }
            Value::Blob(_) => Ok(self.by_reference(value.clone())),
            Value::Error(err) => self.escape_error(err),
            Value::Buffer(buffer) => {
                self.transfer(Transferable::Buffer(buffer.clone()));
                Ok(self.by_reference(value.clone()))
            }
            Value::View(view) => {
                self.transfer(Transferable::Buffer(view.buffer().clone()));
                Ok(self.by_reference(value.clone()))
            }
            Value::Port(port) => {
                self.transfer(Transferable::Port(port.clone()));
                Ok(self.by_reference(value.clone()))
            }
            Value::Stream(stream) => {
                self.transfer(Transferable::Stream(stream.clone()));
                Ok(self.by_reference(value.clone()))
            }
            Value::Function(function) => self.escape_function(function),
            Value::Custom(obj) => self.escape_custom(obj),
        }
    }

    fn escape_seq<'v>(&mut self, items: impl Iterator<Item = &'v Value>) -> CodecResult<Value> {
        let escaped = items
            .map(|item| self.escape(item))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(self.wrap_seq(escaped))
    }

    /// Re-escape a sequence that would otherwise read as a tagged array
    fn wrap_seq(&self, escaped: Vec<Value>) -> Value {
        // Only a literal "_" string escapes to "_", so checking the output is enough
        if starts_with_sentinel(escaped.iter()) {
            tagged(Kind::Escaped, escaped)
        } else {
            Value::Array(escaped)
        }
    }

    fn escape_error(&mut self, err: &ErrorValue) -> CodecResult<Value> {
        // Escape the cause on a private copy; the caller's error is left untouched
        let mut local = err.clone();
        if let Some(cause) = &err.cause {
            local.cause = Some(self.escape(cause)?);
        }
        let name = Value::String(local.name.clone());
        let placeholder = self.by_reference(Value::Error(Box::new(local)));
        Ok(tagged(Kind::Err, [placeholder, name]))
    }

    fn escape_function(&mut self, function: &Function) -> CodecResult<Value> {
        let (local, remote) = Port::pair();
        bridge::serve(self.codec, local.clone(), function.clone())?;
        if !self.revokables.iter().any(|p| p.same_handle(&local)) {
            self.revokables.push(local);
        }
        let endpoint = self.escape(&Value::Port(remote))?;
        Ok(tagged(Kind::Fn, [endpoint]))
    }

    fn escape_custom(&mut self, obj: &Arc<dyn AppObject>) -> CodecResult<Value> {
        match (obj.type_tag(), obj.to_payload()) {
            (Some(tag), Some(payload)) => {
                let tag = Value::from(tag);
                let payload = self.escape(&payload)?;
                Ok(tagged(Kind::Custom, [tag, payload]))
            }
            // Left for the host clone to accept or reject
            _ => Ok(Value::Custom(obj.clone())),
        }
    }

    fn transfer(&mut self, handle: Transferable) {
        if !self.transferables.iter().any(|t| t.same_handle(&handle)) {
            self.transferables.push(handle);
        }
    }

    fn by_reference(&mut self, value: Value) -> Value {
        let pos = self.verbatim.len();
        self.verbatim.push(value);
        reference(pos)
    }
}

#[cfg(test)]
#[path = "encoder/encoder_tests.rs"]
mod encoder_tests;
