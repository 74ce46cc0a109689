//! Host deep-copy-with-transfer primitive
//!
//! Mirrors what a host runtime does when a message crosses contexts: plain data,
//! collections and errors are deep-copied, transferred buffers are moved out of
//! the sender, transferred ports and streams change owner, and anything the host
//! cannot represent is rejected. Error names outside the standard set are reset to
//! `Error`, which is the loss the codec's `_err` tag repairs.

use crate::{Buffer, CodecError, CodecResult, ErrorValue, Transferable, Value};
use std::collections::HashMap;

/// Error names that survive a host clone
pub const STANDARD_ERROR_NAMES: &[&str] = &[
    "Error",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
];

/// Deep-copy `value`, moving every handle listed in `transfer`
pub fn structured_clone(value: &Value, transfer: &[Transferable]) -> CodecResult<Value> {
    let mut cloner = Cloner {
        transfer,
        buffers: HashMap::new(),
    };
    let cloned = cloner.clone_value(value)?;

    // Listed buffers are detached even when the graph never references them
    for item in transfer {
        if let Transferable::Buffer(buffer) = item {
            if !cloner.buffers.contains_key(&buffer.id()) && !buffer.is_detached() {
                buffer.detach();
            }
        }
    }
    Ok(cloned)
}

struct Cloner<'a> {
    transfer: &'a [Transferable],
    /// Source buffer id to its copy, so aliases stay aliases
    buffers: HashMap<u64, Buffer>,
}

impl Cloner<'_> {
    fn is_transferred(&self, handle: &Transferable) -> bool {
        self.transfer.iter().any(|t| t.same_handle(handle))
    }

    fn clone_buffer(&mut self, buffer: &Buffer) -> CodecResult<Buffer> {
        if let Some(copy) = self.buffers.get(&buffer.id()) {
            return Ok(copy.clone());
        }
        if buffer.is_detached() {
            return Err(CodecError::DataClone("buffer is detached".to_string()));
        }

        let copy = if self.is_transferred(&Transferable::Buffer(buffer.clone())) {
            Buffer::new(buffer.detach())
        } else {
            Buffer::new(buffer.to_vec())
        };
        self.buffers.insert(buffer.id(), copy.clone());
        Ok(copy)
    }

    fn clone_error(&mut self, err: &ErrorValue) -> CodecResult<ErrorValue> {
        let name = if STANDARD_ERROR_NAMES.contains(&err.name.as_str()) {
            err.name.clone()
        } else {
            "Error".to_string()
        };
        let cause = match &err.cause {
            Some(cause) => Some(self.clone_value(cause)?),
            None => None,
        };
        Ok(ErrorValue {
            name,
            message: err.message.clone(),
            stack: err.stack.clone(),
            cause,
        })
    }

    fn clone_value(&mut self, value: &Value) -> CodecResult<Value> {
        Ok(match value {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Blob(_) => value.clone(),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.clone_value(item))
                    .collect::<CodecResult<_>>()?,
            ),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.clone_value(v)?)))
                    .collect::<CodecResult<_>>()?,
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((self.clone_value(k)?, self.clone_value(v)?)))
                    .collect::<CodecResult<_>>()?,
            ),
            Value::Set(items) => Value::Set(
                items
                    .iter()
                    .map(|item| self.clone_value(item))
                    .collect::<CodecResult<_>>()?,
            ),
            Value::Error(err) => Value::Error(Box::new(self.clone_error(err)?)),
            Value::Buffer(buffer) => Value::Buffer(self.clone_buffer(buffer)?),
            Value::View(view) => Value::View(view.rebase(self.clone_buffer(view.buffer())?)),
            Value::Stream(stream) => {
                if !self.is_transferred(&Transferable::Stream(stream.clone())) {
                    return Err(CodecError::DataClone(
                        "stream must be transferred".to_string(),
                    ));
                }
                Value::Stream(stream.clone())
            }
            Value::Port(port) => {
                if !self.is_transferred(&Transferable::Port(port.clone())) {
                    return Err(CodecError::DataClone("port must be transferred".to_string()));
                }
                Value::Port(port.clone())
            }
            Value::Function(_) => {
                return Err(CodecError::DataClone(
                    "function could not be cloned".to_string(),
                ));
            }
            Value::Custom(obj) => {
                return Err(CodecError::DataClone(format!(
                    "{:?} could not be cloned",
                    obj
                )));
            }
        })
    }
}
