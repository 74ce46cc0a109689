//! Decoding side: undo the tagging and rebuild native values
//!
//! Mirrors the encoder with two walks. The escape walk parks every non-plain value
//! (anything the host clone produced that is not an array or a plain object) in a
//! fresh verbatim table, so the revive walk only ever inspects tagged arrays. The
//! revive walk is post-order: children are rebuilt before their parent is untagged.

use crate::Codec;
use crate::bridge;
use crate::tag::{Kind, index_of, kind_of, reference};
use clonewire_core::{CodecError, CodecResult, Value};

/// Per-call decoder state
pub(crate) struct Decoder<'a> {
    codec: &'a Codec,
    verbatim: Vec<Value>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(codec: &'a Codec) -> Self {
        Self {
            codec,
            verbatim: Vec::new(),
        }
    }

    pub(crate) fn decode(mut self, data: Value) -> CodecResult<Value> {
        let tree = self.escape(data);
        self.revive(tree)
    }

    fn escape(&mut self, value: Value) -> Value {
        match value {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_) => value,
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.escape(item)).collect())
            }
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, self.escape(v)))
                    .collect(),
            ),
            other => {
                let pos = self.verbatim.len();
                self.verbatim.push(other);
                reference(pos)
            }
        }
    }

    fn revive(&mut self, value: Value) -> CodecResult<Value> {
        match value {
            Value::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.revive(item))
                    .collect::<CodecResult<Vec<_>>>()?;
                self.untag(items)
            }
            Value::Object(fields) => Ok(Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| Ok((k, self.revive(v)?)))
                    .collect::<CodecResult<_>>()?,
            )),
            other => Ok(other),
        }
    }

    fn untag(&mut self, items: Vec<Value>) -> CodecResult<Value> {
        let Some(kind) = kind_of(&items) else {
            return Ok(Value::Array(items));
        };
        let mut payload = items.into_iter().skip(2);

        match kind {
            Kind::Escaped => {
                let rest: Vec<Value> = payload.collect();
                if rest.is_empty() {
                    Ok(Value::Undefined)
                } else {
                    Ok(Value::Array(rest))
                }
            }
            Kind::Map => match payload.next() {
                Some(Value::Array(entries)) => {
                    let pairs = entries
                        .into_iter()
                        .map(into_pair)
                        .collect::<CodecResult<Vec<_>>>()?;
                    Ok(Value::Map(pairs))
                }
                _ => Err(CodecError::Malformed("Map entries must be an array".into())),
            },
            Kind::Set => match payload.next() {
                Some(Value::Array(values)) => Ok(Value::Set(values)),
                _ => Err(CodecError::Malformed("Set values must be an array".into())),
            },
            Kind::Custom => {
                let tag = match payload.next() {
                    Some(Value::String(tag)) => tag,
                    _ => {
                        return Err(CodecError::Malformed(
                            "custom type tag must be a string".into(),
                        ));
                    }
                };
                let data = payload.next().unwrap_or_default();
                self.codec.registry().reconstruct(&tag, data)
            }
            Kind::Ref => {
                let pos = payload
                    .next()
                    .as_ref()
                    .and_then(index_of)
                    .ok_or_else(|| CodecError::Malformed("reference index".into()))?;
                self.verbatim
                    .get(pos)
                    .cloned()
                    .ok_or(CodecError::InvalidReference(pos))
            }
            Kind::Err => {
                let Some(Value::Error(mut err)) = payload.next() else {
                    return Err(CodecError::Malformed(
                        "error tag must carry an error".into(),
                    ));
                };
                if let Some(Value::String(name)) = payload.next() {
                    if err.name != name {
                        err.name = name;
                    }
                }
                if let Some(cause) = err.cause.take() {
                    err.cause = Some(self.codec.decode(cause)?);
                }
                Ok(Value::Error(err))
            }
            Kind::Fn => match payload.next() {
                Some(Value::Port(endpoint)) => Ok(Value::Function(bridge::proxy(
                    self.codec.clone(),
                    endpoint,
                ))),
                _ => Err(CodecError::Malformed(
                    "function tag must carry a port".into(),
                )),
            },
        }
    }
}

fn into_pair(entry: Value) -> CodecResult<(Value, Value)> {
    match entry {
        Value::Array(pair) if pair.len() == 2 => {
            let mut pair = pair.into_iter();
            let key = pair.next().unwrap_or_default();
            let value = pair.next().unwrap_or_default();
            Ok((key, value))
        }
        _ => Err(CodecError::Malformed(
            "Map entry must be a key/value pair".into(),
        )),
    }
}
