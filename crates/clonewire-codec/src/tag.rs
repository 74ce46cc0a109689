//! Tagged array wire form
//!
//! A tagged array is `["_", kind, ...payload]`. Any user array that happens to
//! start with the sentinel is itself escaped with the `_` kind, so a leading
//! sentinel on the wire always means "codec output".

use clonewire_core::Value;

/// First element of every tagged array
pub const SENTINEL: &str = "_";

/// Kind discriminator, the second element of a tagged array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Escaped literal array, or undefined when there is no payload
    Escaped,
    Map,
    Set,
    /// Index into the verbatim table
    Ref,
    /// Error with its original name
    Err,
    /// Function proxy endpoint
    Fn,
    /// Application-defined type
    Custom,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Escaped => "_",
            Kind::Map => "Map",
            Kind::Set => "Set",
            Kind::Ref => "_ref",
            Kind::Err => "_err",
            Kind::Fn => "_fn",
            Kind::Custom => "_custom",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "_" => Some(Kind::Escaped),
            "Map" => Some(Kind::Map),
            "Set" => Some(Kind::Set),
            "_ref" => Some(Kind::Ref),
            "_err" => Some(Kind::Err),
            "_fn" => Some(Kind::Fn),
            "_custom" => Some(Kind::Custom),
            _ => None,
        }
    }
}

/// Build `["_", kind, ...payload]`
pub(crate) fn tagged(kind: Kind, payload: impl IntoIterator<Item = Value>) -> Value {
    let mut items = vec![Value::from(SENTINEL), Value::from(kind.as_str())];
    items.extend(payload);
    Value::Array(items)
}

/// Build `["_", "_ref", pos]`
pub(crate) fn reference(pos: usize) -> Value {
    tagged(Kind::Ref, [Value::Number(pos as f64)])
}

pub(crate) fn starts_with_sentinel<'a>(mut items: impl Iterator<Item = &'a Value>) -> bool {
    matches!(items.next(), Some(Value::String(s)) if s == SENTINEL)
}

/// Kind of a tagged array, if `items` is one
pub(crate) fn kind_of(items: &[Value]) -> Option<Kind> {
    if items.len() < 2 || !starts_with_sentinel(items.iter()) {
        return None;
    }
    items[1].as_str().and_then(Kind::parse)
}

/// Verbatim index carried by a `_ref` array
pub(crate) fn ref_index(items: &[Value]) -> Option<usize> {
    if items.len() != 3 || kind_of(items) != Some(Kind::Ref) {
        return None;
    }
    index_of(&items[2])
}

pub(crate) fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        _ => None,
    }
}
