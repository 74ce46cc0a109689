//! Generic tree value model
//!
//! [`Value`] covers everything a host context can hand to the codec: plain data,
//! keyed and unique collections, errors, host-native handles, functions and
//! application objects.

use crate::{Blob, Buffer, BufferView, CodecError, CodecResult, Function, Port, Stream};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A node of an object graph
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Plain string-keyed object
    Object(BTreeMap<String, Value>),
    /// Keyed collection with arbitrary keys, in insertion order
    Map(Vec<(Value, Value)>),
    /// Unique collection, in insertion order
    Set(Vec<Value>),
    Error(Box<ErrorValue>),
    Buffer(Buffer),
    View(BufferView),
    Blob(Blob),
    Stream(Stream),
    Port(Port),
    Function(Function),
    /// Application-defined object
    Custom(Arc<dyn AppObject>),
}

impl Value {
    /// Build a keyed collection; a repeated key replaces the earlier value in place
    pub fn map<I>(entries: I) -> Value
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (key, value) in entries {
            match out.iter_mut().find(|(k, _)| k.same_member(&key)) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Value::Map(out)
    }

    /// Build a unique collection; members matching an earlier one are dropped
    pub fn set<I>(values: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let mut out: Vec<Value> = Vec::new();
        for value in values {
            if !out.iter().any(|member| member.same_member(&value)) {
                out.push(value);
            }
        }
        Value::Set(out)
    }

    /// Membership test used for set values and map keys
    ///
    /// Primitives match by value (`NaN` matches `NaN`), handles, functions and
    /// application objects by identity. Arrays, objects, collections, errors and
    /// views are distinct objects and never match one another.
    pub fn same_member(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Buffer(a), Value::Buffer(b)) => a.same_handle(b),
            (Value::Blob(a), Value::Blob(b)) => a.same_handle(b),
            (Value::Stream(a), Value::Stream(b)) => a.same_handle(b),
            (Value::Port(a), Value::Port(b)) => a.same_handle(b),
            (Value::Function(a), Value::Function(b)) => a.same_function(b),
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Build a plain object
    pub fn object<K, I>(fields: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert any serializable value through its JSON form
    pub fn from_serialize<T: Serialize>(value: &T) -> CodecResult<Value> {
        Ok(Value::from(serde_json::to_value(value)?))
    }

    /// Deserialize a text-representable value into a typed value
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> CodecResult<T> {
        let json = serde_json::Value::try_from(self)?;
        Ok(serde_json::from_value(json)?)
    }

    /// Short name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Error(_) => "error",
            Value::Buffer(_) => "buffer",
            Value::View(_) => "view",
            Value::Blob(_) => "blob",
            Value::Stream(_) => "stream",
            Value::Port(_) => "port",
            Value::Function(_) => "function",
            Value::Custom(_) => "custom",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Field of a plain object
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Downcast an application object
    pub fn downcast_ref<T: AppObject>(&self) -> Option<&T> {
        match self {
            Value::Custom(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Buffer(a), Value::Buffer(b)) => a == b,
            (Value::View(a), Value::View(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Port(a), Value::Port(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                Arc::ptr_eq(a, b) || a.eq_object(b.as_ref())
            }
            _ => false,
        }
    }
}

/// Error object with a recoverable name and optional cause
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    pub cause: Option<Value>,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    /// Error with the generic `Error` name
    pub fn plain(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Value>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl From<&CodecError> for ErrorValue {
    fn from(err: &CodecError) -> Self {
        ErrorValue::new(err.error_name(), err.to_string())
    }
}

impl From<CodecError> for ErrorValue {
    fn from(err: CodecError) -> Self {
        ErrorValue::from(&err)
    }
}

/// Capability protocol for application-defined objects
///
/// Both capabilities are optional. An object exposing a type tag and a payload
/// is encoded as a custom value; anything else is handed to the host clone as-is,
/// which rejects it.
pub trait AppObject: Any + fmt::Debug + Send + Sync {
    /// String type tag
    fn type_tag(&self) -> Option<&str> {
        None
    }

    /// Serialize hook
    fn to_payload(&self) -> Option<Value> {
        None
    }

    /// Structural equality with another object; identity is checked by the caller
    fn eq_object(&self, _other: &dyn AppObject) -> bool {
        false
    }
}

impl dyn AppObject {
    pub fn downcast_ref<T: AppObject>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

/// Static reconstruct hook paired with [`AppObject`]'s tag and payload
pub trait Reconstruct: AppObject + Sized {
    const TYPE_TAG: &'static str;

    fn reconstruct(payload: Value) -> CodecResult<Self>;
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ErrorValue> for Value {
    fn from(err: ErrorValue) -> Self {
        Value::Error(Box::new(err))
    }
}

impl From<Buffer> for Value {
    fn from(buffer: Buffer) -> Self {
        Value::Buffer(buffer)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::Blob(blob)
    }
}

impl From<Port> for Value {
    fn from(port: Port) -> Self {
        Value::Port(port)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Largest integer a double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl TryFrom<&Value> for serde_json::Value {
    type Error = CodecError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serde_json::Value::from(*n as i64)
                } else {
                    // Non-finite numbers have no JSON form and become null
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), serde_json::Value::try_from(v)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
            other => return Err(CodecError::NotTextRepresentable(other.type_name())),
        })
    }
}

#[cfg(test)]
#[path = "value/value_tests.rs"]
mod value_tests;
