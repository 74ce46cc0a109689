#![allow(non_snake_case)]

use super::*;
use clonewire_core::{AppObject, ErrorValue};
use clonewire_core::host::structured_clone;
use std::time::Duration;

#[derive(Debug, PartialEq)]
struct Version(String);

impl AppObject for Version {
    fn type_tag(&self) -> Option<&str> {
        Some(Self::TYPE_TAG)
    }

    fn to_payload(&self) -> Option<Value> {
        Some(Value::from(self.0.as_str()))
    }

    fn eq_object(&self, other: &dyn AppObject) -> bool {
        other.downcast_ref::<Version>() == Some(self)
    }
}

impl Reconstruct for Version {
    const TYPE_TAG: &'static str = "Version";

    fn reconstruct(payload: Value) -> CodecResult<Self> {
        Ok(Version(payload.deserialize_into()?))
    }
}

fn round_trip(codec: &Codec, value: &Value) -> Value {
    let encoded = codec.encode(value).unwrap();
    let cloned = structured_clone(&encoded.data, &encoded.transferables).unwrap();
    codec.decode(cloned).unwrap()
}

#[test]
fn Codec___new___has_empty_private_registry() {
    let codec = Codec::new();

    assert!(codec.registry().is_empty());
    assert!(!Arc::ptr_eq(codec.registry(), &Registry::global()));
}

#[test]
fn Codec___global___shares_global_registry() {
    let codec = Codec::global();

    assert!(Arc::ptr_eq(codec.registry(), &Registry::global()));
}

#[test]
fn Codec___builder___shares_given_registry() {
    let registry = Arc::new(Registry::new());
    let first = Codec::builder().registry(registry.clone()).build();
    let second = Codec::builder().registry(registry).build();

    first.register::<Version>().unwrap();

    assert!(second.registry().contains("Version"));
}

#[test]
fn Codec___builder___keeps_config() {
    let config = CodecConfig::new().with_call_timeout(Duration::from_millis(250));

    let codec = Codec::builder().config(config.clone()).build();

    assert_eq!(codec.config(), &config);
}

#[test]
fn Codec___runtime___unavailable_outside_tokio() {
    let codec = Codec::new();

    assert_eq!(codec.runtime().err(), Some(CodecError::RuntimeUnavailable));
}

#[test]
fn Codec___runtime___prefers_configured_handle() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let codec = Codec::builder().runtime(runtime.handle().clone()).build();

    assert!(codec.runtime().is_ok());
}

#[test]
fn Codec___round_trip___custom_type_after_registration() {
    let codec = Codec::new();
    codec.register::<Version>().unwrap();
    let value = Value::Custom(Arc::new(Version("1.4.2".into())));

    let decoded = round_trip(&codec, &value);

    assert_eq!(decoded, value);
}

#[test]
fn Codec___decode___unregistered_custom_type_fails() {
    let sender = Codec::new();
    sender.register::<Version>().unwrap();
    let receiver = Codec::new();
    let encoded = sender
        .encode(&Value::Custom(Arc::new(Version("2".into()))))
        .unwrap();

    let result = receiver.decode(encoded.data);

    assert_eq!(result, Err(CodecError::UnknownType("Version".into())));
}

#[test]
fn Codec___round_trip___error_name_survives_host_clone() {
    let codec = Codec::new();
    let err = ErrorValue::new("ConflictError", "stale write")
        .with_stack("at save")
        .with_cause(ErrorValue::new("LockError", "held"));

    let decoded = round_trip(&codec, &Value::from(err.clone()));

    assert_eq!(decoded, Value::from(err));
}

#[test]
fn Codec___round_trip___nested_undefined_in_object() {
    let codec = Codec::new();
    let value = Value::object([("missing", Value::Undefined)]);

    let decoded = round_trip(&codec, &value);

    assert_eq!(decoded, value);
}

#[test]
fn Codec___debug___summarizes() {
    let codec = Codec::new();

    let debug = format!("{codec:?}");

    assert!(debug.contains("Codec"));
    assert!(debug.contains("types: 0"));
}

#[tokio::test]
async fn Codec___builder_runtime___serves_bridges_there() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let codec = Codec::builder().runtime(runtime.handle().clone()).build();
    let function = clonewire_core::Function::sync(|_| Ok(Value::from("served")));

    let decoded = round_trip(&codec, &Value::Function(function));
    let result = decoded.as_function().unwrap().call(vec![]).await;

    assert_eq!(result, Ok(Value::from("served")));
    runtime.shutdown_background();
}
