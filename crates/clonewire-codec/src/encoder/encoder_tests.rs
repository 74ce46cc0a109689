#![allow(non_snake_case)]

use super::*;
use clonewire_core::{Blob, Buffer, BufferView, Stream};
use test_case::test_case;

fn s(text: &str) -> Value {
    Value::from(text)
}

fn arr(items: Vec<Value>) -> Value {
    Value::Array(items)
}

#[derive(Debug)]
struct Opaque;

impl AppObject for Opaque {}

#[derive(Debug)]
struct Tagged(f64);

impl AppObject for Tagged {
    fn type_tag(&self) -> Option<&str> {
        Some("Tagged")
    }

    fn to_payload(&self) -> Option<Value> {
        Some(Value::Array(vec![Value::Number(self.0), Value::Undefined]))
    }
}

#[test_case(Value::Null)]
#[test_case(Value::Bool(false))]
#[test_case(Value::Number(0.0))]
#[test_case(s(""))]
#[test_case(s("text"))]
fn Encoder___primitives___pass_through(value: Value) {
    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(encoded.data, value);
    assert!(encoded.transferables.is_empty());
}

#[test]
fn Encoder___undefined___becomes_escape_pair() {
    let encoded = Codec::new().encode(&Value::Undefined).unwrap();

    assert_eq!(encoded.data, arr(vec![s("_"), s("_")]));
}

#[test]
fn Encoder___sentinel_led_array___is_re_escaped() {
    let value = arr(vec![s("_"), s("_")]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(encoded.data, arr(vec![s("_"), s("_"), s("_"), s("_")]));
}

#[test]
fn Encoder___nested_sentinel_arrays___escape_at_every_level() {
    let value = arr(vec![s("_"), arr(vec![s("_"), Value::Number(1.0)])]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.data,
        arr(vec![
            s("_"),
            s("_"),
            s("_"),
            arr(vec![s("_"), s("_"), s("_"), Value::Number(1.0)]),
        ])
    );
}

#[test]
fn Encoder___array_not_led_by_sentinel___stays_plain() {
    let value = arr(vec![s("x"), s("_")]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(encoded.data, value);
}

#[test]
fn Encoder___map___tags_entries() {
    let value = Value::map([(s("a"), s("b"))]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.data,
        arr(vec![s("_"), s("Map"), arr(vec![arr(vec![s("a"), s("b")])])])
    );
}

#[test]
fn Encoder___map_entry_with_sentinel_key___is_escaped() {
    let value = Value::map([(s("_"), Value::Undefined)]);

    let encoded = Codec::new().encode(&value).unwrap();

    let entry = arr(vec![s("_"), s("_"), s("_"), arr(vec![s("_"), s("_")])]);
    assert_eq!(encoded.data, arr(vec![s("_"), s("Map"), arr(vec![entry])]));
}

#[test]
fn Encoder___set___tags_values() {
    let value = Value::set([s("123"), Value::object::<&str, _>([])]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.data,
        arr(vec![
            s("_"),
            s("Set"),
            arr(vec![s("123"), Value::object::<&str, _>([])])
        ])
    );
}

#[test]
fn Encoder___object_fields___are_escaped() {
    let value = Value::object([("gone", Value::Undefined), ("kept", Value::Null)]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.data,
        Value::object([("gone", arr(vec![s("_"), s("_")])), ("kept", Value::Null)])
    );
}

#[test]
fn Encoder___buffer___is_transferred_by_reference() {
    let buffer = Buffer::new(vec![1, 2, 3]);

    let encoded = Codec::new().encode(&Value::Buffer(buffer.clone())).unwrap();

    assert_eq!(encoded.data, Value::Buffer(buffer.clone()));
    assert_eq!(encoded.transferables, vec![Transferable::Buffer(buffer)]);
}

#[test]
fn Encoder___view___transfers_owning_buffer() {
    let buffer = Buffer::new(vec![0; 8]);
    let view = BufferView::new(buffer.clone(), 2, 4).unwrap();

    let encoded = Codec::new().encode(&Value::View(view.clone())).unwrap();

    assert_eq!(encoded.data, Value::View(view));
    assert_eq!(encoded.transferables, vec![Transferable::Buffer(buffer)]);
}

#[test]
fn Encoder___repeated_handle___is_transferred_once() {
    let buffer = Buffer::new(vec![9]);
    let value = arr(vec![
        Value::Buffer(buffer.clone()),
        Value::View(BufferView::whole(buffer.clone())),
    ]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(encoded.transferables.len(), 1);
}

#[test]
fn Encoder___port_and_stream___are_transferred() {
    let (port, _peer) = Port::pair();
    let stream = Stream::new();
    let value = arr(vec![Value::Port(port.clone()), Value::Stream(stream.clone())]);

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.transferables,
        vec![Transferable::Port(port), Transferable::Stream(stream)]
    );
}

#[test]
fn Encoder___blob___travels_by_reference_without_transfer() {
    let blob = Blob::new(b"hi".to_vec(), "text/plain");

    let encoded = Codec::new().encode(&Value::Blob(blob.clone())).unwrap();

    assert_eq!(encoded.data, Value::Blob(blob));
    assert!(encoded.transferables.is_empty());
}

#[test]
fn Encoder___error___wraps_with_name() {
    let err = ErrorValue::new("ValidationError", "bad input");

    let encoded = Codec::new().encode(&Value::from(err.clone())).unwrap();

    assert_eq!(
        encoded.data,
        arr(vec![
            s("_"),
            s("_err"),
            Value::from(err),
            s("ValidationError")
        ])
    );
}

#[test]
fn Encoder___error_cause___is_escaped_on_a_copy() {
    let err = ErrorValue::plain("outer").with_cause(Value::Undefined);
    let original = Value::from(err);

    let encoded = Codec::new().encode(&original).unwrap();

    let Value::Array(items) = &encoded.data else {
        panic!("expected tagged array");
    };
    let carried = items[2].as_error().unwrap();
    assert_eq!(carried.cause, Some(arr(vec![s("_"), s("_")])));
    assert_eq!(original.as_error().unwrap().cause, Some(Value::Undefined));
}

#[test]
fn Encoder___error_cause_with_handle___is_resolved() {
    let buffer = Buffer::new(vec![1]);
    let err = ErrorValue::plain("outer").with_cause(Value::Buffer(buffer.clone()));

    let encoded = Codec::new().encode(&Value::from(err)).unwrap();

    let Value::Array(items) = &encoded.data else {
        panic!("expected tagged array");
    };
    let carried = items[2].as_error().unwrap();
    assert_eq!(carried.cause, Some(Value::Buffer(buffer.clone())));
    assert_eq!(encoded.transferables, vec![Transferable::Buffer(buffer)]);
}

#[test]
fn Encoder___custom_with_capabilities___is_tagged() {
    let value = Value::Custom(Arc::new(Tagged(2.5)));

    let encoded = Codec::new().encode(&value).unwrap();

    assert_eq!(
        encoded.data,
        arr(vec![
            s("_"),
            s("_custom"),
            s("Tagged"),
            arr(vec![Value::Number(2.5), arr(vec![s("_"), s("_")])])
        ])
    );
}

#[test]
fn Encoder___custom_without_capabilities___passes_through() {
    let obj: Arc<dyn AppObject> = Arc::new(Opaque);

    let encoded = Codec::new().encode(&Value::Custom(obj.clone())).unwrap();

    assert_eq!(encoded.data, Value::Custom(obj));
}

#[tokio::test]
async fn Encoder___function___adds_one_transferable_and_one_revokable() {
    let function = Function::sync(|_| Ok(Value::Null));

    let encoded = Codec::new().encode(&Value::Function(function)).unwrap();

    assert_eq!(encoded.transferables.len(), 1);
    assert_eq!(encoded.revokables.len(), 1);
    let Value::Array(items) = &encoded.data else {
        panic!("expected tagged array");
    };
    assert_eq!(&items[..2], &[s("_"), s("_fn")]);
    assert!(matches!(&items[2], Value::Port(_)));
}

#[test]
fn Encoder___function_outside_runtime___fails() {
    let function = Function::sync(|_| Ok(Value::Null));

    let result = Codec::new().encode(&Value::Function(function));

    assert_eq!(result.err(), Some(CodecError::RuntimeUnavailable));
}

#[test]
fn Escaped___tree___keeps_placeholders() {
    let buffer = Buffer::new(vec![1]);

    let escaped = Codec::new().escape(&Value::Buffer(buffer.clone())).unwrap();

    assert_eq!(escaped.tree, arr(vec![s("_"), s("_ref"), Value::Number(0.0)]));
    assert_eq!(escaped.verbatim, vec![Value::Buffer(buffer)]);
}

#[test]
fn Escaped___to_json_string___renders_tree() {
    let value = Value::object([("a", Value::Undefined), ("b", Value::set([Value::from(1)]))]);

    let escaped = Codec::new().escape(&value).unwrap();

    assert_eq!(
        escaped.to_json_string().unwrap(),
        r#"{"a":["_","_"],"b":["_","Set",[1]]}"#
    );
}

#[test]
fn Escaped___resolve___out_of_range_reference_fails() {
    let escaped = Escaped {
        tree: arr(vec![s("_"), s("_ref"), Value::Number(3.0)]),
        verbatim: vec![],
    };

    assert_eq!(escaped.resolve(), Err(CodecError::InvalidReference(3)));
}
