#![allow(non_snake_case)]

use super::*;
use serde::Deserialize;

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl AppObject for Point {
    fn type_tag(&self) -> Option<&str> {
        Some("Point")
    }

    fn eq_object(&self, other: &dyn AppObject) -> bool {
        other.downcast_ref::<Point>() == Some(self)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    name: String,
    retries: u32,
}

#[test]
fn Value___map___replaces_repeated_key_in_place() {
    let map = Value::map([
        (Value::from("a"), Value::from(1)),
        (Value::from("b"), Value::from(2)),
        (Value::from("a"), Value::from(3)),
    ]);

    assert_eq!(
        map,
        Value::Map(vec![
            (Value::from("a"), Value::from(3)),
            (Value::from("b"), Value::from(2)),
        ])
    );
}

#[test]
fn Value___set___drops_duplicates_keeping_order() {
    let set = Value::set([Value::from(2), Value::from(1), Value::from(2)]);

    assert_eq!(set, Value::Set(vec![Value::from(2), Value::from(1)]));
}

#[test]
fn Value___set___keeps_distinct_objects_with_equal_contents() {
    let set = Value::set([Value::object::<&str, _>([]), Value::object::<&str, _>([])]);

    assert_eq!(
        set,
        Value::Set(vec![Value::object::<&str, _>([]), Value::object::<&str, _>([])])
    );
}

#[test]
fn Value___set___dedupes_handles_by_identity() {
    let shared = Buffer::new(vec![1]);
    let twin = Buffer::new(vec![1]);

    let set = Value::set([
        Value::Buffer(shared.clone()),
        Value::Buffer(twin),
        Value::Buffer(shared),
    ]);

    let Value::Set(members) = set else {
        panic!("expected set");
    };
    assert_eq!(members.len(), 2);
}

#[test]
fn Value___map___keeps_distinct_array_keys() {
    let map = Value::map([
        (Value::Array(vec![]), Value::from(1)),
        (Value::Array(vec![]), Value::from(2)),
    ]);

    let Value::Map(entries) = map else {
        panic!("expected map");
    };
    assert_eq!(entries.len(), 2);
}

#[test]
fn Value___same_member___matches_primitives_by_value() {
    assert!(Value::from("a").same_member(&Value::from("a")));
    assert!(Value::Number(f64::NAN).same_member(&Value::Number(f64::NAN)));
    assert!(!Value::Undefined.same_member(&Value::Null));
    assert!(!Value::Array(vec![]).same_member(&Value::Array(vec![])));
}

#[test]
fn Value___eq___distinguishes_map_from_array_of_pairs() {
    let map = Value::map([(Value::from("a"), Value::from("b"))]);
    let pairs = Value::Array(vec![Value::Array(vec![Value::from("a"), Value::from("b")])]);

    assert_ne!(map, pairs);
}

#[test]
fn Value___eq___undefined_differs_from_null() {
    assert_ne!(Value::Undefined, Value::Null);
}

#[test]
fn Value___eq___nan_equals_nan() {
    assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
}

#[test]
fn Value___eq___custom_uses_eq_object() {
    let a = Value::Custom(Arc::new(Point { x: 1, y: 2 }));
    let b = Value::Custom(Arc::new(Point { x: 1, y: 2 }));
    let c = Value::Custom(Arc::new(Point { x: 9, y: 2 }));

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn Value___downcast_ref___returns_concrete_object() {
    let value = Value::Custom(Arc::new(Point { x: 3, y: 4 }));

    let point = value.downcast_ref::<Point>().unwrap();

    assert_eq!(point.x, 3);
}

#[test]
fn Value___from_option___none_is_undefined() {
    let value = Value::from(None::<i32>);

    assert!(value.is_undefined());
}

#[test]
fn Value___from_serialize___round_trips_through_deserialize_into() {
    let settings = Settings {
        name: "primary".into(),
        retries: 3,
    };

    let value = Value::from_serialize(&settings).unwrap();
    let back: Settings = value.deserialize_into().unwrap();

    assert_eq!(back, settings);
    assert_eq!(value.get("retries"), Some(&Value::Number(3.0)));
}

#[test]
fn Value___to_json___integral_numbers_have_no_fraction() {
    let value = Value::Array(vec![Value::from(1), Value::Number(1.5)]);

    let json = serde_json::Value::try_from(&value).unwrap();

    assert_eq!(json.to_string(), "[1,1.5]");
}

#[test]
fn Value___to_json___non_finite_becomes_null() {
    let json = serde_json::Value::try_from(&Value::Number(f64::INFINITY)).unwrap();

    assert!(json.is_null());
}

#[test]
fn Value___to_json___rejects_undefined() {
    let result = serde_json::Value::try_from(&Value::Array(vec![Value::Undefined]));

    assert_eq!(result, Err(CodecError::NotTextRepresentable("undefined")));
}

#[test]
fn ErrorValue___display___shows_name_and_message() {
    let err = ErrorValue::new("TypeError", "not a function");

    assert_eq!(err.to_string(), "TypeError: not a function");
}

#[test]
fn ErrorValue___from_codec_error___uses_error_name() {
    let err = ErrorValue::from(CodecError::UnknownType("Point".into()));

    assert_eq!(err.name, "TypeError");
    assert!(err.message.contains("Point"));
}
