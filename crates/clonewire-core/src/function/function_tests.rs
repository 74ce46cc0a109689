#![allow(non_snake_case)]

use super::*;

#[tokio::test]
async fn Function___new___invokes_async_closure() {
    let add = Function::new(|args: Vec<Value>| async move {
        let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
        Ok(Value::Number(sum))
    });

    let result = add.call(vec![Value::from(2), Value::from(3)]).await;

    assert_eq!(result, Ok(Value::Number(5.0)));
}

#[tokio::test]
async fn Function___sync___propagates_thrown_value() {
    let fail = Function::sync(|_| Err(ErrorValue::new("RangeError", "too big").into()));

    let result = fail.call(vec![]).await;

    let thrown = result.unwrap_err();
    assert_eq!(thrown.as_error().unwrap().name, "RangeError");
}

#[tokio::test]
async fn Function___call_timeout___rejects_when_deadline_passes() {
    let slow = Function::new(|_| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Value::Undefined)
    });

    let result = slow.call_timeout(vec![], Duration::from_millis(10)).await;

    let thrown = result.unwrap_err();
    assert_eq!(thrown.as_error().unwrap().name, "TimeoutError");
}

#[tokio::test]
async fn Function___call_timeout___returns_value_within_deadline() {
    let quick = Function::sync(|_| Ok(Value::from("done")));

    let result = quick.call_timeout(vec![], Duration::from_secs(1)).await;

    assert_eq!(result, Ok(Value::from("done")));
}

#[test]
fn Function___eq___is_identity() {
    let a = Function::sync(|_| Ok(Value::Null));
    let b = Function::sync(|_| Ok(Value::Null));

    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}
