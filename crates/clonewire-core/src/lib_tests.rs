#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn LogLevel___ordering___trace_less_than_error() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Info < LogLevel::Warn);
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case(0, LogLevel::Trace)]
#[test_case(2, LogLevel::Info)]
#[test_case(4, LogLevel::Error)]
#[test_case(100, LogLevel::Off)]
fn LogLevel___from_u8___maps_value(value: u8, expected: LogLevel) {
    assert_eq!(LogLevel::from_u8(value), expected);
}

#[test_case("debug", Some(LogLevel::Debug))]
#[test_case("WARN", Some(LogLevel::Warn))]
#[test_case(" warning ", Some(LogLevel::Warn))]
#[test_case("off", Some(LogLevel::Off))]
#[test_case("verbose", None)]
fn LogLevel___parse___accepts_level_names(name: &str, expected: Option<LogLevel>) {
    assert_eq!(LogLevel::parse(name), expected);
}

#[test]
fn LogLevel___display___shows_uppercase() {
    assert_eq!(LogLevel::Error.to_string(), "ERROR");
}
