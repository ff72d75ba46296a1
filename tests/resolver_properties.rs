// Properties of parameter resolution over many seeded iterations.

use regex::Regex;
use serde_json::json;

use veritas::case::ParameterDescriptor;
use veritas::generate::Generator;
use veritas::resolve::{resolve, ParameterSpec};
use veritas::{ConfigError, Value};

fn spec(value: serde_json::Value) -> ParameterSpec {
    let descriptor: ParameterDescriptor = serde_json::from_value(value).unwrap();
    ParameterSpec::from_descriptor("property", 0, &descriptor).unwrap()
}

fn spec_err(value: serde_json::Value) -> ConfigError {
    let descriptor: ParameterDescriptor = serde_json::from_value(value).unwrap();
    ParameterSpec::from_descriptor("property", 0, &descriptor).unwrap_err()
}

#[test]
fn explicit_values_never_change() {
    let s = spec(json!({"name": "x", "type": "float", "value": 2.5}));
    let mut generator = Generator::from_seed(3);
    for _ in 0..500 {
        assert_eq!(resolve(&s, &mut generator), Value::Float(2.5));
    }
}

#[test]
fn int_ranges_are_inclusive() {
    let s = spec(json!({"name": "n", "type": "int", "range": {"min": -3, "max": 3}}));
    let mut generator = Generator::from_seed(11);
    let mut seen_min = false;
    let mut seen_max = false;
    for _ in 0..2000 {
        let n = resolve(&s, &mut generator).as_int().unwrap();
        assert!((-3..=3).contains(&n));
        seen_min |= n == -3;
        seen_max |= n == 3;
    }
    assert!(seen_min && seen_max);
}

#[test]
fn degenerate_ranges_yield_their_only_value() {
    let s = spec(json!({"name": "n", "type": "int", "range": {"min": 7, "max": 7}}));
    let f = spec(json!({"name": "f", "type": "float", "range": {"min": 1.5, "max": 1.5}}));
    let mut generator = Generator::from_seed(0);
    for _ in 0..50 {
        assert_eq!(resolve(&s, &mut generator), Value::Int(7));
        assert_eq!(resolve(&f, &mut generator), Value::Float(1.5));
    }
}

#[test]
fn float_ranges_hold_for_wide_spans() {
    let s = spec(json!({"name": "f", "type": "float", "range": {"min": -1e300, "max": 1e300}}));
    let mut generator = Generator::from_seed(5);
    for _ in 0..1000 {
        let v = resolve(&s, &mut generator).as_float().unwrap();
        assert!((-1e300..=1e300).contains(&v));
    }
}

#[test]
fn patterns_are_fully_matched() {
    let patterns = [
        r"^[A-Z][a-z]{2,5}$",
        r"^\d{3}-\d{4}$",
        r"^(red|green|blue)$",
        r"^[a-z]+@[a-z]+\.(com|org)$",
    ];
    let mut generator = Generator::from_seed(99);
    for pattern in patterns {
        let s = spec(json!({"name": "s", "type": "string", "regular_expression": pattern}));
        let re = Regex::new(&format!("^(?:{pattern})$")).unwrap();
        for _ in 0..200 {
            let value = resolve(&s, &mut generator);
            let text = value.as_str().unwrap();
            assert!(re.is_match(text), "{text:?} does not match {pattern}");
        }
    }
}

#[test]
fn unconstrained_values_have_the_declared_type() {
    let mut generator = Generator::from_seed(17);
    for (ty, name) in [("int", "int"), ("float", "float"), ("string", "string"), ("bool", "bool")] {
        let s = spec(json!({"name": "v", "type": ty}));
        for _ in 0..100 {
            assert_eq!(resolve(&s, &mut generator).type_name(), name);
        }
    }
}

#[test]
fn same_seed_same_values() {
    let s = spec(json!({"name": "s", "type": "string", "regular_expression": "^[a-f0-9]{8}$"}));
    let mut a = Generator::from_seed(123);
    let mut b = Generator::from_seed(123);
    for _ in 0..20 {
        assert_eq!(resolve(&s, &mut a), resolve(&s, &mut b));
    }
}

#[test]
fn invalid_sources_are_configuration_errors() {
    assert!(matches!(
        spec_err(json!({"name": "s", "type": "string", "regular_expression": "([0-9]"})),
        ConfigError::InvalidPattern { .. }
    ));
    assert!(matches!(
        spec_err(json!({"name": "n", "type": "int", "range": {"min": 10, "max": 1}})),
        ConfigError::InvalidRange { .. }
    ));
    assert!(matches!(
        spec_err(json!({"name": "n", "type": "int", "value": "ten"})),
        ConfigError::ValueTypeMismatch { .. }
    ));
    assert!(matches!(
        spec_err(json!({"name": "n", "type": "complex"})),
        ConfigError::UnknownType { .. }
    ));
}
