//! Invocation of a function under test.
//!
//! A target receives its resolved [`Arguments`] and either returns a [`Value`] or
//! raises an [`Exception`]. [`invoke`] calls it exactly once and captures whichever
//! happened, including panics, as an [`Outcome`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::registry::TargetFn;
use crate::value::Value;

/// Exception kind recorded when the target panics.
pub const PANIC_KIND: &str = "Panic";

/// Ordered, named arguments for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a required argument.
    pub fn require(&self, name: &str) -> Result<&Value, Exception> {
        self.get(name).ok_or_else(|| {
            Exception::new(
                "TypeError",
                format!("missing required argument: '{}'", name),
            )
        })
    }

    /// A numeric argument as `f64`; integers are widened.
    pub fn float(&self, name: &str) -> Result<f64, Exception> {
        let value = self.require(name)?;
        value
            .as_float()
            .ok_or_else(|| Exception::argument_type(name, "float", value))
    }

    pub fn int(&self, name: &str) -> Result<i64, Exception> {
        let value = self.require(name)?;
        value
            .as_int()
            .ok_or_else(|| Exception::argument_type(name, "int", value))
    }

    pub fn string(&self, name: &str) -> Result<&str, Exception> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| Exception::argument_type(name, "string", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, Exception> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| Exception::argument_type(name, "bool", value))
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An exception raised by a function under test: a kind identifier and a message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Exception {
    pub kind: String,
    pub message: String,
}

impl Exception {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    fn argument_type(name: &str, expected: &str, actual: &Value) -> Self {
        Exception::new(
            "TypeError",
            format!(
                "argument '{}' must be {}, not {}",
                name,
                expected,
                actual.type_name()
            ),
        )
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Exception {}

/// What a single invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Returned(Value),
    Raised(Exception),
}

/// Calls `function` once with `args`. Panics are captured as [`PANIC_KIND`]
/// exceptions; nothing escapes to the caller.
pub fn invoke(function: &TargetFn, args: &Arguments) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| function(args))) {
        Ok(Ok(value)) => Outcome::Returned(value),
        Ok(Err(exception)) => Outcome::Raised(exception),
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Outcome::Raised(Exception::new(PANIC_KIND, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::target_fn;

    fn args(entries: &[(&str, Value)]) -> Arguments {
        let mut args = Arguments::new();
        for (name, value) in entries {
            args.push(*name, value.clone());
        }
        args
    }

    #[test]
    fn captures_return_value() {
        let f = target_fn(|a| Ok(Value::Float(a.float("x")? * 2.0)));
        assert_eq!(
            invoke(&f, &args(&[("x", Value::Int(3))])),
            Outcome::Returned(Value::Float(6.0))
        );
    }

    #[test]
    fn captures_raised_exception() {
        let f = target_fn(|_| Err(Exception::new("ValueError", "bad")));
        assert_eq!(
            invoke(&f, &Arguments::new()),
            Outcome::Raised(Exception::new("ValueError", "bad"))
        );
    }

    #[test]
    fn captures_panics() {
        let f = target_fn(|_| panic!("boom"));
        match invoke(&f, &Arguments::new()) {
            Outcome::Raised(e) => {
                assert_eq!(e.kind, PANIC_KIND);
                assert_eq!(e.message, "boom");
            }
            other => panic!("expected a captured panic, got {other:?}"),
        }
    }

    #[test]
    fn typed_accessors_raise_type_errors() {
        let a = args(&[("s", Value::from("text"))]);
        assert_eq!(a.string("s"), Ok("text"));
        let err = a.float("s").unwrap_err();
        assert_eq!(err.kind, "TypeError");
        assert_eq!(err.message, "argument 's' must be float, not string");
        let err = a.int("missing").unwrap_err();
        assert_eq!(err.message, "missing required argument: 'missing'");
    }

    #[test]
    fn arguments_display_and_serialize_in_order() {
        let a = args(&[("b", Value::Int(1)), ("a", Value::from("x"))]);
        assert_eq!(a.to_string(), "{b: 1, a: \"x\"}");
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"b":1,"a":"x"}"#);
    }
}
