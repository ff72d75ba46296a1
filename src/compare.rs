//! Outcome comparison: judges one captured [`Outcome`] against what a case expects.

use crate::case::{ExceptionSpec, ExpectedValue, TestCase};
use crate::invoke::Outcome;
use crate::value::Value;

/// Verdict of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Type-safe expectation derived from a test case.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// The function must raise this exception.
    Raises(ExceptionSpec),
    /// The function must return; listed outputs, if any, must match.
    Returns(Vec<ExpectedValue>),
}

impl Expectation {
    pub fn for_case(case: &TestCase) -> Self {
        match &case.expected_exception {
            Some(spec) => Expectation::Raises(spec.clone()),
            None => Expectation::Returns(case.expected_outputs.clone()),
        }
    }

    /// Checks whether `outcome` satisfies this expectation.
    pub fn check(&self, outcome: &Outcome) -> Verdict {
        match (self, outcome) {
            (Expectation::Raises(spec), Outcome::Raised(actual)) => {
                if actual.kind != spec.kind {
                    return Verdict::Fail(format!(
                        "Expected exception: {}, Got: {}",
                        spec.kind, actual.kind
                    ));
                }
                match &spec.message {
                    Some(expected) if *expected != actual.message => Verdict::Fail(format!(
                        "Expected exception message: '{}', Got: '{}'",
                        expected, actual.message
                    )),
                    _ => Verdict::Pass,
                }
            }
            (Expectation::Raises(spec), Outcome::Returned(value)) => Verdict::Fail(format!(
                "Expected exception: {}, but no exception was raised (returned {})",
                spec.kind, value
            )),
            (Expectation::Returns(_), Outcome::Raised(actual)) => Verdict::Fail(format!(
                "Unexpected exception {}: '{}'; declare `exception` and `exception_message` if this is intended",
                actual.kind, actual.message
            )),
            (Expectation::Returns(expected), Outcome::Returned(value)) => {
                match check_outputs(expected, value) {
                    Ok(()) => Verdict::Pass,
                    Err(message) => Verdict::Fail(message),
                }
            }
        }
    }
}

/// Matches a returned value against the expected outputs.
///
/// Maps are matched by output name, lists positionally when several outputs are
/// expected, and anything else against a single expected output.
fn check_outputs(expected: &[ExpectedValue], actual: &Value) -> Result<(), String> {
    if expected.is_empty() {
        return Ok(());
    }
    match actual {
        Value::Map(fields) => expected.iter().try_for_each(|e| match fields.get(&e.name) {
            Some(value) => check_value(e, value),
            None => Err(format!("Missing output '{}' in returned {}", e.name, actual)),
        }),
        Value::List(items) if expected.len() > 1 => {
            if items.len() != expected.len() {
                return Err(format!(
                    "Expected {} outputs, but the function returned {}",
                    expected.len(),
                    items.len()
                ));
            }
            expected
                .iter()
                .zip(items)
                .try_for_each(|(e, value)| check_value(e, value))
        }
        _ if expected.len() == 1 => check_value(&expected[0], actual),
        _ => Err(format!(
            "Expected {} outputs, but the function returned a single value {}",
            expected.len(),
            actual
        )),
    }
}

fn check_value(expected: &ExpectedValue, actual: &Value) -> Result<(), String> {
    match expected.ty.coerce(actual) {
        Some(value) if value == expected.value => Ok(()),
        Some(value) => Err(format!(
            "Output '{}': expected {}, got {}",
            expected.name, expected.value, value
        )),
        None => Err(format!(
            "Output '{}': expected {} of type {}, got {} of type {}",
            expected.name,
            expected.value,
            expected.ty,
            actual,
            actual.type_name()
        )),
    }
}
