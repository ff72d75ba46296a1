//! Test case descriptors and their validated form.
//!
//! A [`TestCaseDescriptor`] is the raw JSON/YAML shape as authored. Registering it
//! (see [`TestCase::compile`]) checks every field, resolves the function by name,
//! and classifies each input parameter into its authoritative source. A compiled
//! [`TestCase`] is immutable.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::errors::ConfigError;
use crate::registry::{FunctionRegistry, TargetFn};
use crate::resolve::ParameterSpec;
use crate::value::{Value, ValueType};

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// One test case as it appears in a descriptor file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TestCaseDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<Flag>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub output: Vec<OutputDescriptor>,
    #[serde(default)]
    pub iterations: Option<i64>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub exception_message: Option<String>,
    /// Set for contract cases, which validate `data` instead of calling a function.
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub expected_errors: Vec<String>,
}

impl TestCaseDescriptor {
    /// The name a case is reported under: `name`, else `description`, else the
    /// function or contract name.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.description.as_deref())
            .or(self.function_name.as_deref())
            .or(self.contract.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("unnamed test case")
            .to_string()
    }

    pub fn is_contract(&self) -> bool {
        self.contract.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.map_or(true, Flag::is_set)
    }
}

/// `enabled` accepts both `0`/`1` and booleans.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

/// One entry of a descriptor's `input` array.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParameterDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// `Some(Null)` when the key is present with a `null` literal.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub regular_expression: Option<String>,
    #[serde(default)]
    pub range: Option<RangeDescriptor>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RangeDescriptor {
    pub min: serde_json::Number,
    pub max: serde_json::Number,
}

/// One entry of a descriptor's `output` array.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
}

// =============================================================================
// COMPILED TEST CASE
// =============================================================================

/// An expected return component, matched by name (or position).
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedValue {
    pub name: String,
    pub ty: ValueType,
    pub value: Value,
}

/// The exception a case expects its function to raise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionSpec {
    pub kind: String,
    /// `None` matches any message.
    pub message: Option<String>,
}

/// A validated, registered test case.
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    pub description: Option<String>,
    pub function_name: String,
    pub function: TargetFn,
    pub inputs: Vec<ParameterSpec>,
    pub expected_outputs: Vec<ExpectedValue>,
    pub expected_exception: Option<ExceptionSpec>,
    /// Declared iteration count, if positive.
    pub iterations: Option<usize>,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("function_name", &self.function_name)
            .field("inputs", &self.inputs)
            .field("expected_outputs", &self.expected_outputs)
            .field("expected_exception", &self.expected_exception)
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl TestCase {
    /// Validates a descriptor and binds it to a registered function.
    ///
    /// `name` is the (already de-duplicated) name the case is reported under.
    pub fn compile(
        name: String,
        descriptor: &TestCaseDescriptor,
        registry: &FunctionRegistry,
    ) -> Result<TestCase, ConfigError> {
        let function_name = descriptor
            .function_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingFunctionName { case: name.clone() })?
            .to_string();
        let function = registry
            .get(&function_name)
            .ok_or_else(|| ConfigError::UnknownFunction {
                case: name.clone(),
                function: function_name.clone(),
            })?;

        let inputs = compile_inputs(&name, &descriptor.input)?;
        let expected_outputs = descriptor
            .output
            .iter()
            .map(|output| compile_output(&name, output))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TestCase {
            description: descriptor.description.clone(),
            function_name,
            function,
            inputs,
            expected_outputs,
            expected_exception: compile_exception(descriptor),
            iterations: declared_iterations(&name, descriptor.iterations),
            name,
        })
    }
}

fn compile_inputs(
    case: &str,
    inputs: &[ParameterDescriptor],
) -> Result<Vec<ParameterSpec>, ConfigError> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let spec = ParameterSpec::from_descriptor(case, index, input)?;
        if !seen.insert(spec.name.clone()) {
            return Err(ConfigError::DuplicateParameter {
                case: case.to_string(),
                parameter: spec.name,
            });
        }
        specs.push(spec);
    }
    Ok(specs)
}

fn compile_output(case: &str, output: &OutputDescriptor) -> Result<ExpectedValue, ConfigError> {
    let field = format!("output `{}`", output.name);
    let ty = match output.type_name.as_deref() {
        Some(type_name) => parse_type(case, &field, type_name)?,
        None => infer_type(&output.value).ok_or_else(|| ConfigError::UnknownType {
            case: case.to_string(),
            field: field.clone(),
            type_name: "<missing>".to_string(),
        })?,
    };
    let value =
        Value::from_json(&output.value, ty).map_err(|found| ConfigError::ValueTypeMismatch {
            case: case.to_string(),
            field,
            expected: ty,
            found,
        })?;
    Ok(ExpectedValue {
        name: output.name.clone(),
        ty,
        value,
    })
}

/// Blank `exception` means no exception is expected; a blank message matches any.
fn compile_exception(descriptor: &TestCaseDescriptor) -> Option<ExceptionSpec> {
    let kind = descriptor
        .exception
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let message = descriptor
        .exception_message
        .clone()
        .filter(|m| !m.is_empty());
    Some(ExceptionSpec {
        kind: kind.to_string(),
        message,
    })
}

fn declared_iterations(case: &str, iterations: Option<i64>) -> Option<usize> {
    match iterations {
        Some(n) if n > 0 => Some(n as usize),
        Some(n) => {
            warn!("test case `{case}`: ignoring non-positive iterations ({n})");
            None
        }
        None => None,
    }
}

pub(crate) fn parse_type(case: &str, field: &str, type_name: &str) -> Result<ValueType, ConfigError> {
    type_name
        .parse::<ValueType>()
        .map_err(|type_name| ConfigError::UnknownType {
            case: case.to_string(),
            field: field.to_string(),
            type_name,
        })
}

fn infer_type(literal: &serde_json::Value) -> Option<ValueType> {
    match literal {
        serde_json::Value::Bool(_) => Some(ValueType::Bool),
        serde_json::Value::Number(n) if n.is_f64() => Some(ValueType::Float),
        serde_json::Value::Number(_) => Some(ValueType::Int),
        serde_json::Value::String(_) => Some(ValueType::String),
        _ => None,
    }
}
