//! Parameter value resolution.
//!
//! Each input parameter is classified once, when its case is registered, into the
//! single source that is authoritative for it:
//!
//! 1. `value` → [`ParameterSource::Explicit`]
//! 2. `regular_expression` → [`ParameterSource::Pattern`]
//! 3. `range` → [`ParameterSource::Bounded`]
//! 4. nothing → [`ParameterSource::Unconstrained`]
//!
//! First match wins; lower-precedence fields that are also present are ignored.
//! [`resolve`] then turns a classified parameter into a concrete value for one
//! iteration.

use log::warn;

use crate::case::{parse_type, ParameterDescriptor, RangeDescriptor};
use crate::errors::ConfigError;
use crate::generate::{Generator, Pattern};
use crate::invoke::Arguments;
use crate::value::{Value, ValueType};

/// A validated input parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: ValueType,
    pub source: ParameterSource,
}

/// The authoritative source of a parameter's value.
#[derive(Debug, Clone)]
pub enum ParameterSource {
    Explicit(Value),
    Pattern(Pattern),
    Bounded(Bounds),
    Unconstrained,
}

/// Inclusive numeric bounds, already checked for `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
}

impl ParameterSpec {
    pub fn from_descriptor(
        case: &str,
        index: usize,
        descriptor: &ParameterDescriptor,
    ) -> Result<ParameterSpec, ConfigError> {
        let name = descriptor
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingParameterName {
                case: case.to_string(),
                index,
            })?
            .to_string();
        let type_name =
            descriptor
                .type_name
                .as_deref()
                .ok_or_else(|| ConfigError::MissingType {
                    case: case.to_string(),
                    parameter: name.clone(),
                })?;
        let ty = parse_type(case, &format!("input `{name}`"), type_name)?;
        let source = classify(case, &name, ty, descriptor)?;
        Ok(ParameterSpec { name, ty, source })
    }

    /// Explicit parameters never change between iterations.
    pub fn is_explicit(&self) -> bool {
        matches!(self.source, ParameterSource::Explicit(_))
    }
}

/// Picks the authoritative source for one parameter and checks it against `ty`.
pub fn classify(
    case: &str,
    name: &str,
    ty: ValueType,
    descriptor: &ParameterDescriptor,
) -> Result<ParameterSource, ConfigError> {
    if let Some(literal) = &descriptor.value {
        if descriptor.regular_expression.is_some() || descriptor.range.is_some() {
            warn!("test case `{case}`: `value` takes precedence over `regular_expression`/`range` for `{name}`");
        }
        let value = Value::from_json(literal, ty).map_err(|found| ConfigError::ValueTypeMismatch {
            case: case.to_string(),
            field: format!("input `{name}`"),
            expected: ty,
            found,
        })?;
        return Ok(ParameterSource::Explicit(value));
    }

    if let Some(source) = &descriptor.regular_expression {
        if ty != ValueType::String {
            return Err(ConfigError::PatternRequiresString {
                case: case.to_string(),
                parameter: name.to_string(),
                declared: ty,
            });
        }
        let pattern = Pattern::parse(source).map_err(|reason| ConfigError::InvalidPattern {
            case: case.to_string(),
            parameter: name.to_string(),
            reason,
        })?;
        return Ok(ParameterSource::Pattern(pattern));
    }

    if let Some(range) = &descriptor.range {
        let bounds = bounds(ty, range).map_err(|reason| match reason {
            BoundsError::NotNumeric => ConfigError::RangeRequiresNumeric {
                case: case.to_string(),
                parameter: name.to_string(),
                declared: ty,
            },
            BoundsError::Invalid(reason) => ConfigError::InvalidRange {
                case: case.to_string(),
                parameter: name.to_string(),
                reason,
            },
        })?;
        return Ok(ParameterSource::Bounded(bounds));
    }

    Ok(ParameterSource::Unconstrained)
}

enum BoundsError {
    NotNumeric,
    Invalid(String),
}

fn bounds(ty: ValueType, range: &RangeDescriptor) -> Result<Bounds, BoundsError> {
    match ty {
        ValueType::Int => {
            let min = integral(&range.min).map_err(BoundsError::Invalid)?;
            let max = integral(&range.max).map_err(BoundsError::Invalid)?;
            if min > max {
                return Err(BoundsError::Invalid(format!(
                    "min {min} must not be greater than max {max}"
                )));
            }
            Ok(Bounds::Int { min, max })
        }
        ValueType::Float => {
            let (min, max) = match (range.min.as_f64(), range.max.as_f64()) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err(BoundsError::Invalid("bounds must be numbers".to_string())),
            };
            if min > max {
                return Err(BoundsError::Invalid(format!(
                    "min {min:e} must not be greater than max {max:e}"
                )));
            }
            Ok(Bounds::Float { min, max })
        }
        ValueType::String | ValueType::Bool => Err(BoundsError::NotNumeric),
    }
}

fn integral(n: &serde_json::Number) -> Result<i64, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(format!("bound {n} is not an integer")),
    }
}

/// Produces the value of one parameter for one iteration.
pub fn resolve(spec: &ParameterSpec, generator: &mut Generator) -> Value {
    match &spec.source {
        ParameterSource::Explicit(value) => value.clone(),
        ParameterSource::Pattern(pattern) => Value::String(generator.matching(pattern)),
        ParameterSource::Bounded(Bounds::Int { min, max }) => {
            Value::Int(generator.int_in(*min, *max))
        }
        ParameterSource::Bounded(Bounds::Float { min, max }) => {
            Value::Float(generator.float_in(*min, *max))
        }
        ParameterSource::Unconstrained => generator.any(spec.ty),
    }
}

/// Resolves every input of a case, in declaration order.
pub fn resolve_all(inputs: &[ParameterSpec], generator: &mut Generator) -> Arguments {
    let mut args = Arguments::new();
    for spec in inputs {
        args.push(spec.name.clone(), resolve(spec, generator));
    }
    args
}
