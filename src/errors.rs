//! Veritas error handling.
//!
//! Two classes of failure exist. A [`ConfigError`] means a test descriptor is
//! malformed; it is raised while a case is registered, before anything is invoked,
//! and always names the case and the offending parameter or field. Assertion
//! failures are not errors at all: they are recorded in the run's results (see
//! `crate::suite::SuiteResult`).
//!
//! [`VeritasError`] wraps configuration errors together with the I/O and decoding
//! failures of the descriptor loader. Both types implement `miette::Diagnostic`, so
//! the CLI renders them with codes and help text.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::value::ValueType;

/// A malformed test descriptor.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("test case `{case}`: `function_name` is missing")]
    #[diagnostic(
        code(veritas::config::missing_function),
        help("every test case must name the function it exercises")
    )]
    MissingFunctionName { case: String },

    #[error("test case `{case}`: function `{function}` is not registered")]
    #[diagnostic(
        code(veritas::config::unknown_function),
        help("register the function before adding cases that call it; `veritas functions` lists the built-ins")
    )]
    UnknownFunction { case: String, function: String },

    #[error("test case `{case}`: input #{index} is missing a `name`")]
    #[diagnostic(code(veritas::config::missing_name))]
    MissingParameterName { case: String, index: usize },

    #[error("test case `{case}`: input parameter `{parameter}` is declared more than once")]
    #[diagnostic(code(veritas::config::duplicate_parameter))]
    DuplicateParameter { case: String, parameter: String },

    #[error("test case `{case}`: missing `type` for input parameter `{parameter}`")]
    #[diagnostic(
        code(veritas::config::missing_type),
        help("declare one of `int`, `float`, `string` or `bool`")
    )]
    MissingType { case: String, parameter: String },

    #[error("test case `{case}`: `{field}` has unsupported type `{type_name}`")]
    #[diagnostic(
        code(veritas::config::unknown_type),
        help("supported types are `int`, `float`, `string` and `bool`")
    )]
    UnknownType {
        case: String,
        field: String,
        type_name: String,
    },

    #[error("test case `{case}`: `{field}` is declared `{expected}` but its value is {found}")]
    #[diagnostic(
        code(veritas::config::value_type),
        help("values are never coerced; fix either the `type` or the `value`")
    )]
    ValueTypeMismatch {
        case: String,
        field: String,
        expected: ValueType,
        found: String,
    },

    #[error("test case `{case}`: input parameter `{parameter}` uses `regular_expression` but is declared `{declared}`")]
    #[diagnostic(
        code(veritas::config::pattern_type),
        help("patterns generate text; declare the parameter as `string`")
    )]
    PatternRequiresString {
        case: String,
        parameter: String,
        declared: ValueType,
    },

    #[error("test case `{case}`: input parameter `{parameter}` has an invalid pattern: {reason}")]
    #[diagnostic(code(veritas::config::pattern))]
    InvalidPattern {
        case: String,
        parameter: String,
        reason: String,
    },

    #[error("test case `{case}`: input parameter `{parameter}` uses `range` but is declared `{declared}`")]
    #[diagnostic(
        code(veritas::config::range_type),
        help("ranges are only meaningful for `int` and `float` parameters")
    )]
    RangeRequiresNumeric {
        case: String,
        parameter: String,
        declared: ValueType,
    },

    #[error("test case `{case}`: invalid range for `{parameter}`: {reason}")]
    #[diagnostic(code(veritas::config::range))]
    InvalidRange {
        case: String,
        parameter: String,
        reason: String,
    },

    #[error("test case `{case}`: contract `{contract}` is not registered")]
    #[diagnostic(
        code(veritas::config::unknown_contract),
        help("`veritas contracts` lists the built-in contracts")
    )]
    UnknownContract { case: String, contract: String },

    #[error("test case `{case}`: contract `data` must be an object, found {found}")]
    #[diagnostic(code(veritas::config::contract_data))]
    ContractDataNotObject { case: String, found: String },

    #[error("test case `{case}`: a contract case cannot also declare a function, inputs, outputs or an exception")]
    #[diagnostic(
        code(veritas::config::mixed_shape),
        help("split it into a function case and a contract case")
    )]
    MixedCaseShape { case: String },
}

impl ConfigError {
    /// The name of the test case the error belongs to.
    pub fn case(&self) -> &str {
        match self {
            ConfigError::MissingFunctionName { case }
            | ConfigError::UnknownFunction { case, .. }
            | ConfigError::MissingParameterName { case, .. }
            | ConfigError::DuplicateParameter { case, .. }
            | ConfigError::MissingType { case, .. }
            | ConfigError::UnknownType { case, .. }
            | ConfigError::ValueTypeMismatch { case, .. }
            | ConfigError::PatternRequiresString { case, .. }
            | ConfigError::InvalidPattern { case, .. }
            | ConfigError::RangeRequiresNumeric { case, .. }
            | ConfigError::InvalidRange { case, .. }
            | ConfigError::UnknownContract { case, .. }
            | ConfigError::ContractDataNotObject { case, .. }
            | ConfigError::MixedCaseShape { case } => case,
        }
    }
}

/// Top-level error for loading and registering test descriptors.
#[derive(Debug, Error, Diagnostic)]
pub enum VeritasError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(veritas::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON test cases in {}", path.display())]
    #[diagnostic(code(veritas::json), help("a file holds one case, an array of cases, or {{\"name\", \"cases\"}}"))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML test cases in {}", path.display())]
    #[diagnostic(code(veritas::yaml))]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to render the JSON report")]
    #[diagnostic(code(veritas::report::json))]
    Render(#[source] serde_json::Error),

    #[error("failed to write the report")]
    #[diagnostic(code(veritas::report::output))]
    Output(#[source] std::io::Error),

    #[error("no test case files found under {}", path.display())]
    #[diagnostic(
        code(veritas::no_cases),
        help("test case files end in .json, .yaml or .yml")
    )]
    NoTestFiles { path: PathBuf },
}
