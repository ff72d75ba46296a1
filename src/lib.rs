pub use crate::case::{TestCase, TestCaseDescriptor};
pub use crate::config::RunConfig;
pub use crate::contract::{build_default_contracts, ContractRegistry, DataContract};
pub use crate::errors::{ConfigError, VeritasError};
pub use crate::invoke::{Arguments, Exception};
pub use crate::registry::{build_default_registry, FunctionRegistry};
pub use crate::rules::{Record, Rule};
pub use crate::suite::{Suite, SuiteResult, Summary};
pub use crate::value::{Value, ValueType};

pub mod builtins;
pub mod case;
pub mod cli;
pub mod compare;
pub mod config;
pub mod contract;
pub mod errors;
pub mod executor;
pub mod fuzz;
pub mod generate;
pub mod invoke;
pub mod loader;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod suite;
pub mod value;
