//! Data contracts and contract test cases.
//!
//! A [`DataContract`] is a named, ordered list of [`Rule`]s. Validating a record
//! runs every rule and collects the message of each one that fails. Contract cases
//! pair a contract name with a data record and the errors it is expected to
//! produce; the comparison ignores order and duplicates.
//!
//! ```rust
//! use veritas::contract::build_default_contracts;
//! use veritas::rules::Record;
//! use veritas::value::Value;
//!
//! let contracts = build_default_contracts();
//! let user = contracts.get("UserContract").unwrap();
//! let mut record = Record::new();
//! record.insert("email".into(), Value::from("test@example.com"));
//! record.insert("name".into(), Value::from("John"));
//! assert_eq!(user.validate(&record), ["Field 'age' is required", "Field 'age' must be a number"]);
//! ```

use log::debug;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

use crate::case::TestCaseDescriptor;
use crate::errors::ConfigError;
use crate::executor::{CaseResult, CaseStatus, IterationFailure};
use crate::invoke::Arguments;
use crate::rules::{Record, Rule};
use crate::value::{json_kind, Value};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_RULE: Lazy<Rule> = Lazy::new(|| {
    Rule::string_pattern("email", EMAIL_PATTERN).expect("email pattern is valid")
});

// =============================================================================
// CONTRACTS
// =============================================================================

#[derive(Debug, Clone)]
pub struct DataContract {
    name: String,
    rules: Vec<Rule>,
}

impl DataContract {
    pub fn new(name: impl Into<String>) -> Self {
        DataContract {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rules(name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        DataContract {
            name: name.into(),
            rules: rules.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Messages of every failing rule, in rule order. Empty means valid.
    pub fn validate(&self, record: &Record) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| !rule.is_valid(record))
            .map(|rule| rule.error_message(record))
            .collect()
    }

    pub fn is_valid(&self, record: &Record) -> bool {
        self.rules.iter().all(|rule| rule.is_valid(record))
    }
}

/// Contracts addressable by name from descriptor files.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, DataContract>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under the contract's own name, replacing any earlier one.
    pub fn register(&mut self, contract: DataContract) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    pub fn get(&self, name: &str) -> Option<&DataContract> {
        self.contracts.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.contracts.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// `UserContract`: a required email address, an age in `0..=120` and a name of
/// 3 to 20 characters.
pub fn user_contract() -> DataContract {
    DataContract::with_rules(
        "UserContract",
        [
            Rule::required("email"),
            EMAIL_RULE.clone(),
            Rule::required("age"),
            Rule::number_range("age", Some(0.0), Some(120.0)),
            Rule::required("name"),
            Rule::string_length("name", Some(3), Some(20)),
        ],
    )
}

/// `EventContract`: `end_date` falls strictly after `start_date`.
pub fn event_contract() -> DataContract {
    DataContract::with_rules(
        "EventContract",
        [Rule::end_after_start("start_date", "end_date")],
    )
}

pub fn build_default_contracts() -> ContractRegistry {
    let mut registry = ContractRegistry::new();
    registry.register(user_contract());
    registry.register(event_contract());
    registry
}

// =============================================================================
// CONTRACT CASES
// =============================================================================

/// A registered contract case.
#[derive(Debug, Clone)]
pub struct ContractCase {
    pub name: String,
    pub contract: DataContract,
    pub data: Record,
    pub expected_errors: Vec<String>,
}

impl ContractCase {
    /// Validates the descriptor's contract fields and binds the named contract.
    pub fn compile(
        name: String,
        descriptor: &TestCaseDescriptor,
        contracts: &ContractRegistry,
    ) -> Result<ContractCase, ConfigError> {
        let contract_name = descriptor
            .contract
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if descriptor.function_name.is_some()
            || !descriptor.input.is_empty()
            || !descriptor.output.is_empty()
            || descriptor.exception.is_some()
        {
            return Err(ConfigError::MixedCaseShape { case: name });
        }
        let contract = contracts
            .get(contract_name)
            .ok_or_else(|| ConfigError::UnknownContract {
                case: name.clone(),
                contract: contract_name.to_string(),
            })?
            .clone();
        let data = match descriptor.data.as_ref() {
            Some(literal @ serde_json::Value::Object(_)) => match Value::from_json_any(literal) {
                Value::Map(map) => map,
                _ => Record::new(),
            },
            Some(other) => {
                return Err(ConfigError::ContractDataNotObject {
                    case: name,
                    found: json_kind(other).to_string(),
                })
            }
            None => {
                return Err(ConfigError::ContractDataNotObject {
                    case: name,
                    found: "missing".to_string(),
                })
            }
        };
        Ok(ContractCase {
            name,
            contract,
            data,
            expected_errors: descriptor.expected_errors.clone(),
        })
    }

    /// Validates the record once and compares the error sets.
    pub fn run(&self) -> CaseResult {
        let errors = self.contract.validate(&self.data);
        let got: BTreeSet<&str> = errors.iter().map(String::as_str).collect();
        let expected: BTreeSet<&str> = self.expected_errors.iter().map(String::as_str).collect();
        debug!("`{}` against {}: {:?}", self.name, self.contract.name, errors);

        let mut failures = Vec::new();
        if got != expected {
            let mut arguments = Arguments::new();
            for (field, value) in &self.data {
                arguments.push(field.as_str(), value.clone());
            }
            failures.push(IterationFailure {
                iteration: 1,
                arguments,
                message: format!(
                    "Expected errors: {:?}, Got: {:?}",
                    self.expected_errors, errors
                ),
            });
        }
        CaseResult {
            name: self.name.clone(),
            function: Some(self.contract.name.clone()),
            fuzzing: false,
            planned: 1,
            iterations_run: 1,
            passed_iterations: usize::from(failures.is_empty()),
            status: if failures.is_empty() {
                CaseStatus::Passed
            } else {
                CaseStatus::Failed
            },
            failures,
        }
    }
}
