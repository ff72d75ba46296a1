//! Suite aggregation.
//!
//! A [`Suite`] owns its registered cases in insertion order. Registration validates
//! each descriptor against the suite's [`FunctionRegistry`] (or, for contract cases,
//! its [`ContractRegistry`]); running drives every enabled function case through the
//! fuzz policy and the executor, validates every contract case once, and records the
//! outcome in a caller-owned [`SuiteResult`].

use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;

use crate::case::{TestCase, TestCaseDescriptor};
use crate::config::RunConfig;
use crate::contract::{build_default_contracts, ContractCase, ContractRegistry};
use crate::errors::ConfigError;
use crate::executor::{CaseResult, Executor};
use crate::fuzz::FuzzPlan;
use crate::registry::FunctionRegistry;

// =============================================================================
// SUITE
// =============================================================================

#[derive(Debug, Clone)]
enum Entry {
    Enabled(TestCase),
    Contract(ContractCase),
    /// Disabled cases are kept for reporting but never validated.
    Disabled { name: String },
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Entry::Enabled(case) => &case.name,
            Entry::Contract(case) => &case.name,
            Entry::Disabled { name } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    registry: FunctionRegistry,
    contracts: ContractRegistry,
    entries: Vec<Entry>,
    names: HashSet<String>,
}

impl Suite {
    pub fn new(name: impl Into<String>, registry: FunctionRegistry) -> Self {
        Suite {
            name: name.into(),
            registry,
            contracts: build_default_contracts(),
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Replaces the built-in contracts. Affects cases added afterwards.
    pub fn with_contracts(mut self, contracts: ContractRegistry) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// Validates and registers one case. Nothing is added on error.
    pub fn add(&mut self, descriptor: &TestCaseDescriptor) -> Result<(), ConfigError> {
        let name = self.unique_name(descriptor.display_name());
        let entry = if !descriptor.is_enabled() {
            info!("registered `{name}` (disabled)");
            Entry::Disabled { name: name.clone() }
        } else if descriptor.is_contract() {
            let case = ContractCase::compile(name.clone(), descriptor, &self.contracts)?;
            info!("registered `{}` -> contract {}", case.name, case.contract.name());
            Entry::Contract(case)
        } else {
            let case = TestCase::compile(name.clone(), descriptor, &self.registry)?;
            info!(
                "registered `{}` -> {} ({} input(s))",
                case.name,
                case.function_name,
                case.inputs.len()
            );
            Entry::Enabled(case)
        };
        self.names.insert(name);
        self.entries.push(entry);
        Ok(())
    }

    /// Registers every descriptor, stopping at the first configuration error.
    pub fn add_all<'d, I>(&mut self, descriptors: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'d TestCaseDescriptor>,
    {
        descriptors.into_iter().try_for_each(|d| self.add(d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.entries.iter().map(Entry::name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Enabled(case) if case.name == name => Some(case),
            _ => None,
        })
    }

    /// Runs every enabled case once through its plan. `results` is reset first.
    pub fn run(&self, config: &RunConfig, results: &mut SuiteResult) {
        let mut generator = config.generator();
        results.reset(&self.name, generator.seed());
        info!(
            "running suite `{}`: {} case(s), seed {}",
            self.name,
            self.entries.len(),
            generator.seed()
        );

        for entry in &self.entries {
            let case = match entry {
                Entry::Disabled { name } => {
                    info!("skipping disabled case `{name}`");
                    results.record(CaseResult::skipped(name.as_str(), "disabled"));
                    continue;
                }
                Entry::Contract(case) => {
                    match config.skip_reason(&case.name) {
                        Some(reason) => {
                            results.record(CaseResult::skipped(case.name.as_str(), reason))
                        }
                        None => results.record(case.run()),
                    }
                    continue;
                }
                Entry::Enabled(case) => case,
            };
            if let Some(reason) = config.skip_reason(&case.name) {
                results.record(CaseResult::skipped(case.name.as_str(), reason));
                continue;
            }
            let plan = FuzzPlan::for_case(case, config.default_iterations);
            if plan.is_fuzzing && case.iterations.is_none() {
                warn!(
                    "`{}` does not declare iterations; defaulting to {}",
                    case.name, plan.iterations
                );
            }
            let result = Executor::new(case, plan, config.fail_fast).run(&mut generator);
            results.record(result);
        }
    }

    fn unique_name(&self, base: String) -> String {
        if !self.names.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({n})");
            if !self.names.contains(&candidate) {
                warn!("duplicate case name `{base}`; registered as `{candidate}`");
                return candidate;
            }
            n += 1;
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Results of one suite run, owned by the caller and reset on every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteResult {
    pub suite: String,
    pub seed: u64,
    cases: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, suite: &str, seed: u64) {
        self.suite = suite.to_string();
        self.seed = seed;
        self.cases.clear();
    }

    pub fn record(&mut self, result: CaseResult) {
        self.cases.push(result);
    }

    pub fn get(&self, name: &str) -> Option<&CaseResult> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Case results in registration order.
    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    pub fn has_failures(&self) -> bool {
        self.cases.iter().any(CaseResult::is_failed)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            suite: self.suite.clone(),
            ..Summary::default()
        };
        for case in &self.cases {
            if case.is_passed() {
                summary.passed += 1;
            } else if case.is_failed() {
                summary.failed += 1;
            } else {
                summary.skipped += 1;
            }
            summary.iterations += case.iterations_run;
        }
        summary
    }
}

/// Totals across a run. Skipped cases are excluded from pass/fail counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub suite: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub iterations: usize,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total_tests(&self) -> usize {
        self.passed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_tests() == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total_tests() as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_default_registry;
    use serde_json::json;

    fn descriptor(value: serde_json::Value) -> TestCaseDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn duplicate_names_get_a_suffix() {
        let mut suite = Suite::new("s", build_default_registry());
        let d = descriptor(json!({"name": "same", "function_name": "divide"}));
        suite.add(&d).unwrap();
        suite.add(&d).unwrap();
        suite.add(&d).unwrap();
        assert_eq!(suite.case_names(), ["same", "same (2)", "same (3)"]);
    }

    #[test]
    fn failed_registration_adds_nothing() {
        let mut suite = Suite::new("s", build_default_registry());
        let d = descriptor(json!({"name": "bad", "function_name": "nope"}));
        assert!(suite.add(&d).is_err());
        assert!(suite.is_empty());
        // The name stays available.
        let d = descriptor(json!({"name": "bad", "function_name": "divide"}));
        suite.add(&d).unwrap();
        assert_eq!(suite.case_names(), ["bad"]);
    }

    #[test]
    fn disabled_cases_are_not_validated() {
        let mut suite = Suite::new("s", build_default_registry());
        let d = descriptor(json!({"name": "off", "enabled": 0, "function_name": "nope"}));
        suite.add(&d).unwrap();
        assert_eq!(suite.len(), 1);
        assert!(suite.get("off").is_none());
    }

    #[test]
    fn contract_cases_run_alongside_function_cases() {
        let mut suite = Suite::new("s", build_default_registry());
        suite
            .add(&descriptor(json!({"name": "f", "function_name": "divide",
                "input": [{"name": "a", "type": "int", "value": 4}, {"name": "b", "type": "int", "value": 2}]})))
            .unwrap();
        suite
            .add(&descriptor(json!({"description": "valid user", "contract": "UserContract",
                "data": {"name": "John", "email": "john@example.com", "age": 30}})))
            .unwrap();
        assert_eq!(suite.case_names(), ["f", "valid user"]);
        assert!(suite.get("valid user").is_none());

        let mut results = SuiteResult::new();
        suite.run(&RunConfig::new().with_seed(2), &mut results);
        assert!(results.get("valid user").unwrap().is_passed());
        assert_eq!(results.summary().iterations, 2);

        suite.run(&RunConfig::new().with_filter("user"), &mut results);
        assert!(results.get("f").unwrap().is_skipped());
        assert!(results.get("valid user").unwrap().is_passed());
    }

    #[test]
    fn custom_contract_registries_replace_the_builtins() {
        use crate::contract::DataContract;
        use crate::rules::Rule;

        let mut contracts = ContractRegistry::new();
        contracts.register(DataContract::with_rules("Flag", [Rule::boolean("on")]));
        let mut suite = Suite::new("s", build_default_registry()).with_contracts(contracts);
        let err = suite
            .add(&descriptor(json!({"name": "u", "contract": "UserContract", "data": {}})))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownContract { .. }));
        suite
            .add(&descriptor(json!({"name": "flag", "contract": "Flag", "data": {"on": 1},
                "expected_errors": ["Field 'on' must be a boolean"]})))
            .unwrap();

        let mut results = SuiteResult::new();
        suite.run(&RunConfig::new(), &mut results);
        assert!(results.get("flag").unwrap().is_passed());
    }

    #[test]
    fn summary_rate() {
        let summary = Summary {
            suite: "s".into(),
            passed: 3,
            failed: 1,
            skipped: 2,
            iterations: 10,
        };
        assert_eq!(summary.total_tests(), 4);
        assert!(summary.has_failures());
        assert_eq!(summary.success_rate(), 75.0);
        assert_eq!(Summary::default().success_rate(), 0.0);
    }
}
