//! Case execution: drives one registered case through its planned iterations.
//!
//! Each iteration resolves arguments, invokes the target once, and compares the
//! outcome. An iteration failure is recorded and the loop moves on unless
//! `fail_fast` is set; nothing here ever aborts the surrounding suite.

use log::{debug, trace};
use serde::Serialize;

use crate::case::TestCase;
use crate::compare::{Expectation, Verdict};
use crate::fuzz::FuzzPlan;
use crate::generate::Generator;
use crate::invoke::{invoke, Arguments, Outcome};
use crate::resolve::resolve_all;

// =============================================================================
// RESULTS
// =============================================================================

/// Lifecycle of a case inside an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    Running { iteration: usize, of: usize },
    Passed,
    Failed,
}

/// Everything observed in one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    /// 1-based.
    pub iteration: usize,
    pub arguments: Arguments,
    pub outcome: Outcome,
    pub verdict: Verdict,
}

/// A failed iteration, kept for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationFailure {
    pub iteration: usize,
    pub arguments: Arguments,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped { reason: String },
}

/// Final record of one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub function: Option<String>,
    pub fuzzing: bool,
    pub planned: usize,
    pub iterations_run: usize,
    pub passed_iterations: usize,
    pub failures: Vec<IterationFailure>,
    #[serde(flatten)]
    pub status: CaseStatus,
}

impl CaseResult {
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CaseResult {
            name: name.into(),
            function: None,
            fuzzing: false,
            planned: 0,
            iterations_run: 0,
            passed_iterations: 0,
            failures: Vec::new(),
            status: CaseStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == CaseStatus::Failed
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, CaseStatus::Skipped { .. })
    }
}

// =============================================================================
// EXECUTOR
// =============================================================================

pub struct Executor<'a> {
    case: &'a TestCase,
    plan: FuzzPlan,
    expectation: Expectation,
    fail_fast: bool,
    state: CaseState,
}

impl<'a> Executor<'a> {
    pub fn new(case: &'a TestCase, plan: FuzzPlan, fail_fast: bool) -> Self {
        Executor {
            case,
            plan,
            expectation: Expectation::for_case(case),
            fail_fast,
            state: CaseState::Pending,
        }
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    /// Runs a single iteration. Explicit inputs are re-used verbatim, the rest are
    /// drawn from `generator`.
    pub fn step(&mut self, iteration: usize, generator: &mut Generator) -> IterationResult {
        self.state = CaseState::Running {
            iteration,
            of: self.plan.iterations,
        };
        let arguments = resolve_all(&self.case.inputs, generator);
        trace!("{} #{iteration}: {arguments}", self.case.name);
        let outcome = invoke(&self.case.function, &arguments);
        let verdict = self.expectation.check(&outcome);
        IterationResult {
            iteration,
            arguments,
            outcome,
            verdict,
        }
    }

    /// Runs every planned iteration and returns the aggregate record.
    pub fn run(&mut self, generator: &mut Generator) -> CaseResult {
        debug!(
            "running `{}` ({} iteration(s), fuzzing: {})",
            self.case.name, self.plan.iterations, self.plan.is_fuzzing
        );
        let mut iterations_run = 0;
        let mut passed_iterations = 0;
        let mut failures = Vec::new();

        for iteration in 1..=self.plan.iterations {
            let result = self.step(iteration, generator);
            iterations_run += 1;
            match result.verdict {
                Verdict::Pass => passed_iterations += 1,
                Verdict::Fail(message) => {
                    debug!("`{}` failed on iteration {iteration}: {message}", self.case.name);
                    failures.push(IterationFailure {
                        iteration,
                        arguments: result.arguments,
                        message,
                    });
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        let status = if failures.is_empty() {
            self.state = CaseState::Passed;
            CaseStatus::Passed
        } else {
            self.state = CaseState::Failed;
            CaseStatus::Failed
        };
        CaseResult {
            name: self.case.name.clone(),
            function: Some(self.case.function_name.clone()),
            fuzzing: self.plan.is_fuzzing,
            planned: self.plan.iterations,
            iterations_run,
            passed_iterations,
            failures,
            status,
        }
    }
}
