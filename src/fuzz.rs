//! Fuzz policy: decides whether a case is a single deterministic run or a
//! repeated, randomized one.

use serde::Serialize;

use crate::case::TestCase;
use crate::resolve::ParameterSpec;

/// Iterations for a fuzzed case that declares none.
pub const DEFAULT_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FuzzPlan {
    pub is_fuzzing: bool,
    pub iterations: usize,
}

impl FuzzPlan {
    pub fn for_case(case: &TestCase, default_iterations: usize) -> FuzzPlan {
        evaluate(&case.inputs, case.iterations, default_iterations)
    }
}

/// Fuzzing is active when any input lacks an explicit value, including mixed
/// explicit/generated inputs. A deterministic case runs once whatever `declared`
/// says.
pub fn evaluate(
    inputs: &[ParameterSpec],
    declared: Option<usize>,
    default_iterations: usize,
) -> FuzzPlan {
    let is_fuzzing = inputs.iter().any(|spec| !spec.is_explicit());
    let iterations = if is_fuzzing {
        declared
            .filter(|&n| n > 0)
            .unwrap_or(default_iterations)
            .max(1)
    } else {
        1
    };
    FuzzPlan {
        is_fuzzing,
        iterations,
    }
}
