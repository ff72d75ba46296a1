//! Run configuration.

use crate::fuzz::DEFAULT_ITERATIONS;
use crate::generate::Generator;

/// Options for one suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Fixed RNG seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Iterations for fuzzed cases that declare none.
    pub default_iterations: usize,
    /// Stop a case at its first failing iteration.
    pub fail_fast: bool,
    /// Case-insensitive substring a case name must contain to run.
    pub filter: Option<String>,
    pub use_colors: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_iterations: DEFAULT_ITERATIONS,
            fail_fast: false,
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_default_iterations(mut self, iterations: usize) -> Self {
        self.default_iterations = iterations.max(1);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// A fresh generator for one run.
    pub fn generator(&self) -> Generator {
        match self.seed {
            Some(seed) => Generator::from_seed(seed),
            None => Generator::from_entropy(),
        }
    }

    /// Why a case named `name` is filtered out, if it is.
    pub fn skip_reason(&self, name: &str) -> Option<String> {
        let filter = self.filter.as_deref()?;
        if name.to_lowercase().contains(&filter.to_lowercase()) {
            None
        } else {
            Some(format!("does not match filter '{filter}'"))
        }
    }
}
