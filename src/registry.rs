//! Function registry: maps the `function_name` of a test descriptor to a callable.
//!
//! ## Usage Workflow
//! ```rust
//! use veritas::registry::{build_default_registry, FunctionRegistry};
//! use veritas::value::Value;
//! // 1. Start from the built-ins, or from an empty registry
//! let mut registry = build_default_registry();
//! // 2. Register the functions your descriptors name
//! registry.register("double", |args| Ok(Value::Float(args.float("x")? * 2.0)));
//! // 3. Hand the registry to a suite; cases are bound to functions when added
//! assert!(registry.has("double"));
//! assert!(registry.has("divide"));
//! ```
//!
//! ## Registry Invariant
//! A registry is populated before any case is added to a suite. Binding happens once,
//! at registration time, so an unknown name is a configuration error rather than a
//! test failure.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::builtins;
use crate::invoke::{Arguments, Exception};
use crate::value::Value;

/// A function under test. Runs are single-threaded, so handles are shared with `Rc`.
pub type TargetFn = Rc<dyn Fn(&Arguments) -> Result<Value, Exception>>;

/// Wraps a closure or function as a [`TargetFn`].
pub fn target_fn<F>(f: F) -> TargetFn
where
    F: Fn(&Arguments) -> Result<Value, Exception> + 'static,
{
    Rc::new(f)
}

// Registry for all callable targets, inspectable at runtime.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, TargetFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<TargetFn> {
        self.functions.get(name).cloned()
    }

    /// Names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&Arguments) -> Result<Value, Exception> + 'static,
    {
        self.functions.insert(name.to_string(), target_fn(func));
    }

    pub fn remove(&mut self, name: &str) -> Option<TargetFn> {
        self.functions.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

/// Builds a registry with every built-in function registered.
///
/// # Example
/// ```rust
/// use veritas::registry::build_default_registry;
/// let registry = build_default_registry();
/// assert!(registry.has("celsius_to_fahrenheit"));
/// ```
pub fn build_default_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    builtins::register_builtins(&mut registry);
    registry
}
