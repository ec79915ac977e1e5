//! Validator registry: descriptor type -> executable validator.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builtin;
use crate::domain::{FormError, FormResult, ValidationErrors, ValidatorDescriptor};

/// Executable validator over a single field value. `None` means valid.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> Option<ValidationErrors> + Send + Sync>;

/// Builds a [`ValidatorFn`] from a descriptor, rejecting unusable arguments.
pub type ValidatorFactory = Arc<dyn Fn(&ValidatorDescriptor) -> FormResult<ValidatorFn> + Send + Sync>;

/// Wrap a closure as a [`ValidatorFn`].
pub fn validator_fn(f: impl Fn(&Value) -> Option<ValidationErrors> + Send + Sync + 'static) -> ValidatorFn {
    Arc::new(f)
}

/// Stateless table of validator factories keyed by descriptor type.
///
/// Read-only once built; share one instance across many control trees with
/// an `Arc`.
#[derive(Clone)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl ValidatorRegistry {
    /// Registry with no validator types at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in validator types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        builtin::register_defaults(&mut registry);
        registry
    }

    /// Register (or replace) a factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ValidatorDescriptor) -> FormResult<ValidatorFn> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), Arc::new(factory)).is_some() {
            tracing::debug!(validator = %kind, "Replaced validator factory");
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolve a descriptor. Unknown types fail fast.
    pub fn get_validator(&self, descriptor: &ValidatorDescriptor) -> FormResult<ValidatorFn> {
        let factory = self
            .factories
            .get(&descriptor.kind)
            .ok_or_else(|| FormError::UnknownValidator {
                field: None,
                validator_type: descriptor.kind.clone(),
            })?;

        factory(descriptor)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("kinds", &kinds).finish()
    }
}
