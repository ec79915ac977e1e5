//! Validator registry, built-in validators and error message resolution.

mod builtin;
pub mod registry;

pub use registry::{validator_fn, ValidatorFactory, ValidatorFn, ValidatorRegistry};

use crate::domain::{ValidationErrors, ValidatorDescriptor};

/// Message shown when no descriptor-level message matches a failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Invalid value";

/// Message of the first descriptor (in declared order) whose type appears in
/// `errors`, or [`GENERIC_ERROR_MESSAGE`] when none does. `None` when valid.
pub fn resolve_error_message(
    errors: Option<&ValidationErrors>,
    validators: &[ValidatorDescriptor],
) -> Option<String> {
    let errors = errors.filter(|e| !e.is_empty())?;

    let message = validators
        .iter()
        .find(|descriptor| errors.contains_key(&descriptor.kind) && !descriptor.message.is_empty())
        .map(|descriptor| descriptor.message.clone())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

    Some(message)
}
