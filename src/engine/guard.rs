//! Isolation of caller-supplied predicates.
//!
//! Visibility predicates and validators are arbitrary code. A panic inside one
//! is caught here and turned into a recorded fault on the owning field.

use serde_json::json;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::domain::ValidationErrors;

/// Error key recorded for a predicate that panicked.
pub const INTERNAL_ERROR_KEY: &str = "internal";

/// Run `f`, converting a panic into its message.
pub(crate) fn evaluate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

pub(crate) fn internal_error() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.insert(INTERNAL_ERROR_KEY.to_string(), json!(true));
    errors
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
