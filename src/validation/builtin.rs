//! Built-in validator types.
//!
//! Every built-in reports its failure under its own descriptor type, so the
//! first-failing-message lookup can match errors back to descriptors. Empty
//! values (null, empty string, empty array) pass everything except
//! `required` and `requiredTrue`.

use regex::Regex;
use serde_json::{json, Value};

use super::registry::{validator_fn, ValidatorRegistry};
use crate::domain::{FormError, FormResult, ValidationErrors, ValidatorDescriptor};

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";

pub(crate) fn register_defaults(registry: &mut ValidatorRegistry) {
    registry.register("required", |_| {
        Ok(validator_fn(|value| is_empty(value).then(|| error("required", json!(true)))))
    });

    registry.register("requiredTrue", |_| {
        Ok(validator_fn(|value| {
            (value != &Value::Bool(true)).then(|| error("requiredTrue", json!(true)))
        }))
    });

    registry.register("min", |descriptor| {
        let min = numeric_arg(descriptor)?;
        Ok(validator_fn(move |value| {
            numeric_value(value)
                .filter(|actual| *actual < min)
                .map(|actual| error("min", json!({ "min": min, "actual": actual })))
        }))
    });

    registry.register("max", |descriptor| {
        let max = numeric_arg(descriptor)?;
        Ok(validator_fn(move |value| {
            numeric_value(value)
                .filter(|actual| *actual > max)
                .map(|actual| error("max", json!({ "max": max, "actual": actual })))
        }))
    });

    registry.register("minLength", |descriptor| {
        let required = length_arg(descriptor)?;
        Ok(validator_fn(move |value| {
            length_of(value)
                .filter(|actual| *actual > 0 && *actual < required)
                .map(|actual| {
                    error(
                        "minLength",
                        json!({ "requiredLength": required, "actualLength": actual }),
                    )
                })
        }))
    });

    registry.register("maxLength", |descriptor| {
        let allowed = length_arg(descriptor)?;
        Ok(validator_fn(move |value| {
            length_of(value).filter(|actual| *actual > allowed).map(|actual| {
                error(
                    "maxLength",
                    json!({ "requiredLength": allowed, "actualLength": actual }),
                )
            })
        }))
    });

    registry.register("pattern", |descriptor| {
        let source = descriptor
            .value
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_argument(descriptor, "expected a regular expression string"))?
            .to_string();
        let regex = compile(descriptor, &format!("^(?:{})$", source))?;
        Ok(validator_fn(move |value| {
            let text = text_of(value)?;
            (!regex.is_match(&text)).then(|| {
                error(
                    "pattern",
                    json!({ "requiredPattern": source, "actualValue": text }),
                )
            })
        }))
    });

    registry.register("email", |descriptor| {
        let regex = compile(descriptor, EMAIL_PATTERN)?;
        Ok(validator_fn(move |value| {
            let text = text_of(value)?;
            (!regex.is_match(&text)).then(|| error("email", json!(true)))
        }))
    });
}

fn error(kind: &str, detail: Value) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.insert(kind.to_string(), detail);
    errors
}

pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Numbers, or strings that parse as numbers. Anything else is skipped.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Text to match against a pattern; empty values are skipped.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn numeric_arg(descriptor: &ValidatorDescriptor) -> FormResult<f64> {
    descriptor
        .value
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid_argument(descriptor, "expected a numeric value"))
}

fn length_arg(descriptor: &ValidatorDescriptor) -> FormResult<usize> {
    descriptor
        .value
        .as_ref()
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| invalid_argument(descriptor, "expected a non-negative integer"))
}

fn compile(descriptor: &ValidatorDescriptor, pattern: &str) -> FormResult<Regex> {
    Regex::new(pattern).map_err(|e| invalid_argument(descriptor, &e.to_string()))
}

fn invalid_argument(descriptor: &ValidatorDescriptor, reason: &str) -> FormError {
    FormError::InvalidValidatorArgument {
        validator_type: descriptor.kind.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidatorFn;

    fn resolve(descriptor: ValidatorDescriptor) -> ValidatorFn {
        ValidatorRegistry::with_defaults()
            .get_validator(&descriptor)
            .ok()
            .unwrap()
    }

    #[test]
    fn test_required() {
        let check = resolve(ValidatorDescriptor::required("Required"));
        assert!(check(&Value::Null).is_some());
        assert!(check(&json!("")).is_some());
        assert!(check(&json!([])).is_some());
        assert!(check(&json!("x")).is_none());
        assert!(check(&json!(0)).is_none());
        assert!(check(&json!(false)).is_none());
    }

    #[test]
    fn test_required_true() {
        let check = resolve(ValidatorDescriptor::new("requiredTrue", "Accept the terms"));
        assert!(check(&json!(true)).is_none());
        assert_eq!(check(&json!(false)).unwrap()["requiredTrue"], json!(true));
        assert!(check(&Value::Null).is_some());
    }

    #[test]
    fn test_min_and_max() {
        let min = resolve(ValidatorDescriptor::min(0, "Too small"));
        assert_eq!(min(&json!(-1)).unwrap()["min"], json!({"min": 0.0, "actual": -1.0}));
        assert!(min(&json!(0)).is_none());
        assert!(min(&json!("-2")).is_some());
        assert!(min(&Value::Null).is_none());
        assert!(min(&json!("abc")).is_none());

        let max = resolve(ValidatorDescriptor::max(10, "Too big"));
        assert!(max(&json!(10.5)).is_some());
        assert!(max(&json!(10)).is_none());
    }

    #[test]
    fn test_length_validators() {
        let min = resolve(ValidatorDescriptor::with_value("minLength", 3, "Too short"));
        assert!(min(&json!("ab")).is_some());
        assert!(min(&json!("abc")).is_none());
        assert!(min(&json!("")).is_none());

        let max = resolve(ValidatorDescriptor::with_value("maxLength", 2, "Too long"));
        assert_eq!(
            max(&json!([1, 2, 3])).unwrap()["maxLength"],
            json!({"requiredLength": 2, "actualLength": 3})
        );
        assert!(max(&json!("ab")).is_none());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let check = resolve(ValidatorDescriptor::pattern("[0-9]{4}", "Four digits"));
        assert!(check(&json!("1234")).is_none());
        assert!(check(&json!("12345")).is_some());
        assert!(check(&json!(1234)).is_none());
        assert!(check(&json!("")).is_none());
    }

    #[test]
    fn test_email() {
        let check = resolve(ValidatorDescriptor::new("email", "Bad email"));
        assert!(check(&json!("ana@example.com")).is_none());
        assert!(check(&json!("not-an-email")).is_some());
        assert!(check(&Value::Null).is_none());
    }

    #[test]
    fn test_bad_arguments_fail_construction() {
        let registry = ValidatorRegistry::with_defaults();
        assert!(matches!(
            registry.get_validator(&ValidatorDescriptor::new("min", "missing bound")),
            Err(FormError::InvalidValidatorArgument { .. })
        ));
        assert!(matches!(
            registry.get_validator(&ValidatorDescriptor::pattern("(", "broken")),
            Err(FormError::InvalidValidatorArgument { .. })
        ));
        assert!(matches!(
            registry.get_validator(&ValidatorDescriptor::with_value("minLength", -1, "negative")),
            Err(FormError::InvalidValidatorArgument { .. })
        ));
    }
}
