use thiserror::Error;

use crate::config::Settings;

/// Upper bound keeps a misconfigured fixed-point loop from spinning.
const MAX_SETTLE_PASSES_LIMIT: usize = 1024;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.engine.max_settle_passes == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "engine.max_settle_passes".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if settings.engine.max_settle_passes > MAX_SETTLE_PASSES_LIMIT {
            errors.push(ValidationError::InvalidValue {
                field: "engine.max_settle_passes".to_string(),
                reason: format!("Must not exceed {}", MAX_SETTLE_PASSES_LIMIT),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ConfigValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_zero_passes_rejected() {
        let mut settings = Settings::default();
        settings.engine.max_settle_passes = 0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("engine.max_settle_passes"));
    }

    #[test]
    fn test_excessive_passes_rejected() {
        let mut settings = Settings::default();
        settings.engine.max_settle_passes = 5000;
        assert!(ConfigValidator::validate(&settings).is_err());
    }
}
