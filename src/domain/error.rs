//! Error types for schema construction and engine access

use thiserror::Error;

/// Errors raised while building a schema, a control tree, or while addressing
/// fields that do not exist.
///
/// Every variant is a programmer error: the schema author (or the caller) handed
/// the engine something it cannot honor. Run-time predicate failures never
/// surface here; they are recorded on the affected field instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Two elements share the same name
    #[error("Duplicate element name: '{0}'")]
    DuplicateElement(String),

    /// A layout leaf points at an element that is not declared
    #[error("Layout references unknown element: '{0}'")]
    UnknownLayoutReference(String),

    /// Structurally invalid layout node
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Validator descriptor type the registry does not know
    #[error("Unknown validator type '{validator_type}'{}", on_field(.field))]
    UnknownValidator {
        field: Option<String>,
        validator_type: String,
    },

    /// Validator descriptor with an argument its factory rejects
    #[error("Invalid argument for validator '{validator_type}': {reason}")]
    InvalidValidatorArgument {
        validator_type: String,
        reason: String,
    },

    /// Write or query naming no field of the tree
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    /// No renderer registered for a field type
    #[error("No renderer registered for field type '{0}'")]
    UnknownFieldType(String),
}

impl FormError {
    /// Attach the owning field name to a validator resolution error.
    pub fn for_field(self, name: &str) -> Self {
        match self {
            FormError::UnknownValidator { validator_type, .. } => FormError::UnknownValidator {
                field: Some(name.to_string()),
                validator_type,
            },
            other => other,
        }
    }
}

fn on_field(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|name| format!(" on field '{}'", name))
        .unwrap_or_default()
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
