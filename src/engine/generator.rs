//! Schema + initial values -> control tree.

use serde_json::Value;
use std::sync::Arc;

use super::control::{BoundValidator, Control};
use super::tree::ControlTree;
use crate::domain::{FieldDescriptor, FormResult, FormSchema, FormValues};
use crate::validation::ValidatorRegistry;

/// Builds control trees, resolving validators through a shared registry.
#[derive(Debug, Clone)]
pub struct FormGenerator {
    registry: Arc<ValidatorRegistry>,
}

impl FormGenerator {
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// Create one control per field descriptor, in declaration order.
    ///
    /// Seed precedence: `initial_values[name]`, then the descriptor's `value`,
    /// then its `default_value`, then `null`. Content elements produce nothing.
    pub fn create_control_tree(
        &self,
        schema: &FormSchema,
        initial_values: Option<&FormValues>,
    ) -> FormResult<ControlTree> {
        if let Some(initial) = initial_values {
            for key in initial.keys().filter(|key| schema.field(key.as_str()).is_none()) {
                tracing::debug!(key = %key, "Ignoring initial value for unknown field");
            }
        }

        let controls = schema
            .fields()
            .map(|field| self.create_control(field, initial_values))
            .collect::<FormResult<Vec<_>>>()?;

        tracing::debug!(
            controls = controls.len(),
            cross_validators = schema.cross_validators().len(),
            "Control tree created"
        );

        Ok(ControlTree::new(controls, schema.cross_validators().to_vec()))
    }

    fn create_control(&self, field: &FieldDescriptor, initial_values: Option<&FormValues>) -> FormResult<Control> {
        let seed = initial_values
            .and_then(|initial| initial.get(&field.name))
            .or(field.value.as_ref())
            .or(field.default_value.as_ref())
            .cloned()
            .unwrap_or(Value::Null);

        let validators = field
            .validators
            .iter()
            .map(|descriptor| {
                let check = self
                    .registry
                    .get_validator(descriptor)
                    .map_err(|e| e.for_field(&field.name))?;
                Ok(BoundValidator {
                    descriptor: descriptor.clone(),
                    check,
                })
            })
            .collect::<FormResult<Vec<_>>>()?;

        Ok(Control::new(field, seed, validators))
    }
}
