//! Runtime state of a single field.

use serde_json::Value;
use std::fmt;

use super::guard;
use crate::domain::{FieldDescriptor, ValidationErrors, ValidatorDescriptor, VisibilityFn};
use crate::validation::ValidatorFn;

/// A resolved validator together with the descriptor it came from.
#[derive(Clone)]
pub struct BoundValidator {
    pub descriptor: ValidatorDescriptor,
    pub check: ValidatorFn,
}

impl fmt::Debug for BoundValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundValidator").field(&self.descriptor.kind).finish()
    }
}

/// Live value/validity/enablement slot for one field.
///
/// Only the engine mutates a control. User writes go through
/// [`FormEngine::set_value`](super::FormEngine::set_value) and produce a tick;
/// every other mutation here is engine-originated and silent.
pub struct Control {
    name: String,
    field_type: String,
    value: Value,
    seed: Value,
    declared: Vec<BoundValidator>,
    validators: Vec<BoundValidator>,
    declared_disabled: bool,
    enabled: bool,
    visible: bool,
    touched: bool,
    dirty: bool,
    faulted: bool,
    errors: Option<ValidationErrors>,
    visible_when: Option<VisibilityFn>,
}

impl Control {
    pub(crate) fn new(field: &FieldDescriptor, seed: Value, declared: Vec<BoundValidator>) -> Self {
        let enabled = !field.disabled;
        Self {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            value: seed.clone(),
            seed,
            validators: if enabled { declared.clone() } else { Vec::new() },
            declared,
            declared_disabled: field.disabled,
            enabled,
            visible: true,
            touched: false,
            dirty: false,
            faulted: false,
            errors: None,
            visible_when: field.visible_when.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Value the control was created with.
    pub fn seed(&self) -> &Value {
        &self.seed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// True once a user write has landed since creation or the last reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Descriptors of the validators currently attached.
    pub fn bound_validators(&self) -> impl Iterator<Item = &ValidatorDescriptor> {
        self.validators.iter().map(|v| &v.descriptor)
    }

    /// Descriptors declared in the schema, bound or not.
    pub fn declared_validators(&self) -> Vec<ValidatorDescriptor> {
        self.declared.iter().map(|v| v.descriptor.clone()).collect()
    }

    pub(crate) fn visible_when(&self) -> Option<&VisibilityFn> {
        self.visible_when.as_ref()
    }

    pub(crate) fn write(&mut self, value: Value) {
        self.value = value;
        self.dirty = true;
    }

    pub(crate) fn restore_seed(&mut self) {
        self.value = self.seed.clone();
        self.dirty = false;
        self.touched = false;
    }

    pub(crate) fn mark_touched(&mut self) {
        self.touched = true;
    }

    /// Apply the visibility outcome of this tick. Returns true when the
    /// visible or enabled state changed.
    pub(crate) fn apply_visibility(&mut self, visible: bool, faulted: bool) -> bool {
        let should_enable = !self.declared_disabled && visible;
        let mut changed = self.visible != visible;

        self.visible = visible;
        self.faulted = faulted;

        if should_enable && !self.enabled {
            self.enabled = true;
            self.validators = self.declared.clone();
            changed = true;
        } else if !should_enable && self.enabled {
            self.enabled = false;
            self.validators.clear();
            self.errors = None;
            changed = true;
        }

        changed
    }

    /// Re-run the bound validators against the current value.
    pub(crate) fn revalidate(&mut self, log_failures: bool) {
        if !self.enabled {
            self.errors = None;
            return;
        }
        if self.faulted {
            self.errors = Some(guard::internal_error());
            return;
        }

        let mut errors = ValidationErrors::new();
        for validator in &self.validators {
            match guard::evaluate(|| (validator.check)(&self.value)) {
                Ok(Some(failed)) => errors.extend(failed),
                Ok(None) => {}
                Err(panic) => {
                    if log_failures {
                        tracing::warn!(
                            field = %self.name,
                            validator = %validator.descriptor.kind,
                            panic = %panic,
                            "Validator panicked; field marked invalid"
                        );
                    }
                    errors.extend(guard::internal_error());
                }
            }
        }

        self.errors = (!errors.is_empty()).then_some(errors);
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("validators", &self.validators)
            .finish()
    }
}
