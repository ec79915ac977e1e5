use std::collections::HashMap;
use std::fmt;

use super::control::Control;
use crate::domain::{CrossValidatorFn, FormError, FormResult, FormSnapshot, FormValues};

/// The full set of controls for one schema instance, in declaration order.
///
/// Produced by the [`FormGenerator`](super::FormGenerator) and owned by exactly
/// one [`FormEngine`](super::FormEngine) for its whole lifetime.
pub struct ControlTree {
    controls: Vec<Control>,
    index: HashMap<String, usize>,
    cross_validators: Vec<CrossValidatorFn>,
}

impl ControlTree {
    pub(crate) fn new(controls: Vec<Control>, cross_validators: Vec<CrossValidatorFn>) -> Self {
        let index = controls
            .iter()
            .enumerate()
            .map(|(idx, control)| (control.name().to_string(), idx))
            .collect();

        Self {
            controls,
            index,
            cross_validators,
        }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Control names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().map(Control::name)
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.index.get(name).map(|&idx| &self.controls[idx])
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn snapshot(&self) -> FormSnapshot<'_> {
        FormSnapshot::new(&self.controls, &self.index)
    }

    /// Values of every control, disabled ones included.
    pub fn raw_values(&self) -> FormValues {
        self.snapshot().raw_values()
    }

    pub(crate) fn position(&self, name: &str) -> FormResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub(crate) fn at(&self, idx: usize) -> &Control {
        &self.controls[idx]
    }

    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut Control {
        &mut self.controls[idx]
    }

    pub(crate) fn controls_mut(&mut self) -> &mut [Control] {
        &mut self.controls
    }

    pub(crate) fn cross_validators(&self) -> &[CrossValidatorFn] {
        &self.cross_validators
    }
}

impl fmt::Debug for ControlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlTree")
            .field("controls", &self.controls)
            .field("cross_validators", &self.cross_validators.len())
            .finish()
    }
}
