//! Reactive form engine.
//!
//! Owns a [`ControlTree`] and keeps its derived state (visibility, enablement,
//! bound validators, validity) consistent with the user-entered values.
//!
//! Every external value write is one *tick*. A tick walks the controls in
//! declaration order, applies the visibility/enablement transitions, re-runs
//! validators, and only then emits a single `value_changes` event. Writes the
//! engine makes while settling never produce ticks of their own.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::control::Control;
use super::events::EventStream;
use super::generator::FormGenerator;
use super::guard;
use super::handle::ControlHandle;
use super::tree::ControlTree;
use crate::config::{EngineSettings, RecomputeStrategy};
use crate::domain::{FormResult, FormSchema, FormValues, ValidationErrors};
use crate::validation::{resolve_error_message, ValidatorRegistry};

/// Summary of one settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number; 0 for the priming tick and for re-settles
    pub tick: u64,
    /// Recompute passes performed
    pub passes: usize,
    /// Visibility or enablement changes applied across all passes
    pub transitions: usize,
}

/// Result of [`FormEngine::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Form was valid; `form_submit` was emitted with these raw values
    Submitted(FormValues),
    /// Form was invalid; every field is now touched
    Rejected { invalid_fields: Vec<String> },
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Derived state of one field, as exposed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStatus {
    pub name: String,
    pub visible: bool,
    pub enabled: bool,
    pub touched: bool,
    pub errors: Option<ValidationErrors>,
}

enum Visibility {
    Shown,
    Hidden,
    Faulted,
}

pub struct FormEngine {
    tree: ControlTree,
    settings: EngineSettings,
    form_errors: Option<ValidationErrors>,
    value_changes: EventStream<FormValues>,
    form_submit: EventStream<FormValues>,
    ticks: u64,
}

impl FormEngine {
    /// Take ownership of `tree` and run the priming tick. Nothing is emitted
    /// for the priming tick.
    pub fn new(tree: ControlTree, settings: EngineSettings) -> Self {
        let mut engine = Self {
            tree,
            settings,
            form_errors: None,
            value_changes: EventStream::new(),
            form_submit: EventStream::new(),
            ticks: 0,
        };

        let report = engine.settle();
        debug!(
            controls = engine.tree.len(),
            passes = report.passes,
            transitions = report.transitions,
            valid = engine.is_valid(),
            "Form primed"
        );

        engine
    }

    /// Generate a control tree for `schema` and wrap it in an engine.
    pub fn build(
        schema: &FormSchema,
        initial_values: Option<&FormValues>,
        registry: Arc<ValidatorRegistry>,
        settings: EngineSettings,
    ) -> FormResult<Self> {
        let tree = FormGenerator::new(registry).create_control_tree(schema, initial_values)?;
        Ok(Self::new(tree, settings))
    }

    // --- Event streams -----------------------------------------------------------------------

    /// Raw values after every settled tick, disabled fields included.
    pub fn value_changes(&self) -> &EventStream<FormValues> {
        &self.value_changes
    }

    /// Raw values on every successful [`submit`](Self::submit).
    pub fn form_submit(&self) -> &EventStream<FormValues> {
        &self.form_submit
    }

    // --- Tick producers ----------------------------------------------------------------------

    /// User write to one field. Produces exactly one tick.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> FormResult<TickReport> {
        let idx = self.tree.position(name)?;
        Ok(self.write_at(idx, value.into()))
    }

    /// Write several fields as a single tick. Unknown names fail before any
    /// value is written.
    pub fn patch_values(&mut self, values: &FormValues) -> FormResult<TickReport> {
        let positions = values
            .iter()
            .map(|(name, value)| Ok((self.tree.position(name)?, value.clone())))
            .collect::<FormResult<Vec<_>>>()?;

        for (idx, value) in positions {
            self.tree.at_mut(idx).write(value);
        }

        Ok(self.run_tick())
    }

    /// Restore every control to its seed value and clear touched state.
    /// Produces one tick.
    pub fn reset(&mut self) -> TickReport {
        for control in self.tree.controls_mut() {
            control.restore_seed();
        }
        self.run_tick()
    }

    pub(crate) fn write_at(&mut self, idx: usize, value: Value) -> TickReport {
        self.tree.at_mut(idx).write(value);
        self.run_tick()
    }

    // --- Engine-originated state -------------------------------------------------------------

    pub fn mark_touched(&mut self, name: &str) -> FormResult<()> {
        let idx = self.tree.position(name)?;
        self.tree.at_mut(idx).mark_touched();
        Ok(())
    }

    pub fn mark_all_touched(&mut self) {
        for control in self.tree.controls_mut() {
            control.mark_touched();
        }
    }

    /// Re-derive state from the current values without producing a tick or
    /// emitting anything. On a settled form this changes nothing.
    pub fn resettle(&mut self) -> TickReport {
        self.settle()
    }

    /// Emit `form_submit` if the form is valid; otherwise mark every field
    /// touched and emit nothing.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.is_valid() {
            let values = self.tree.raw_values();
            info!(fields = values.len(), "Form submitted");
            self.form_submit.emit(&values);
            return SubmitOutcome::Submitted(values);
        }

        self.mark_all_touched();
        let invalid_fields = self.invalid_fields();
        info!(
            invalid = ?invalid_fields,
            form_errors = self.form_errors.is_some(),
            "Form submission rejected"
        );
        SubmitOutcome::Rejected { invalid_fields }
    }

    /// Detach every subscriber and drop the control tree.
    pub fn teardown(self) {
        drop(self);
    }

    // --- Queries -----------------------------------------------------------------------------

    /// All enabled fields pass their validators and all cross-field
    /// validators pass. Disabled and hidden fields never count.
    pub fn is_valid(&self) -> bool {
        self.form_errors.is_none()
            && self
                .tree
                .controls()
                .iter()
                .filter(|c| c.is_enabled())
                .all(Control::is_valid)
    }

    pub fn raw_values(&self) -> FormValues {
        self.tree.raw_values()
    }

    /// Values of enabled fields only.
    pub fn active_values(&self) -> FormValues {
        self.tree.snapshot().active_values()
    }

    pub fn value(&self, name: &str) -> FormResult<&Value> {
        Ok(self.control(name)?.value())
    }

    pub fn is_field_visible(&self, name: &str) -> FormResult<bool> {
        Ok(self.control(name)?.is_visible())
    }

    pub fn is_field_enabled(&self, name: &str) -> FormResult<bool> {
        Ok(self.control(name)?.is_enabled())
    }

    pub fn is_touched(&self, name: &str) -> FormResult<bool> {
        Ok(self.control(name)?.is_touched())
    }

    pub fn errors(&self, name: &str) -> FormResult<Option<&ValidationErrors>> {
        Ok(self.control(name)?.errors())
    }

    /// Errors from cross-field validators.
    pub fn form_errors(&self) -> Option<&ValidationErrors> {
        self.form_errors.as_ref()
    }

    /// Message of the first failing validator, in declared order.
    pub fn error_message(&self, name: &str) -> FormResult<Option<String>> {
        let control = self.control(name)?;
        Ok(resolve_error_message(control.errors(), &control.declared_validators()))
    }

    pub fn field_statuses(&self) -> Vec<FieldStatus> {
        self.tree
            .controls()
            .iter()
            .map(|c| FieldStatus {
                name: c.name().to_string(),
                visible: c.is_visible(),
                enabled: c.is_enabled(),
                touched: c.is_touched(),
                errors: c.errors().cloned(),
            })
            .collect()
    }

    /// Names of enabled fields currently failing validation.
    pub fn invalid_fields(&self) -> Vec<String> {
        self.tree
            .controls()
            .iter()
            .filter(|c| c.is_enabled() && !c.is_valid())
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Number of ticks processed since construction (priming excluded).
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Mutable handle on one field for renderers.
    pub fn control_handle(&mut self, name: &str) -> FormResult<ControlHandle<'_>> {
        let idx = self.tree.position(name)?;
        Ok(ControlHandle::new(self, idx))
    }

    fn control(&self, name: &str) -> FormResult<&Control> {
        Ok(self.tree.at(self.tree.position(name)?))
    }

    pub(crate) fn control_at(&self, idx: usize) -> &Control {
        self.tree.at(idx)
    }

    pub(crate) fn touch_at(&mut self, idx: usize) {
        self.tree.at_mut(idx).mark_touched();
    }

    // --- Tick loop ---------------------------------------------------------------------------

    fn run_tick(&mut self) -> TickReport {
        self.ticks += 1;
        let settled = self.settle();
        let report = TickReport {
            tick: self.ticks,
            ..settled
        };

        debug!(
            tick = report.tick,
            passes = report.passes,
            transitions = report.transitions,
            valid = self.is_valid(),
            "Tick settled"
        );

        self.value_changes.emit(&self.tree.raw_values());
        report
    }

    /// Recompute derived state and revalidate. Emits nothing.
    fn settle(&mut self) -> TickReport {
        let limit = self.settings.pass_limit();
        let mut passes = 0;
        let mut transitions = 0;

        loop {
            passes += 1;
            let changed = self.recompute_pass();
            transitions += changed;

            if changed == 0 || passes >= limit {
                if changed > 0 && self.settings.recompute == RecomputeStrategy::FixedPoint {
                    warn!(
                        passes,
                        pending = changed,
                        "Visibility did not converge; keeping last pass"
                    );
                }
                break;
            }
        }

        self.validate_tree();

        TickReport {
            tick: 0,
            passes,
            transitions,
        }
    }

    /// One walk over the controls in declaration order.
    fn recompute_pass(&mut self) -> usize {
        let mut transitions = 0;

        for idx in 0..self.tree.len() {
            let (visible, faulted) = match self.evaluate_visibility(idx) {
                Visibility::Shown => (true, false),
                Visibility::Hidden => (false, false),
                Visibility::Faulted => (true, true),
            };

            if self.tree.at_mut(idx).apply_visibility(visible, faulted) {
                transitions += 1;
            }
        }

        transitions
    }

    fn evaluate_visibility(&self, idx: usize) -> Visibility {
        let control = self.tree.at(idx);
        let Some(predicate) = control.visible_when() else {
            return Visibility::Shown;
        };

        let snapshot = self.tree.snapshot();
        match guard::evaluate(|| predicate(&snapshot)) {
            Ok(true) => Visibility::Shown,
            Ok(false) => Visibility::Hidden,
            Err(panic) => {
                if self.settings.log_evaluation_failures {
                    warn!(
                        field = %control.name(),
                        panic = %panic,
                        "Visibility predicate panicked; field kept visible and marked invalid"
                    );
                }
                Visibility::Faulted
            }
        }
    }

    fn validate_tree(&mut self) {
        let log_failures = self.settings.log_evaluation_failures;
        for control in self.tree.controls_mut() {
            control.revalidate(log_failures);
        }

        let snapshot = self.tree.snapshot();
        let mut errors = ValidationErrors::new();
        for (position, validator) in self.tree.cross_validators().iter().enumerate() {
            match guard::evaluate(|| validator(&snapshot)) {
                Ok(Some(failed)) => errors.extend(failed),
                Ok(None) => {}
                Err(panic) => {
                    if log_failures {
                        warn!(position, panic = %panic, "Cross-field validator panicked");
                    }
                    errors.extend(guard::internal_error());
                }
            }
        }

        self.form_errors = (!errors.is_empty()).then_some(errors);
    }
}

impl Drop for FormEngine {
    fn drop(&mut self) {
        self.value_changes.close();
        self.form_submit.close();
        debug!(ticks = self.ticks, "Form engine torn down");
    }
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("tree", &self.tree)
            .field("settings", &self.settings)
            .field("form_errors", &self.form_errors)
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
