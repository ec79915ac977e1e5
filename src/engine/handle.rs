use serde_json::Value;

use super::form::{FormEngine, TickReport};
use crate::domain::ValidationErrors;
use crate::validation::resolve_error_message;

/// Mutable access to one field, handed to renderers.
///
/// Reads reflect the engine's current decisions; [`set_value`](Self::set_value)
/// is a user write and runs a full tick. There is no way to toggle enablement
/// or validators from here.
pub struct ControlHandle<'a> {
    engine: &'a mut FormEngine,
    idx: usize,
}

impl<'a> ControlHandle<'a> {
    pub(crate) fn new(engine: &'a mut FormEngine, idx: usize) -> Self {
        Self { engine, idx }
    }

    pub fn name(&self) -> &str {
        self.engine.control_at(self.idx).name()
    }

    pub fn value(&self) -> &Value {
        self.engine.control_at(self.idx).value()
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.engine.control_at(self.idx).errors()
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.control_at(self.idx).is_enabled()
    }

    pub fn is_visible(&self) -> bool {
        self.engine.control_at(self.idx).is_visible()
    }

    pub fn is_touched(&self) -> bool {
        self.engine.control_at(self.idx).is_touched()
    }

    pub fn error_message(&self) -> Option<String> {
        let control = self.engine.control_at(self.idx);
        resolve_error_message(control.errors(), &control.declared_validators())
    }

    /// Write back a user edit. Produces one tick.
    pub fn set_value(&mut self, value: impl Into<Value>) -> TickReport {
        self.engine.write_at(self.idx, value.into())
    }

    pub fn mark_touched(&mut self) {
        self.engine.touch_at(self.idx);
    }
}

impl std::fmt::Debug for ControlHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlHandle")
            .field("control", self.engine.control_at(self.idx))
            .finish()
    }
}
