//! Read-only view of the control tree handed to predicates.
//!
//! Schema predicates and cross-field validators are typed over this view, so
//! it sits with the schema types. It borrows the engine's `Control` state
//! directly; this is the only place `domain` depends on `engine`.

use serde_json::Value;
use std::collections::HashMap;

use super::schema::FormValues;
use crate::engine::Control;

/// State of every control at the instant a predicate runs.
///
/// [`get`](Self::get) follows active-value semantics: a disabled control reads
/// as absent. Use [`raw`](Self::raw) to see retained values of disabled controls.
#[derive(Clone, Copy)]
pub struct FormSnapshot<'a> {
    controls: &'a [Control],
    index: &'a HashMap<String, usize>,
}

impl<'a> FormSnapshot<'a> {
    pub(crate) fn new(controls: &'a [Control], index: &'a HashMap<String, usize>) -> Self {
        Self { controls, index }
    }

    fn control(&self, name: &str) -> Option<&'a Control> {
        self.index.get(name).map(|&idx| &self.controls[idx])
    }

    /// Value of an enabled control.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.control(name).filter(|c| c.is_enabled()).map(Control::value)
    }

    /// Value of a control regardless of its enabled state.
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.control(name).map(Control::value)
    }

    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.control(name).map(Control::is_enabled).unwrap_or(false)
    }

    /// Values of enabled controls only.
    pub fn active_values(&self) -> FormValues {
        self.controls
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| (c.name().to_string(), c.value().clone()))
            .collect()
    }

    pub fn raw_values(&self) -> FormValues {
        self.controls
            .iter()
            .map(|c| (c.name().to_string(), c.value().clone()))
            .collect()
    }
}
