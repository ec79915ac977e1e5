//! Field renderer resolution.
//!
//! Concrete widgets live outside this crate. They plug in by implementing
//! [`FieldRenderer`] and registering under a field type string; the
//! [`RendererRegistry`] then walks a schema's layout and binds each visible
//! field to its renderer through a [`ControlHandle`].

pub mod registry;

pub use registry::RendererRegistry;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{ContentDescriptor, FieldDescriptor};
use crate::engine::ControlHandle;

/// Capability a concrete field widget must provide.
///
/// A renderer reads the control's value and errors, and may write user edits
/// back through [`ControlHandle::set_value`]. It cannot change enablement or
/// validator binding; those belong to the engine.
pub trait FieldRenderer: Send + Sync {
    fn bind(&self, control: &mut ControlHandle<'_>, field: &FieldDescriptor) -> RenderedField;
}

/// Editable representation of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub field_type: String,
    pub label: Option<String>,
    pub value: Value,
    pub enabled: bool,
    pub touched: bool,
    /// Message to display; only set once the field is touched
    pub error: Option<String>,
    pub payload: Map<String, Value>,
}

impl RenderedField {
    /// Default representation straight from the control's state.
    pub fn from_control(control: &ControlHandle<'_>, field: &FieldDescriptor) -> Self {
        let touched = control.is_touched();
        Self {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            label: field.label.clone(),
            value: control.value().clone(),
            enabled: control.is_enabled(),
            touched,
            error: if touched { control.error_message() } else { None },
            payload: field.payload.clone(),
        }
    }
}

/// Output of a layout walk.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNode {
    Grid {
        columns: u16,
        children: Vec<RenderedNode>,
    },
    Field {
        span: Option<u16>,
        field: RenderedField,
    },
    Content {
        span: Option<u16>,
        content: ContentDescriptor,
    },
}
