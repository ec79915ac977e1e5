//! Declarative form schema: fields, content blocks, layout, cross-field rules.
//!
//! Nothing in here owns runtime state. A [`FormSchema`] is handed to the
//! [`FormGenerator`](crate::engine::FormGenerator), which turns every
//! [`FieldDescriptor`] into a live control.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::FormResult;
use super::snapshot::FormSnapshot;
use super::validator::SchemaValidator;

/// Raw value map keyed by field name
pub type FormValues = HashMap<String, Value>;

/// Error map keyed by validator type (`internal` for recovered faults)
pub type ValidationErrors = Map<String, Value>;

/// Visibility predicate evaluated against the live control state
pub type VisibilityFn = Arc<dyn Fn(&FormSnapshot<'_>) -> bool + Send + Sync>;

/// Whole-form validator contributing errors not owned by any single field
pub type CrossValidatorFn = Arc<dyn Fn(&FormSnapshot<'_>) -> Option<ValidationErrors> + Send + Sync>;

// ============================================================================
// Validator Descriptor
// ============================================================================

/// Declarative validator reference, resolved through the
/// [`ValidatorRegistry`](crate::validation::ValidatorRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorDescriptor {
    /// Registry key, e.g. `required` or `min`
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional argument for the validator factory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Message shown when this validator fails
    pub message: String,
}

impl ValidatorDescriptor {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            message: message.into(),
        }
    }

    pub fn with_value(kind: impl Into<String>, value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new("required", message)
    }

    pub fn min(min: impl Into<Value>, message: impl Into<String>) -> Self {
        Self::with_value("min", min, message)
    }

    pub fn max(max: impl Into<Value>, message: impl Into<String>) -> Self {
        Self::with_value("max", max, message)
    }

    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_value("pattern", pattern.into(), message)
    }
}

// ============================================================================
// Elements
// ============================================================================

/// An interactive, validated input bound to one control.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Unique within a schema; joins layout, initial values and controls
    pub name: String,
    /// Renderer key, e.g. `text`, `select`, `date`
    pub field_type: String,
    pub label: Option<String>,
    pub value: Option<Value>,
    pub default_value: Option<Value>,
    pub validators: Vec<ValidatorDescriptor>,
    pub disabled: bool,
    pub visible_when: Option<VisibilityFn>,
    /// Renderer-specific extras (options, placeholder, ...)
    pub payload: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            value: None,
            default_value: None,
            validators: Vec::new(),
            disabled: false,
            visible_when: None,
            payload: Map::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Schema-level seed value (loses to an explicit initial value).
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Fallback seed used when neither an initial value nor `value` is given.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validator(mut self, descriptor: ValidatorDescriptor) -> Self {
        self.validators.push(descriptor);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attach a visibility predicate. It must be a pure function of the snapshot.
    pub fn visible_when(mut self, predicate: impl Fn(&FormSnapshot<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.visible_when = Some(Arc::new(predicate));
        self
    }

    pub fn payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("label", &self.label)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("validators", &self.validators)
            .field("disabled", &self.disabled)
            .field("visible_when", &self.visible_when.is_some())
            .field("payload", &self.payload)
            .finish()
    }
}

/// Static, non-validated element (image, info block). Never becomes a control.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDescriptor {
    pub name: String,
    pub content_type: String,
    pub payload: Map<String, Value>,
}

impl ContentDescriptor {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            payload: Map::new(),
        }
    }

    pub fn payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Schema element, discriminated by kind.
#[derive(Debug, Clone)]
pub enum ElementDescriptor {
    Field(FieldDescriptor),
    Content(ContentDescriptor),
}

impl ElementDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ElementDescriptor::Field(field) => &field.name,
            ElementDescriptor::Content(content) => &content.name,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDescriptor> {
        match self {
            ElementDescriptor::Field(field) => Some(field),
            ElementDescriptor::Content(_) => None,
        }
    }
}

impl From<FieldDescriptor> for ElementDescriptor {
    fn from(field: FieldDescriptor) -> Self {
        ElementDescriptor::Field(field)
    }
}

impl From<ContentDescriptor> for ElementDescriptor {
    fn from(content: ContentDescriptor) -> Self {
        ElementDescriptor::Content(content)
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Presentational routing of elements. Owns no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    /// Places one element by name
    Leaf { name: String, span: Option<u16> },
    /// Grid of child nodes
    Grid { columns: u16, children: Vec<LayoutNode> },
}

impl LayoutNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        LayoutNode::Leaf {
            name: name.into(),
            span: None,
        }
    }

    pub fn leaf_span(name: impl Into<String>, span: u16) -> Self {
        LayoutNode::Leaf {
            name: name.into(),
            span: Some(span),
        }
    }

    pub fn grid(columns: u16, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Grid { columns, children }
    }

    /// All element names referenced by leaves, depth first.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaf_names(&mut names);
        names
    }

    fn collect_leaf_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            LayoutNode::Leaf { name, .. } => names.push(name),
            LayoutNode::Grid { children, .. } => {
                for child in children {
                    child.collect_leaf_names(names);
                }
            }
        }
    }
}

// ============================================================================
// Form Schema
// ============================================================================

/// A validated form schema.
///
/// Only obtainable through [`FormSchemaBuilder::build`], so every instance has
/// unique element names and a layout whose leaves resolve.
#[derive(Clone)]
pub struct FormSchema {
    elements: Vec<ElementDescriptor>,
    layout: LayoutNode,
    cross_validators: Vec<CrossValidatorFn>,
}

impl FormSchema {
    pub fn builder() -> FormSchemaBuilder {
        FormSchemaBuilder::default()
    }

    pub fn elements(&self) -> &[ElementDescriptor] {
        &self.elements
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.elements.iter().filter_map(ElementDescriptor::as_field)
    }

    pub fn element(&self, name: &str) -> Option<&ElementDescriptor> {
        self.elements.iter().find(|e| e.name() == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.element(name).and_then(ElementDescriptor::as_field)
    }

    pub fn layout(&self) -> &LayoutNode {
        &self.layout
    }

    pub fn cross_validators(&self) -> &[CrossValidatorFn] {
        &self.cross_validators
    }
}

impl fmt::Debug for FormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("elements", &self.elements)
            .field("layout", &self.layout)
            .field("cross_validators", &self.cross_validators.len())
            .finish()
    }
}

/// Builder for [`FormSchema`]. Construction checks run in [`build`](Self::build).
#[derive(Default)]
pub struct FormSchemaBuilder {
    elements: Vec<ElementDescriptor>,
    layout: Option<LayoutNode>,
    cross_validators: Vec<CrossValidatorFn>,
}

impl FormSchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.elements.push(ElementDescriptor::Field(field));
        self
    }

    pub fn content(mut self, content: ContentDescriptor) -> Self {
        self.elements.push(ElementDescriptor::Content(content));
        self
    }

    pub fn element(mut self, element: impl Into<ElementDescriptor>) -> Self {
        self.elements.push(element.into());
        self
    }

    /// Explicit layout. Without one, elements stack in a single column.
    pub fn layout(mut self, layout: LayoutNode) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn cross_validator(
        mut self,
        validator: impl Fn(&FormSnapshot<'_>) -> Option<ValidationErrors> + Send + Sync + 'static,
    ) -> Self {
        self.cross_validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> FormResult<FormSchema> {
        let layout = self.layout.unwrap_or_else(|| {
            LayoutNode::grid(
                1,
                self.elements.iter().map(|e| LayoutNode::leaf(e.name())).collect(),
            )
        });

        SchemaValidator::validate(&self.elements, &layout)?;

        Ok(FormSchema {
            elements: self.elements,
            layout,
            cross_validators: self.cross_validators,
        })
    }
}
