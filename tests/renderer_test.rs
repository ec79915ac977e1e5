use formwright::config::EngineSettings;
use formwright::domain::{FieldDescriptor, FormError, FormSchema, LayoutNode, ValidatorDescriptor};
use formwright::engine::{ControlHandle, FormEngine};
use formwright::render::{FieldRenderer, RenderedField, RenderedNode, RendererRegistry};
use formwright::validation::ValidatorRegistry;
use serde_json::json;
use std::sync::Arc;

/// Trims surrounding whitespace from text values, the way an input widget
/// would normalise on blur.
struct TrimmingRenderer;

impl FieldRenderer for TrimmingRenderer {
    fn bind(&self, control: &mut ControlHandle<'_>, field: &FieldDescriptor) -> RenderedField {
        let trimmed = control.value().as_str().map(|s| s.trim().to_string());
        if let Some(trimmed) = trimmed {
            if control.value().as_str() != Some(trimmed.as_str()) {
                control.set_value(trimmed);
                control.mark_touched();
            }
        }
        RenderedField::from_control(control, field)
    }
}

fn schema() -> FormSchema {
    FormSchema::builder()
        .field(
            FieldDescriptor::new("city", "text")
                .label("City")
                .validator(ValidatorDescriptor::with_value("minLength", 3, "City is too short")),
        )
        .field(FieldDescriptor::new("zip", "text").visible_when(|form| form.str("city").is_some()))
        .layout(LayoutNode::grid(3, vec![LayoutNode::leaf_span("city", 2), LayoutNode::leaf("zip")]))
        .build()
        .unwrap()
}

fn engine(schema: &FormSchema) -> FormEngine {
    FormEngine::build(
        schema,
        None,
        Arc::new(ValidatorRegistry::with_defaults()),
        EngineSettings::default(),
    )
    .unwrap()
}

fn fields(nodes: &[RenderedNode]) -> Vec<&RenderedField> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            RenderedNode::Grid { children, .. } => out.extend(fields(children)),
            RenderedNode::Field { field, .. } => out.push(field),
            RenderedNode::Content { .. } => {}
        }
    }
    out
}

#[test]
fn test_missing_renderer_is_reported() {
    let schema = schema();
    let mut engine = engine(&schema);
    let registry = RendererRegistry::new();

    let err = registry.render(&schema, &mut engine).unwrap_err();
    assert_eq!(err, FormError::UnknownFieldType("text".to_string()));
}

#[test]
fn test_renderer_writes_back_through_handle() -> anyhow::Result<()> {
    let schema = schema();
    let mut engine = engine(&schema);
    let mut registry = RendererRegistry::new();
    registry.register("text", TrimmingRenderer);

    let nodes = registry.render(&schema, &mut engine)?;
    assert_eq!(fields(&nodes).len(), 1);

    engine.set_value("city", "  Oslo  ")?;
    let ticks = engine.tick_count();

    let nodes = registry.render(&schema, &mut engine)?;
    let rendered = fields(&nodes);
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].value, json!("Oslo"));
    assert_eq!(rendered[0].label.as_deref(), Some("City"));
    assert!(rendered[0].touched);
    assert_eq!(engine.tick_count(), ticks + 1);
    assert_eq!(engine.value("city")?, &json!("Oslo"));

    Ok(())
}

#[test]
fn test_touched_field_shows_resolved_message() -> anyhow::Result<()> {
    let schema = schema();
    let mut engine = engine(&schema);
    let mut registry = RendererRegistry::new();
    registry.register("text", TrimmingRenderer);

    engine.set_value("city", " Os ")?;
    let nodes = registry.render(&schema, &mut engine)?;
    let rendered = fields(&nodes);
    assert_eq!(rendered[0].error, Some("City is too short".to_string()));
    assert_eq!(rendered[1].error, None);

    let RenderedNode::Grid { columns, children } = &nodes[0] else {
        panic!("expected root grid");
    };
    assert_eq!(*columns, 3);
    assert!(matches!(children[0], RenderedNode::Field { span: Some(2), .. }));

    Ok(())
}
