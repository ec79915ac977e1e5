use clap::Parser;
use formwright::cli::Cli;
use formwright::config::Settings;
use formwright::domain::{
    ContentDescriptor, FieldDescriptor, FormSchema, FormValues, LayoutNode, ValidatorDescriptor,
};
use formwright::engine::{ControlHandle, FormEngine, SubmitOutcome};
use formwright::render::{FieldRenderer, RenderedField, RenderedNode, RendererRegistry};
use formwright::validation::ValidatorRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Renders every field straight from its control state.
struct PlainRenderer;

impl FieldRenderer for PlainRenderer {
    fn bind(&self, control: &mut ControlHandle<'_>, field: &FieldDescriptor) -> RenderedField {
        RenderedField::from_control(control, field)
    }
}

fn shipping_order() -> anyhow::Result<FormSchema> {
    let schema = FormSchema::builder()
        .content(ContentDescriptor::new("intro", "info").payload("text", "Place a shipping order"))
        .field(
            FieldDescriptor::new("delivery", "select")
                .label("Delivery")
                .default_value("pickup")
                .payload("options", serde_json::json!(["pickup", "ship"])),
        )
        .field(
            FieldDescriptor::new("address", "text")
                .label("Address")
                .validator(ValidatorDescriptor::required("Address is required"))
                .validator(ValidatorDescriptor::with_value("minLength", 5, "Address is too short"))
                .visible_when(|form| form.str("delivery") == Some("ship")),
        )
        .field(
            FieldDescriptor::new("qty", "number")
                .label("Quantity")
                .value(1)
                .validator(ValidatorDescriptor::required("Quantity is required"))
                .validator(ValidatorDescriptor::min(1, "Order at least one item")),
        )
        .field(FieldDescriptor::new("notes", "textarea").label("Notes"))
        .layout(LayoutNode::grid(
            2,
            vec![
                LayoutNode::leaf_span("intro", 2),
                LayoutNode::leaf("delivery"),
                LayoutNode::leaf("qty"),
                LayoutNode::leaf_span("address", 2),
                LayoutNode::leaf_span("notes", 2),
            ],
        ))
        .build()?;
    Ok(schema)
}

fn sorted(values: &FormValues) -> BTreeMap<&str, &serde_json::Value> {
    values.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

fn rendered_fields(nodes: &[RenderedNode], out: &mut Vec<RenderedField>) {
    for node in nodes {
        match node {
            RenderedNode::Grid { children, .. } => rendered_fields(children, out),
            RenderedNode::Field { field, .. } => out.push(field.clone()),
            RenderedNode::Content { .. } => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    info!(recompute = ?settings.engine.recompute, "Loaded configuration");

    let schema = shipping_order()?;
    let mut renderers = RendererRegistry::new();
    for field_type in ["select", "text", "number", "textarea"] {
        renderers.register(field_type, PlainRenderer);
    }
    renderers.check_schema(&schema)?;

    let mut engine = FormEngine::build(
        &schema,
        None,
        Arc::new(ValidatorRegistry::with_defaults()),
        settings.engine.clone(),
    )?;

    let _changes = engine.value_changes().subscribe(|values| {
        match serde_json::to_string(&sorted(values)) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize values: {}", e),
        }
    });

    for (name, value) in &cli.assignments {
        engine.set_value(name, value.clone())?;
        engine.mark_touched(name)?;
    }

    if cli.submit {
        match engine.submit() {
            SubmitOutcome::Submitted(values) => {
                println!("{}", serde_json::to_string_pretty(&sorted(&values))?);
            }
            SubmitOutcome::Rejected { invalid_fields } => {
                warn!(invalid = ?invalid_fields, "Form is invalid");
            }
        }
    }

    let nodes = renderers.render(&schema, &mut engine)?;
    let mut fields = Vec::new();
    rendered_fields(&nodes, &mut fields);
    println!("{}", serde_json::to_string_pretty(&fields)?);

    engine.teardown();
    Ok(())
}
