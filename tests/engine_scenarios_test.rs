use formwright::config::EngineSettings;
use formwright::domain::{
    FieldDescriptor, FormError, FormSchema, FormValues, LayoutNode, ValidationErrors, ValidatorDescriptor,
};
use formwright::engine::{FormEngine, FormGenerator, SubmitOutcome};
use formwright::validation::{validator_fn, ValidatorRegistry, GENERIC_ERROR_MESSAGE};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn shipping_order() -> FormSchema {
    FormSchema::builder()
        .field(FieldDescriptor::new("delivery", "select").default_value("pickup"))
        .field(
            FieldDescriptor::new("address", "text")
                .validator(ValidatorDescriptor::required("Address is required"))
                .validator(ValidatorDescriptor::with_value("minLength", 5, "Address is too short"))
                .visible_when(|form| form.str("delivery") == Some("ship")),
        )
        .field(
            FieldDescriptor::new("qty", "number")
                .value(1)
                .validator(ValidatorDescriptor::required("Quantity is required"))
                .validator(ValidatorDescriptor::min(1, "Order at least one item")),
        )
        .field(FieldDescriptor::new("email", "text").validator(ValidatorDescriptor::new("email", "")))
        .build()
        .unwrap()
}

fn engine_for(schema: &FormSchema, initial: Option<&FormValues>) -> FormEngine {
    FormEngine::build(
        schema,
        initial,
        Arc::new(ValidatorRegistry::with_defaults()),
        EngineSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_shipping_order_flow() -> anyhow::Result<()> {
    let schema = shipping_order();
    let mut engine = engine_for(&schema, None);

    let events: Rc<RefCell<Vec<FormValues>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let _changes = engine
        .value_changes()
        .subscribe(move |values: &FormValues| sink.borrow_mut().push(values.clone()));

    assert!(engine.is_valid());
    assert!(!engine.is_field_visible("address")?);

    engine.set_value("delivery", "ship")?;
    assert!(engine.is_field_enabled("address")?);
    assert_eq!(engine.error_message("address")?, Some("Address is required".to_string()));

    engine.set_value("address", "12")?;
    assert_eq!(engine.error_message("address")?, Some("Address is too short".to_string()));

    engine.set_value("address", "12 Harbour Road")?;
    engine.set_value("qty", 3)?;
    assert!(engine.is_valid());

    let outcome = engine.submit();
    let SubmitOutcome::Submitted(values) = outcome else {
        panic!("expected submission, got {:?}", outcome);
    };
    assert_eq!(values.get("address"), Some(&json!("12 Harbour Road")));
    assert_eq!(values.get("qty"), Some(&json!(3)));

    let events = events.borrow();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].get("delivery"), Some(&json!("ship")));
    assert_eq!(events[3].get("qty"), Some(&json!(3)));

    Ok(())
}

#[test]
fn test_active_values_exclude_hidden_fields() -> anyhow::Result<()> {
    let schema = shipping_order();
    let mut engine = engine_for(&schema, None);

    engine.set_value("address", "somewhere")?;
    assert!(!engine.active_values().contains_key("address"));
    assert_eq!(engine.raw_values().get("address"), Some(&json!("somewhere")));

    Ok(())
}

#[test]
fn test_initial_values_override_schema() -> anyhow::Result<()> {
    let schema = shipping_order();
    let initial: FormValues = [
        ("delivery".to_string(), json!("ship")),
        ("qty".to_string(), json!(0)),
        ("coupon".to_string(), json!("IGNORED")),
    ]
    .into_iter()
    .collect();
    let engine = engine_for(&schema, Some(&initial));

    assert!(engine.is_field_visible("address")?);
    assert_eq!(engine.value("qty")?, &json!(0));
    assert_eq!(engine.error_message("qty")?, Some("Order at least one item".to_string()));
    assert!(matches!(engine.value("coupon"), Err(FormError::UnknownField(_))));
    assert_eq!(engine.tick_count(), 0);

    Ok(())
}

#[test]
fn test_empty_message_falls_back_to_generic() -> anyhow::Result<()> {
    let schema = shipping_order();
    let mut engine = engine_for(&schema, None);

    engine.set_value("email", "not-an-address")?;
    assert_eq!(engine.error_message("email")?, Some(GENERIC_ERROR_MESSAGE.to_string()));

    engine.set_value("email", "orders@example.com")?;
    assert_eq!(engine.error_message("email")?, None);

    Ok(())
}

#[test]
fn test_unknown_validator_fails_generation() {
    let schema = FormSchema::builder()
        .field(FieldDescriptor::new("postcode", "text").validator(ValidatorDescriptor::new("postcode", "Bad postcode")))
        .build()
        .unwrap();

    let err = FormGenerator::new(Arc::new(ValidatorRegistry::with_defaults()))
        .create_control_tree(&schema, None)
        .unwrap_err();

    assert_eq!(
        err,
        FormError::UnknownValidator {
            field: Some("postcode".to_string()),
            validator_type: "postcode".to_string(),
        }
    );
    assert!(err.to_string().contains("on field 'postcode'"));
}

#[test]
fn test_custom_validator_registration() -> anyhow::Result<()> {
    let mut registry = ValidatorRegistry::with_defaults();
    registry.register("postcode", |_descriptor| {
        Ok(validator_fn(|value: &Value| {
            let valid = value.as_str().map(|s| s.len() == 4).unwrap_or(true);
            if valid {
                None
            } else {
                let mut errors = ValidationErrors::new();
                errors.insert("postcode".to_string(), json!(true));
                Some(errors)
            }
        }))
    });

    let schema = FormSchema::builder()
        .field(FieldDescriptor::new("postcode", "text").validator(ValidatorDescriptor::new("postcode", "Bad postcode")))
        .build()?;
    let mut engine = FormEngine::build(&schema, None, Arc::new(registry), EngineSettings::default())?;

    engine.set_value("postcode", "12345")?;
    assert_eq!(engine.error_message("postcode")?, Some("Bad postcode".to_string()));
    engine.set_value("postcode", "2000")?;
    assert!(engine.is_valid());

    Ok(())
}

#[test]
fn test_schema_rejects_bad_layout() {
    let duplicate = FormSchema::builder()
        .field(FieldDescriptor::new("a", "text"))
        .field(FieldDescriptor::new("a", "number"))
        .build();
    assert_eq!(duplicate.unwrap_err(), FormError::DuplicateElement("a".to_string()));

    let dangling = FormSchema::builder()
        .field(FieldDescriptor::new("a", "text"))
        .layout(LayoutNode::grid(1, vec![LayoutNode::leaf("b")]))
        .build();
    assert_eq!(dangling.unwrap_err(), FormError::UnknownLayoutReference("b".to_string()));
}

#[test]
fn test_fixed_point_settles_forward_dependencies() -> anyhow::Result<()> {
    let schema = FormSchema::builder()
        .field(FieldDescriptor::new("gift", "checkbox").value(false))
        .field(FieldDescriptor::new("wrap", "select").visible_when(|form| form.is_enabled("message")))
        .field(FieldDescriptor::new("message", "text").visible_when(|form| form.bool("gift") == Some(true)))
        .build()?;

    let mut engine = FormEngine::build(
        &schema,
        None,
        Arc::new(ValidatorRegistry::with_defaults()),
        EngineSettings::fixed_point(),
    )?;
    assert!(!engine.is_field_visible("message")?);
    assert!(!engine.is_field_visible("wrap")?);

    let report = engine.set_value("gift", true)?;
    assert!(engine.is_field_visible("message")?);
    assert!(engine.is_field_visible("wrap")?);
    assert!(report.passes >= 2);

    Ok(())
}
