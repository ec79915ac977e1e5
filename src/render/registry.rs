use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{FieldRenderer, RenderedNode};
use crate::domain::{ElementDescriptor, FormError, FormResult, FormSchema, LayoutNode};
use crate::engine::FormEngine;

/// Field type -> renderer lookup table.
#[derive(Default, Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn FieldRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, field_type: impl Into<String>, renderer: impl FieldRenderer + 'static) {
        let field_type = field_type.into();
        if self.renderers.insert(field_type.clone(), Arc::new(renderer)).is_some() {
            tracing::debug!(field_type = %field_type, "Replaced field renderer");
        }
    }

    pub fn contains(&self, field_type: &str) -> bool {
        self.renderers.contains_key(field_type)
    }

    pub fn resolve(&self, field_type: &str) -> FormResult<Arc<dyn FieldRenderer>> {
        self.renderers
            .get(field_type)
            .cloned()
            .ok_or_else(|| FormError::UnknownFieldType(field_type.to_string()))
    }

    /// Fail if any field in `schema` has no renderer.
    pub fn check_schema(&self, schema: &FormSchema) -> FormResult<()> {
        for field in schema.fields() {
            self.resolve(&field.field_type)?;
        }
        Ok(())
    }

    /// Walk the layout, binding every visible field to its renderer.
    /// Hidden fields are left out; grids and content pass through.
    pub fn render(&self, schema: &FormSchema, engine: &mut FormEngine) -> FormResult<Vec<RenderedNode>> {
        let mut nodes = Vec::new();
        self.render_node(schema.layout(), schema, engine, &mut nodes)?;
        Ok(nodes)
    }

    fn render_node(
        &self,
        node: &LayoutNode,
        schema: &FormSchema,
        engine: &mut FormEngine,
        out: &mut Vec<RenderedNode>,
    ) -> FormResult<()> {
        match node {
            LayoutNode::Grid { columns, children } => {
                let mut rendered = Vec::with_capacity(children.len());
                for child in children {
                    self.render_node(child, schema, engine, &mut rendered)?;
                }
                out.push(RenderedNode::Grid {
                    columns: *columns,
                    children: rendered,
                });
            }
            LayoutNode::Leaf { name, span } => match schema.element(name) {
                Some(ElementDescriptor::Field(field)) => {
                    if !engine.is_field_visible(&field.name)? {
                        return Ok(());
                    }
                    let renderer = self.resolve(&field.field_type)?;
                    let mut handle = engine.control_handle(&field.name)?;
                    out.push(RenderedNode::Field {
                        span: *span,
                        field: renderer.bind(&mut handle, field),
                    });
                }
                Some(ElementDescriptor::Content(content)) => out.push(RenderedNode::Content {
                    span: *span,
                    content: content.clone(),
                }),
                None => return Err(FormError::UnknownLayoutReference(name.clone())),
            },
        }
        Ok(())
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("RendererRegistry").field("field_types", &types).finish()
    }
}
