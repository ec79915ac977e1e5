use std::collections::HashSet;

use super::error::{FormError, FormResult};
use super::schema::{ElementDescriptor, LayoutNode};

/// Construction-time checks for a schema. Fails on the first violation.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(elements: &[ElementDescriptor], layout: &LayoutNode) -> FormResult<()> {
        let names = Self::validate_names(elements)?;
        Self::validate_layout(layout, &names, None)
    }

    fn validate_names(elements: &[ElementDescriptor]) -> FormResult<HashSet<&str>> {
        let mut seen = HashSet::new();

        for element in elements {
            if !seen.insert(element.name()) {
                return Err(FormError::DuplicateElement(element.name().to_string()));
            }
        }

        Ok(seen)
    }

    fn validate_layout(node: &LayoutNode, names: &HashSet<&str>, parent_columns: Option<u16>) -> FormResult<()> {
        match node {
            LayoutNode::Leaf { name, span } => {
                if !names.contains(name.as_str()) {
                    return Err(FormError::UnknownLayoutReference(name.clone()));
                }

                match (span, parent_columns) {
                    (Some(0), _) => Err(FormError::InvalidLayout(format!(
                        "leaf '{}' has a zero column span",
                        name
                    ))),
                    (Some(span), Some(columns)) if *span > columns => Err(FormError::InvalidLayout(format!(
                        "leaf '{}' spans {} columns in a {}-column grid",
                        name, span, columns
                    ))),
                    _ => Ok(()),
                }
            }
            LayoutNode::Grid { columns, children } => {
                if *columns == 0 {
                    return Err(FormError::InvalidLayout("grid with zero columns".to_string()));
                }

                for child in children {
                    Self::validate_layout(child, names, Some(*columns))?;
                }

                Ok(())
            }
        }
    }
}
