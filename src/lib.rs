//! # Formwright - configuration-driven forms
//!
//! Formwright turns a declarative [`FormSchema`](domain::FormSchema) into a
//! live form: one control per field, validators bound from a pluggable
//! registry, and a reactive engine that keeps visibility, enablement and
//! validity consistent with the values the user enters.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use formwright::config::EngineSettings;
//! use formwright::domain::{FieldDescriptor, FormSchema, ValidatorDescriptor};
//! use formwright::engine::FormEngine;
//! use formwright::validation::ValidatorRegistry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = FormSchema::builder()
//!     .field(FieldDescriptor::new("delivery", "select").value("pickup"))
//!     .field(
//!         FieldDescriptor::new("address", "text")
//!             .validator(ValidatorDescriptor::required("Address is required"))
//!             .visible_when(|form| form.str("delivery") == Some("ship")),
//!     )
//!     .build()?;
//!
//! let registry = Arc::new(ValidatorRegistry::with_defaults());
//! let mut engine = FormEngine::build(&schema, None, registry, EngineSettings::default())?;
//! assert!(engine.is_valid());
//!
//! engine.set_value("delivery", "ship")?;
//! assert!(!engine.is_valid());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema model, snapshot view and errors
//! - **Validation**: validator registry and built-in validators
//! - **Engine**: control tree generation and tick processing
//! - **Render**: field renderer resolution for UI adapters
//! - **Config**: engine settings

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod render;
pub mod validation;

pub use domain::{FormError, FormResult, FormSchema};
pub use engine::{FormEngine, FormGenerator};
pub use render::{FieldRenderer, RendererRegistry};
pub use validation::ValidatorRegistry;
