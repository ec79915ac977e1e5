//! Control tree generation and the reactive form engine.

pub mod control;
pub mod events;
pub mod form;
pub mod generator;
mod guard;
pub mod handle;
pub mod tree;

pub use control::{BoundValidator, Control};
pub use events::{EventStream, Subscription};
pub use form::{FieldStatus, FormEngine, SubmitOutcome, TickReport};
pub use generator::FormGenerator;
pub use guard::INTERNAL_ERROR_KEY;
pub use handle::ControlHandle;
pub use tree::ControlTree;
