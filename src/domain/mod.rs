//! Schema model and the value types shared by the engine and its consumers.

pub mod error;
pub mod schema;
pub mod snapshot;
pub mod validator;

pub use error::{FormError, FormResult};
pub use schema::*;
pub use snapshot::FormSnapshot;
