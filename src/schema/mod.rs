//! Local view of the remote index schema.

pub mod field;
pub mod snapshot;

pub use field::{FieldDefinition, FieldOptions, FieldType};
pub use snapshot::{SchemaCell, SchemaSnapshot};
