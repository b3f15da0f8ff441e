//! Attribute schema registry.
//!
//! Owns the set of valid custom-field keys with their declared types and
//! measurement classification, and validates caller-supplied field bags
//! against a schema snapshot. Pure logic, no database access.

pub mod definition;
pub mod schema;
pub mod value;

pub use definition::{AttributeDefinition, AttributeScope, DataType, MeasureKind};
pub use schema::{normalize_key, AttributeSchema};
pub use value::{AttributeValue, CustomFieldBag, RawFieldBag};
