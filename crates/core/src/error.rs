use crate::types::DbId;
use crate::units::UnitCategory;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A field-keyed input error raised by the schema registry or the unit
    /// orchestration. Surfaced to callers verbatim.
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request field that carries the custom attribute bag.
pub const FIELD_CUSTOM_FIELDS: &str = "custom_fields";

/// Request field that carries the per-category unit declaration.
pub const FIELD_INPUT_UNITS: &str = "input_units";

/// Input validation failure on the asset read/write path.
///
/// Every variant names the request field it belongs to (see [`FieldError::field`])
/// so the HTTP layer can return `{"<field>": "<message>"}` bodies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// Unknown key, duplicate key after normalization, or type mismatch.
    #[error("{message}")]
    SchemaViolation { field: String, message: String },

    /// One or more touched categories have no declared input unit.
    #[error("Required units for: {}", join_categories(missing))]
    MissingUnitDeclaration { missing: Vec<UnitCategory> },

    /// A declared unit is not registered under its category.
    #[error(
        "Invalid unit '{unit}' for category '{category}'. Valid options: {}",
        valid.join(", ")
    )]
    InvalidUnit {
        category: UnitCategory,
        unit: String,
        valid: Vec<&'static str>,
    },
}

impl FieldError {
    /// Build a schema violation against the `custom_fields` request field.
    pub fn schema(message: impl Into<String>) -> Self {
        FieldError::SchemaViolation {
            field: FIELD_CUSTOM_FIELDS.to_string(),
            message: message.into(),
        }
    }

    /// Name of the request field the error is reported under.
    pub fn field(&self) -> &str {
        match self {
            FieldError::SchemaViolation { field, .. } => field,
            FieldError::MissingUnitDeclaration { .. } | FieldError::InvalidUnit { .. } => {
                FIELD_INPUT_UNITS
            }
        }
    }
}

fn join_categories(categories: &[UnitCategory]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
