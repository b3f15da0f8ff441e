//! Asset and attribute records plus request DTOs.

use ephany_core::attributes::{AttributeScope, DataType, RawFieldBag};
use ephany_core::dimensions::{Dimensions, DimensionsPatch, DisplayValues, InputUnits, StoredFields};
use ephany_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs
// ---------------------------------------------------------------------------

/// A stored asset type. Dimensional values are in storage units.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRecord {
    pub id: DbId,
    pub type_id: String,
    pub model: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub fields: StoredFields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An asset as returned to a reader, converted into their preferred units.
#[derive(Debug, Clone, Serialize)]
pub struct AssetResponse {
    pub id: DbId,
    pub type_id: String,
    pub model: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub values: DisplayValues,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AssetResponse {
    pub fn new(record: &AssetRecord, values: DisplayValues) -> Self {
        Self {
            id: record.id,
            type_id: record.type_id.clone(),
            model: record.model.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            values,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating an asset. Dimensions are in the caller's `input_units`.
///
/// Custom fields stay raw JSON here so that badly shaped values are reported
/// as field errors rather than body rejections.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 100))]
    pub type_id: String,
    #[validate(length(min = 1, max = 255))]
    pub model: String,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub custom_fields: Option<RawFieldBag>,
    pub input_units: Option<InputUnits>,
}

/// DTO for partially updating an asset. Custom fields merge into the stored
/// bag; omitted fields are left unchanged and `null` dimensions are cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 100))]
    pub type_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub dimensions: DimensionsPatch,
    pub custom_fields: Option<RawFieldBag>,
    pub input_units: Option<InputUnits>,
}

/// DTO for defining a new custom attribute.
///
/// `unit_category` accepts short names (`"length"`) and Autodesk spec
/// identifiers (`"autodesk.spec.aec:length-2.0.0"`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAttribute {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub data_type: DataType,
    pub unit_category: Option<String>,
    #[serde(default)]
    pub scope: AttributeScope,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_asset_reads_flattened_dimensions() {
        let input: CreateAsset = serde_json::from_value(json!({
            "type_id": "AVN-1",
            "model": "A-19",
            "overall_height": 72,
            "overall_width": 27.5,
            "custom_fields": {"door_quantity": 2},
            "input_units": {"length": "in"},
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.dimensions.overall_height, Some(72.0));
        assert_eq!(input.dimensions.overall_depth, None);
        assert_eq!(input.custom_fields.as_ref().unwrap()["door_quantity"], json!(2));
    }

    #[test]
    fn create_asset_rejects_blank_type_id() {
        let input: CreateAsset =
            serde_json::from_value(json!({"type_id": "", "model": "A-19"})).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_asset_accepts_non_scalar_custom_values() {
        let input: CreateAsset = serde_json::from_value(json!({
            "type_id": "AVN-1",
            "model": "A-19",
            "custom_fields": {"finish": ["oak"]},
        }))
        .unwrap();
        assert_eq!(input.custom_fields.unwrap()["finish"], json!(["oak"]));
    }

    #[test]
    fn update_asset_tells_null_from_absent() {
        let input: UpdateAsset =
            serde_json::from_value(json!({"overall_height": null, "overall_width": 3})).unwrap();
        assert_eq!(input.dimensions.overall_height, Some(None));
        assert_eq!(input.dimensions.overall_width, Some(Some(3.0)));
        assert_eq!(input.dimensions.overall_depth, None);
    }
}
