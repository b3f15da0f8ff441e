//! Attribute definitions: the admin-managed schema of custom fields.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::value::AttributeValue;
use crate::error::CoreError;
use crate::units::UnitCategory;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an attribute name.
pub const MAX_ATTRIBUTE_NAME_LENGTH: usize = 100;

/// Canonical attribute names: lowercase alphanumerics and underscores.
pub const ATTRIBUTE_NAME_PATTERN: &str = r"^[a-z0-9_]+$";

static ATTRIBUTE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ATTRIBUTE_NAME_PATTERN).expect("valid regex"));

/// Prefix of Autodesk `SpecTypeId` strings sent by Revit-style clients.
const AUTODESK_SPEC_PREFIX: &str = "autodesk.spec.aec:";

// ---------------------------------------------------------------------------
// Data type
// ---------------------------------------------------------------------------

/// Declared type of an attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
        }
    }

    /// Whether `value` is acceptable for this declared type.
    ///
    /// Floats accept integers; nothing else is coerced.
    pub fn accepts(self, value: &AttributeValue) -> bool {
        match (self, value) {
            (DataType::String, AttributeValue::Str(_)) => true,
            (DataType::Integer, AttributeValue::Int(_)) => true,
            (DataType::Float, AttributeValue::Int(_) | AttributeValue::Float(_)) => true,
            (DataType::Boolean, AttributeValue::Bool(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Measure kind
// ---------------------------------------------------------------------------

/// Measurement classification of an attribute.
///
/// Only length, area, volume and mass map onto a convertible
/// [`UnitCategory`]; the others are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureKind {
    None,
    Length,
    Area,
    Volume,
    Mass,
    Angle,
    Slope,
    Number,
}

impl MeasureKind {
    pub fn unit_category(self) -> Option<UnitCategory> {
        match self {
            MeasureKind::Length => Some(UnitCategory::Length),
            MeasureKind::Area => Some(UnitCategory::Area),
            MeasureKind::Volume => Some(UnitCategory::Volume),
            MeasureKind::Mass => Some(UnitCategory::Mass),
            MeasureKind::None | MeasureKind::Angle | MeasureKind::Slope | MeasureKind::Number => {
                None
            }
        }
    }

    fn from_autodesk_spec(spec: &str) -> Option<Self> {
        match spec {
            "length-2.0.0" | "distance-1.0.0" => Some(MeasureKind::Length),
            "area-2.0.0" => Some(MeasureKind::Area),
            "volume-2.0.0" => Some(MeasureKind::Volume),
            "mass-2.0.0" | "massDensity-2.0.0" => Some(MeasureKind::Mass),
            "angle-2.0.0" => Some(MeasureKind::Angle),
            "slope-2.0.0" => Some(MeasureKind::Slope),
            "number-2.0.0" => Some(MeasureKind::Number),
            _ => None,
        }
    }
}

impl FromStr for MeasureKind {
    type Err = CoreError;

    /// Accepts short names (`"length"`) and Autodesk spec identifiers
    /// (`"autodesk.spec.aec:length-2.0.0"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(spec) = s.strip_prefix(AUTODESK_SPEC_PREFIX) {
            return MeasureKind::from_autodesk_spec(spec).ok_or_else(|| {
                CoreError::Validation(format!("Unsupported spec type '{s}'"))
            });
        }
        match s {
            "none" => Ok(MeasureKind::None),
            "length" => Ok(MeasureKind::Length),
            "area" => Ok(MeasureKind::Area),
            "volume" => Ok(MeasureKind::Volume),
            "mass" => Ok(MeasureKind::Mass),
            "angle" => Ok(MeasureKind::Angle),
            "slope" => Ok(MeasureKind::Slope),
            "number" => Ok(MeasureKind::Number),
            other => Err(CoreError::Validation(format!(
                "Unknown unit category '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Which records an attribute may be attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeScope {
    /// Library asset types.
    Type,
    /// Installed asset instances within a snapshot.
    Instance,
    #[default]
    Both,
}

impl AttributeScope {
    /// Whether an attribute with this scope is usable on `target` records.
    pub fn covers(self, target: AttributeScope) -> bool {
        self == AttributeScope::Both || self == target
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// One admin-defined custom attribute.
///
/// `name` is the canonical key used in stored bags; it is immutable once data
/// references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub data_type: DataType,
    pub unit_category: Option<MeasureKind>,
    #[serde(default)]
    pub scope: AttributeScope,
}

impl AttributeDefinition {
    /// Build a definition, validating the name.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        unit_category: Option<MeasureKind>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        validate_attribute_name(&name)?;
        Ok(Self {
            name,
            data_type,
            unit_category,
            scope: AttributeScope::Both,
        })
    }

    pub fn with_scope(mut self, scope: AttributeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Convertible category of this attribute's values, if any.
    pub fn category(&self) -> Option<UnitCategory> {
        self.unit_category.and_then(MeasureKind::unit_category)
    }
}

/// Validate a canonical attribute name.
pub fn validate_attribute_name(name: &str) -> Result<(), CoreError> {
    if name.len() > MAX_ATTRIBUTE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Attribute name must be at most {MAX_ATTRIBUTE_NAME_LENGTH} characters"
        )));
    }
    if !ATTRIBUTE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Attribute name '{name}' must contain only lowercase letters, digits and underscores"
        )));
    }
    Ok(())
}
