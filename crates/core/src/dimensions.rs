//! Read/write orchestration for dimensional values.
//!
//! Ties the attribute schema registry to the unit conversion engine around a
//! record that has fixed length fields (overall height/width/depth) plus an
//! open custom-field bag:
//!
//! - [`prepare_for_storage`]: caller units to canonical storage units.
//! - [`prepare_for_display`]: storage units to the reader's preferred units.
//! - [`prepare_update`]: write path plus merge into the stored record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::attributes::{AttributeSchema, AttributeValue, CustomFieldBag};
use crate::error::{CoreError, FieldError};
use crate::units::{self, Unit, UnitCategory, UserUnitPreference};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fixed dimensional fields of an asset. Always length values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub overall_height: Option<f64>,
    #[serde(default)]
    pub overall_width: Option<f64>,
    #[serde(default)]
    pub overall_depth: Option<f64>,
}

impl Dimensions {
    pub fn any_present(&self) -> bool {
        self.overall_height.is_some() || self.overall_width.is_some() || self.overall_depth.is_some()
    }

    fn try_map<E>(self, mut f: impl FnMut(f64) -> Result<f64, E>) -> Result<Self, E> {
        Ok(Self {
            overall_height: self.overall_height.map(&mut f).transpose()?,
            overall_width: self.overall_width.map(&mut f).transpose()?,
            overall_depth: self.overall_depth.map(&mut f).transpose()?,
        })
    }

    /// Fields supplied in `update` overwrite ours; absent ones are kept.
    pub fn merged_with(self, update: Dimensions) -> Self {
        Self {
            overall_height: update.overall_height.or(self.overall_height),
            overall_width: update.overall_width.or(self.overall_width),
            overall_depth: update.overall_depth.or(self.overall_depth),
        }
    }
}

/// Fixed dimensional fields of a partial update.
///
/// Each field is `None` when the key is absent (keep the stored value),
/// `Some(None)` for an explicit `null` (clear it) and `Some(Some(v))` for a
/// new value in the caller's length unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct DimensionsPatch {
    #[serde(default, deserialize_with = "present")]
    pub overall_height: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub overall_width: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub overall_depth: Option<Option<f64>>,
}

impl DimensionsPatch {
    /// The values that were supplied, to be validated and converted.
    pub fn supplied(&self) -> Dimensions {
        Dimensions {
            overall_height: self.overall_height.flatten(),
            overall_width: self.overall_width.flatten(),
            overall_depth: self.overall_depth.flatten(),
        }
    }

    /// Drop every field that was explicitly set to `null`.
    fn clear_nulls(&self, dims: Dimensions) -> Dimensions {
        let keep = |patch: Option<Option<f64>>, value: Option<f64>| match patch {
            Some(None) => None,
            _ => value,
        };
        Dimensions {
            overall_height: keep(self.overall_height, dims.overall_height),
            overall_width: keep(self.overall_width, dims.overall_width),
            overall_depth: keep(self.overall_depth, dims.overall_depth),
        }
    }
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Raw `input_units` declaration: category name to unit symbol.
pub type InputUnits = BTreeMap<String, String>;

/// Write payload after validation and conversion, ready for persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageValues {
    pub dimensions: Dimensions,
    /// `None` when the caller supplied no custom fields at all.
    pub custom_fields: Option<CustomFieldBag>,
}

/// Everything persisted for a record, in storage units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredFields {
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub custom_fields: CustomFieldBag,
}

impl StoredFields {
    /// Merge a converted partial update into the stored record.
    ///
    /// Custom fields merge by canonical key: supplied keys overwrite, keys not
    /// mentioned in the update survive untouched.
    pub fn apply(&self, update: StorageValues) -> StoredFields {
        let custom_fields = match update.custom_fields {
            Some(supplied) => merge_custom_fields(&self.custom_fields, supplied),
            None => self.custom_fields.clone(),
        };
        StoredFields {
            dimensions: self.dimensions.merged_with(update.dimensions),
            custom_fields,
        }
    }
}

/// Read-path result: converted values plus the exact units used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayValues {
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub custom_fields: CustomFieldBag,
    #[serde(rename = "_display_units")]
    pub display_units: UserUnitPreference,
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

/// Validate and convert a write payload into canonical storage units.
///
/// Fails fast, before any value is converted:
///
/// 1. every category touched by a non-null value needs a declared unit
///    ([`FieldError::MissingUnitDeclaration`]);
/// 2. every declared unit must exist in its category
///    ([`FieldError::InvalidUnit`]);
/// 3. the custom bag must satisfy the schema ([`FieldError::SchemaViolation`]).
///
/// Categories that are not touched need not be declared.
pub fn prepare_for_storage(
    schema: &AttributeSchema,
    dimensions: &Dimensions,
    custom_fields: Option<&CustomFieldBag>,
    input_units: Option<&InputUnits>,
) -> Result<StorageValues, CoreError> {
    let touched = touched_categories(schema, dimensions, custom_fields);
    let empty = InputUnits::new();
    let declared = input_units.unwrap_or(&empty);

    let missing: Vec<UnitCategory> = touched
        .iter()
        .copied()
        .filter(|c| !declared.contains_key(c.as_str()))
        .collect();
    if !missing.is_empty() {
        return Err(FieldError::MissingUnitDeclaration { missing }.into());
    }

    let declared_units = resolve_declared_units(declared)?;

    let normalized = custom_fields
        .map(|bag| schema.validate_and_normalize(bag))
        .transpose()?;

    let dimensions = if dimensions.any_present() {
        let unit = declared_unit(&declared_units, UnitCategory::Length)?;
        dimensions.try_map(|v| units::to_storage(v, unit, UnitCategory::Length))?
    } else {
        *dimensions
    };

    let custom_fields = match normalized {
        Some(bag) => Some(convert_bag(
            schema,
            bag,
            |category| declared_unit(&declared_units, category),
            units::to_storage,
        )?),
        None => None,
    };

    tracing::debug!(
        categories = ?touched,
        "Converted write payload to storage units"
    );

    Ok(StorageValues {
        dimensions,
        custom_fields,
    })
}

/// Write path for partial updates: convert the supplied subset only, then
/// merge it into the currently stored record.
///
/// Dimensions set to `null` in `dimensions` are cleared; absent ones are kept.
pub fn prepare_update(
    schema: &AttributeSchema,
    current: &StoredFields,
    dimensions: &DimensionsPatch,
    custom_fields: Option<&CustomFieldBag>,
    input_units: Option<&InputUnits>,
) -> Result<StoredFields, CoreError> {
    let update = prepare_for_storage(schema, &dimensions.supplied(), custom_fields, input_units)?;
    let mut next = current.apply(update);
    next.dimensions = dimensions.clear_nulls(next.dimensions);
    Ok(next)
}

/// Merge `update` into `existing` by canonical key.
pub fn merge_custom_fields(existing: &CustomFieldBag, update: CustomFieldBag) -> CustomFieldBag {
    let mut merged = existing.clone();
    merged.extend(update);
    merged
}

fn touched_categories(
    schema: &AttributeSchema,
    dimensions: &Dimensions,
    custom_fields: Option<&CustomFieldBag>,
) -> BTreeSet<UnitCategory> {
    let mut touched = BTreeSet::new();
    if dimensions.any_present() {
        touched.insert(UnitCategory::Length);
    }
    for (key, value) in custom_fields.into_iter().flatten() {
        if value.is_none() {
            continue;
        }
        if let Some(category) = schema.resolve_unit_category(key) {
            touched.insert(category);
        }
    }
    touched
}

fn resolve_declared_units(declared: &InputUnits) -> Result<BTreeMap<UnitCategory, Unit>, FieldError> {
    let mut units = BTreeMap::new();
    for (category_name, symbol) in declared {
        let Ok(category) = category_name.parse::<UnitCategory>() else {
            tracing::debug!(category = %category_name, "Ignoring unit declaration for unknown category");
            continue;
        };
        let unit = Unit::lookup(category, symbol).ok_or_else(|| FieldError::InvalidUnit {
            category,
            unit: symbol.clone(),
            valid: category.unit_symbols(),
        })?;
        units.insert(category, unit);
    }
    Ok(units)
}

fn declared_unit(units: &BTreeMap<UnitCategory, Unit>, category: UnitCategory) -> Result<Unit, CoreError> {
    units.get(&category).copied().ok_or_else(|| {
        CoreError::Internal(format!("No unit resolved for touched category '{category}'"))
    })
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

/// Convert stored values into the reader's preferred units.
///
/// Custom values are converted only when their attribute resolves to a unit
/// category and the value is numeric; everything else passes through.
pub fn prepare_for_display(
    schema: &AttributeSchema,
    dimensions: &Dimensions,
    custom_fields: &CustomFieldBag,
    preference: &UserUnitPreference,
) -> Result<DisplayValues, CoreError> {
    let length = preference.get(UnitCategory::Length);
    let dimensions =
        dimensions.try_map(|v| units::from_storage(v, length, UnitCategory::Length))?;

    let custom_fields = convert_bag(
        schema,
        custom_fields.clone(),
        |category| Ok(preference.get(category)),
        units::from_storage,
    )?;

    Ok(DisplayValues {
        dimensions,
        custom_fields,
        display_units: *preference,
    })
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Rewrite every numeric value whose attribute has a unit category.
fn convert_bag(
    schema: &AttributeSchema,
    mut bag: CustomFieldBag,
    unit_for: impl Fn(UnitCategory) -> Result<Unit, CoreError>,
    convert: fn(f64, Unit, UnitCategory) -> Result<f64, units::ConversionError>,
) -> Result<CustomFieldBag, CoreError> {
    for (key, value) in bag.iter_mut() {
        let Some(category) = schema.resolve_unit_category(key) else {
            continue;
        };
        let Some(number) = value.as_ref().and_then(AttributeValue::as_f64) else {
            continue;
        };
        let converted = convert(number, unit_for(category)?, category)?;
        *value = Some(AttributeValue::Float(converted));
    }
    Ok(bag)
}
