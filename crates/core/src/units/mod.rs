//! Unit conversion engine.
//!
//! A closed table of linear scale factors between caller-facing units and the
//! canonical storage unit of each [`UnitCategory`]:
//! `value_in_user_unit * factor = value_in_storage_unit`.
//!
//! Storage units: length = mm, area = sq_m, volume = cu_m, mass = kg.

pub mod preference;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub use preference::{UnitPreferenceUpdate, UserUnitPreference};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Group of interchangeable units sharing one factor table.
///
/// Ordering follows declaration order so error messages list categories as
/// length, area, volume, mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Area,
    Volume,
    Mass,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Length,
        UnitCategory::Area,
        UnitCategory::Volume,
        UnitCategory::Mass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Area => "area",
            UnitCategory::Volume => "volume",
            UnitCategory::Mass => "mass",
        }
    }

    /// The unit every value of this category is persisted in.
    pub fn storage_unit(self) -> Unit {
        match self {
            UnitCategory::Length => Unit::Millimeter,
            UnitCategory::Area => Unit::SquareMeter,
            UnitCategory::Volume => Unit::CubicMeter,
            UnitCategory::Mass => Unit::Kilogram,
        }
    }

    /// Units registered under this category, in table order.
    pub fn units(self) -> &'static [Unit] {
        match self {
            UnitCategory::Length => &[
                Unit::Millimeter,
                Unit::Centimeter,
                Unit::Meter,
                Unit::Inch,
                Unit::Foot,
            ],
            UnitCategory::Area => &[Unit::SquareMeter, Unit::SquareFoot],
            UnitCategory::Volume => &[Unit::CubicMeter, Unit::CubicFoot],
            UnitCategory::Mass => &[Unit::Kilogram, Unit::Pound],
        }
    }

    /// Symbols of [`UnitCategory::units`], used in error messages.
    pub fn unit_symbols(self) -> Vec<&'static str> {
        self.units().iter().map(|u| u.symbol()).collect()
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "length" => Ok(UnitCategory::Length),
            "area" => Ok(UnitCategory::Area),
            "volume" => Ok(UnitCategory::Volume),
            "mass" => Ok(UnitCategory::Mass),
            other => Err(format!("Unknown unit category '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "sq_m")]
    SquareMeter,
    #[serde(rename = "sq_ft")]
    SquareFoot,
    #[serde(rename = "cu_m")]
    CubicMeter,
    #[serde(rename = "cu_ft")]
    CubicFoot,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::Inch => "in",
            Unit::Foot => "ft",
            Unit::SquareMeter => "sq_m",
            Unit::SquareFoot => "sq_ft",
            Unit::CubicMeter => "cu_m",
            Unit::CubicFoot => "cu_ft",
            Unit::Kilogram => "kg",
            Unit::Pound => "lb",
        }
    }

    pub fn category(self) -> UnitCategory {
        match self {
            Unit::Millimeter | Unit::Centimeter | Unit::Meter | Unit::Inch | Unit::Foot => {
                UnitCategory::Length
            }
            Unit::SquareMeter | Unit::SquareFoot => UnitCategory::Area,
            Unit::CubicMeter | Unit::CubicFoot => UnitCategory::Volume,
            Unit::Kilogram | Unit::Pound => UnitCategory::Mass,
        }
    }

    /// Storage units per one of this unit.
    pub fn factor(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Meter => 1000.0,
            Unit::Inch => 25.4,
            Unit::Foot => 304.8,
            Unit::SquareMeter => 1.0,
            Unit::SquareFoot => 0.092903,
            Unit::CubicMeter => 1.0,
            Unit::CubicFoot => 0.0283168,
            Unit::Kilogram => 1.0,
            Unit::Pound => 0.453592,
        }
    }

    /// Look up a unit symbol within one category.
    ///
    /// `"ft"` resolves under length but not under area.
    pub fn lookup(category: UnitCategory, symbol: &str) -> Option<Unit> {
        category
            .units()
            .iter()
            .copied()
            .find(|u| u.symbol() == symbol)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Raised when a conversion is attempted with a unit that is not registered
/// under the requested category.
///
/// Callers validate units before converting, so reaching this is a logic
/// defect rather than bad input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Unit '{unit}' is not registered for category '{category}'")]
    UnknownUnit { unit: Unit, category: UnitCategory },
}

impl From<ConversionError> for CoreError {
    fn from(err: ConversionError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

fn checked_factor(unit: Unit, category: UnitCategory) -> Result<f64, ConversionError> {
    if unit.category() != category {
        return Err(ConversionError::UnknownUnit { unit, category });
    }
    Ok(unit.factor())
}

/// Convert from a caller unit into the category's storage unit.
///
/// Example: `to_storage(10.0, Unit::Foot, UnitCategory::Length) == 3048.0`.
pub fn to_storage(value: f64, unit: Unit, category: UnitCategory) -> Result<f64, ConversionError> {
    Ok(value * checked_factor(unit, category)?)
}

/// Convert from the category's storage unit into a caller unit.
pub fn from_storage(
    value: f64,
    unit: Unit,
    category: UnitCategory,
) -> Result<f64, ConversionError> {
    Ok(value / checked_factor(unit, category)?)
}

/// [`to_storage`] for nullable values. `None` is never converted.
pub fn to_storage_opt(
    value: Option<f64>,
    unit: Unit,
    category: UnitCategory,
) -> Result<Option<f64>, ConversionError> {
    value.map(|v| to_storage(v, unit, category)).transpose()
}

/// [`from_storage`] for nullable values. `None` is never converted.
pub fn from_storage_opt(
    value: Option<f64>,
    unit: Unit,
    category: UnitCategory,
) -> Result<Option<f64>, ConversionError> {
    value.map(|v| from_storage(v, unit, category)).transpose()
}
