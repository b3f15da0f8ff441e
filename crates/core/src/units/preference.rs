//! Per-caller display unit preferences.

use serde::{Deserialize, Serialize};

use super::{Unit, UnitCategory};
use crate::error::CoreError;

/// The unit a reader wants each category displayed in.
///
/// Serializes as `{"length": "mm", "area": "sq_m", ...}`, which is the shape
/// echoed back to clients as `_display_units`. Every entry is guaranteed to
/// belong to its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PreferenceRecord")]
pub struct UserUnitPreference {
    length: Unit,
    area: Unit,
    volume: Unit,
    mass: Unit,
}

impl Default for UserUnitPreference {
    /// Storage units: mm, sq_m, cu_m, kg.
    fn default() -> Self {
        Self {
            length: UnitCategory::Length.storage_unit(),
            area: UnitCategory::Area.storage_unit(),
            volume: UnitCategory::Volume.storage_unit(),
            mass: UnitCategory::Mass.storage_unit(),
        }
    }
}

impl UserUnitPreference {
    /// Preferred unit for one category.
    pub fn get(&self, category: UnitCategory) -> Unit {
        match category {
            UnitCategory::Length => self.length,
            UnitCategory::Area => self.area,
            UnitCategory::Volume => self.volume,
            UnitCategory::Mass => self.mass,
        }
    }

    /// Replace the preferred unit of the unit's own category.
    pub fn with(mut self, unit: Unit) -> Self {
        match unit.category() {
            UnitCategory::Length => self.length = unit,
            UnitCategory::Area => self.area = unit,
            UnitCategory::Volume => self.volume = unit,
            UnitCategory::Mass => self.mass = unit,
        }
        self
    }

    /// Apply a partial settings update given as raw unit symbols.
    ///
    /// Categories missing from `update` keep their current unit.
    pub fn apply(self, update: &UnitPreferenceUpdate) -> Result<Self, CoreError> {
        let mut next = self;
        for (category, symbol) in update.entries() {
            let Some(symbol) = symbol else { continue };
            let unit = Unit::lookup(category, symbol).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid unit '{symbol}' for category '{category}'. Valid options: {}",
                    category.unit_symbols().join(", ")
                ))
            })?;
            next = next.with(unit);
        }
        Ok(next)
    }
}

/// Partial preference update, as submitted by a settings form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitPreferenceUpdate {
    pub length: Option<String>,
    pub area: Option<String>,
    pub volume: Option<String>,
    pub mass: Option<String>,
}

impl UnitPreferenceUpdate {
    fn entries(&self) -> [(UnitCategory, Option<&str>); 4] {
        [
            (UnitCategory::Length, self.length.as_deref()),
            (UnitCategory::Area, self.area.as_deref()),
            (UnitCategory::Volume, self.volume.as_deref()),
            (UnitCategory::Mass, self.mass.as_deref()),
        ]
    }
}

#[derive(Deserialize)]
struct PreferenceRecord {
    #[serde(default)]
    length: Option<Unit>,
    #[serde(default)]
    area: Option<Unit>,
    #[serde(default)]
    volume: Option<Unit>,
    #[serde(default)]
    mass: Option<Unit>,
}

impl TryFrom<PreferenceRecord> for UserUnitPreference {
    type Error = String;

    fn try_from(record: PreferenceRecord) -> Result<Self, Self::Error> {
        let mut pref = UserUnitPreference::default();
        let entries = [
            (UnitCategory::Length, record.length),
            (UnitCategory::Area, record.area),
            (UnitCategory::Volume, record.volume),
            (UnitCategory::Mass, record.mass),
        ];
        for (category, unit) in entries {
            let Some(unit) = unit else { continue };
            if unit.category() != category {
                return Err(format!(
                    "Unit '{unit}' cannot be used for category '{category}'"
                ));
            }
            pref = pref.with(unit);
        }
        Ok(pref)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_are_storage_units() {
        let pref = UserUnitPreference::default();
        assert_eq!(
            serde_json::to_value(pref).unwrap(),
            json!({"length": "mm", "area": "sq_m", "volume": "cu_m", "mass": "kg"})
        );
    }

    #[test]
    fn deserialize_fills_missing_categories_with_defaults() {
        let pref: UserUnitPreference = serde_json::from_value(json!({"length": "in"})).unwrap();
        assert_eq!(pref.get(UnitCategory::Length), Unit::Inch);
        assert_eq!(pref.get(UnitCategory::Mass), Unit::Kilogram);
    }

    #[test]
    fn deserialize_rejects_cross_category_unit() {
        let result: Result<UserUnitPreference, _> =
            serde_json::from_value(json!({"length": "lb"}));
        assert!(result.is_err());
    }

    #[test]
    fn apply_updates_only_supplied_categories() {
        let update = UnitPreferenceUpdate {
            length: Some("ft".into()),
            mass: Some("lb".into()),
            ..Default::default()
        };
        let pref = UserUnitPreference::default().apply(&update).unwrap();
        assert_eq!(pref.get(UnitCategory::Length), Unit::Foot);
        assert_eq!(pref.get(UnitCategory::Area), Unit::SquareMeter);
        assert_eq!(pref.get(UnitCategory::Mass), Unit::Pound);
    }

    #[test]
    fn apply_rejects_unknown_symbol() {
        let update = UnitPreferenceUpdate {
            area: Some("acre".into()),
            ..Default::default()
        };
        assert_matches!(
            UserUnitPreference::default().apply(&update),
            Err(CoreError::Validation(msg)) if msg.contains("sq_m, sq_ft")
        );
    }
}
