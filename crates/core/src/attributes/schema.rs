//! Attribute schema snapshot: key normalization and bag validation.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::definition::{AttributeDefinition, AttributeScope};
use super::value::{AttributeValue, CustomFieldBag, RawFieldBag};
use crate::error::{CoreError, FieldError};
use crate::units::UnitCategory;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static NON_KEY_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("valid regex"));

/// Map any raw spelling of an attribute name onto its canonical key.
///
/// Lowercases, trims, turns each run of internal whitespace into `_`, then
/// drops every character outside `[a-z0-9_]`. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let underscored = WHITESPACE_RE.replace_all(lowered.trim(), "_");
    NON_KEY_CHAR_RE.replace_all(&underscored, "").into_owned()
}

/// Immutable snapshot of the attribute definition table.
///
/// One snapshot is used for an entire validate/convert operation; admin edits
/// produce a new snapshot instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct AttributeSchema {
    definitions: BTreeMap<String, AttributeDefinition>,
}

impl AttributeSchema {
    /// Build a snapshot, rejecting repeated names.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = AttributeDefinition>,
    ) -> Result<Self, CoreError> {
        let mut schema = Self::default();
        for def in definitions {
            schema.insert(def)?;
        }
        Ok(schema)
    }

    /// Copy-on-write insert: returns a new snapshot containing `definition`.
    pub fn with_definition(&self, definition: AttributeDefinition) -> Result<Self, CoreError> {
        let mut next = self.clone();
        next.insert(definition)?;
        Ok(next)
    }

    fn insert(&mut self, definition: AttributeDefinition) -> Result<(), CoreError> {
        if self.definitions.contains_key(&definition.name) {
            return Err(CoreError::Conflict(format!(
                "Attribute '{}' already exists",
                definition.name
            )));
        }
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Snapshot restricted to attributes usable on `target` records.
    pub fn scoped(&self, target: AttributeScope) -> Self {
        Self {
            definitions: self
                .definitions
                .iter()
                .filter(|(_, def)| def.scope.covers(target))
                .map(|(name, def)| (name.clone(), def.clone()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Canonical names, sorted.
    pub fn allowed_keys(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Unit category of the attribute `key` refers to, if it is convertible.
    pub fn resolve_unit_category(&self, key: &str) -> Option<UnitCategory> {
        self.get(&normalize_key(key))
            .and_then(AttributeDefinition::category)
    }

    /// Read a request's custom fields into typed values, keeping raw keys.
    ///
    /// Values that can never be stored (lists, objects) are reported the
    /// same way as any other type mismatch, or as an unknown field when the
    /// key has no definition.
    pub fn parse_custom_fields(&self, raw: &RawFieldBag) -> Result<CustomFieldBag, FieldError> {
        raw.iter()
            .map(|(key, value)| {
                let parsed = AttributeValue::from_json(value).map_err(|runtime| {
                    let canonical = normalize_key(key);
                    match self.get(&canonical) {
                        Some(def) => FieldError::schema(format!(
                            "Invalid value for '{canonical}': Expected {}, got {runtime}",
                            def.data_type
                        )),
                        None => self.unknown_field(&canonical),
                    }
                })?;
                Ok((key.clone(), parsed))
            })
            .collect()
    }

    /// Validate a caller-supplied bag and re-key it by canonical names.
    ///
    /// Fails on keys that collide after normalization, keys with no
    /// definition, and values whose type does not match the definition.
    pub fn validate_and_normalize(&self, bag: &CustomFieldBag) -> Result<CustomFieldBag, FieldError> {
        let mut seen: HashMap<String, &str> = HashMap::with_capacity(bag.len());
        let mut keyed = Vec::with_capacity(bag.len());
        for (raw, value) in bag {
            let key = normalize_key(raw);
            if let Some(first) = seen.insert(key.clone(), raw) {
                return Err(FieldError::schema(format!(
                    "Duplicate field '{key}': '{first}' and '{raw}' refer to the same attribute"
                )));
            }
            keyed.push((key, value));
        }

        let mut normalized = CustomFieldBag::new();
        for (key, value) in keyed {
            let def = self.get(&key).ok_or_else(|| self.unknown_field(&key))?;
            if let Some(value) = value {
                if !def.data_type.accepts(value) {
                    return Err(FieldError::schema(format!(
                        "Invalid value for '{key}': Expected {}, got {}",
                        def.data_type,
                        value.type_name()
                    )));
                }
            }
            normalized.insert(key, value.clone());
        }
        Ok(normalized)
    }

    fn unknown_field(&self, key: &str) -> FieldError {
        let allowed = if self.is_empty() {
            "(none)".to_string()
        } else {
            self.allowed_keys().join(", ")
        };
        FieldError::schema(format!("Unknown field '{key}'. Allowed fields: {allowed}"))
    }
}
