//! In-memory collaborators behind the HTTP layer.
//!
//! - [`SchemaStore`] publishes immutable [`AttributeSchema`] snapshots.
//! - [`AssetStore`] keeps asset records in storage units.
//! - [`PreferenceStore`] keeps per-client display units.
//!
//! Every store is safe to share behind `Arc` across handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use ephany_core::attributes::{AttributeDefinition, AttributeSchema};
use ephany_core::dimensions::StoredFields;
use ephany_core::error::CoreError;
use ephany_core::types::DbId;
use ephany_core::units::UserUnitPreference;
use tokio::sync::RwLock;

use crate::models::AssetRecord;

// ---------------------------------------------------------------------------
// Attribute schema
// ---------------------------------------------------------------------------

/// Holds the current attribute schema snapshot.
///
/// Readers clone the `Arc` once per request and use that snapshot for the
/// whole validate/convert pipeline. Writers build a new snapshot and swap it
/// in, so in-flight requests never observe a half-applied edit.
#[derive(Debug, Default)]
pub struct SchemaStore {
    current: RwLock<Arc<AttributeSchema>>,
}

impl SchemaStore {
    pub fn new(schema: AttributeSchema) -> Self {
        Self {
            current: RwLock::new(Arc::new(schema)),
        }
    }

    pub async fn snapshot(&self) -> Arc<AttributeSchema> {
        Arc::clone(&*self.current.read().await)
    }

    /// Add a definition by publishing a new snapshot.
    pub async fn add(&self, definition: AttributeDefinition) -> Result<Arc<AttributeSchema>, CoreError> {
        let mut current = self.current.write().await;
        let next = Arc::new(current.with_definition(definition)?);
        *current = Arc::clone(&next);
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Fields needed to insert a new asset.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub type_id: String,
    pub model: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: StoredFields,
}

#[derive(Debug)]
pub struct AssetStore {
    records: RwLock<BTreeMap<DbId, AssetRecord>>,
    next_id: AtomicI64,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl AssetStore {
    /// Insert a new asset. `type_id` must be unique.
    pub async fn create(&self, input: NewAsset) -> Result<AssetRecord, CoreError> {
        let mut records = self.records.write().await;
        ensure_unique_type_id(&records, &input.type_id, None)?;

        let now = chrono::Utc::now();
        let record = AssetRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            type_id: input.type_id,
            model: input.model,
            name: input.name,
            description: input.description,
            fields: input.fields,
            created_at: now,
            updated_at: now,
        };
        records.insert(record.id, record.clone());
        Ok(record)
    }

    pub async fn find_by_id(&self, id: DbId) -> Option<AssetRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Read-modify-write one asset under the store's write lock.
    ///
    /// `apply` receives the current record and returns its replacement; if it
    /// fails, the stored record is left untouched.
    pub async fn update_with<F>(&self, id: DbId, apply: F) -> Result<AssetRecord, CoreError>
    where
        F: FnOnce(&AssetRecord) -> Result<AssetRecord, CoreError>,
    {
        let mut records = self.records.write().await;
        let current = records
            .get(&id)
            .ok_or(CoreError::NotFound { entity: "Asset", id })?;

        let mut next = apply(current)?;
        ensure_unique_type_id(&records, &next.type_id, Some(id))?;
        next.id = id;
        next.updated_at = chrono::Utc::now();
        records.insert(id, next.clone());
        Ok(next)
    }
}

fn ensure_unique_type_id(
    records: &BTreeMap<DbId, AssetRecord>,
    type_id: &str,
    except: Option<DbId>,
) -> Result<(), CoreError> {
    let taken = records
        .values()
        .any(|r| r.type_id == type_id && Some(r.id) != except);
    if taken {
        return Err(CoreError::Conflict(format!(
            "Asset with type_id '{type_id}' already exists"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit preferences
// ---------------------------------------------------------------------------

/// Display unit preferences keyed by API client name.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    by_client: RwLock<HashMap<String, UserUnitPreference>>,
}

impl PreferenceStore {
    /// Stored preference for `client`, or storage units when none is stored.
    pub async fn get(&self, client: &str) -> UserUnitPreference {
        self.by_client
            .read()
            .await
            .get(client)
            .copied()
            .unwrap_or_default()
    }

    /// Read-modify-write the preference for `client` under one write lock.
    ///
    /// `apply` receives the stored preference (or the defaults); if it fails,
    /// nothing is stored.
    pub async fn update_with<F>(&self, client: &str, apply: F) -> Result<UserUnitPreference, CoreError>
    where
        F: FnOnce(UserUnitPreference) -> Result<UserUnitPreference, CoreError>,
    {
        let mut by_client = self.by_client.write().await;
        let current = by_client.get(client).copied().unwrap_or_default();
        let next = apply(current)?;
        by_client.insert(client.to_string(), next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ephany_core::attributes::DataType;
    use ephany_core::units::{Unit, UnitCategory, UnitPreferenceUpdate};

    use super::*;

    fn new_asset(type_id: &str) -> NewAsset {
        NewAsset {
            type_id: type_id.to_string(),
            model: "M-1".to_string(),
            name: None,
            description: None,
            fields: StoredFields::default(),
        }
    }

    #[tokio::test]
    async fn snapshots_are_not_affected_by_later_edits() {
        let store = SchemaStore::default();
        let before = store.snapshot().await;
        store
            .add(AttributeDefinition::new("finish", DataType::String, None).unwrap())
            .await
            .unwrap();
        assert!(before.get("finish").is_none());
        assert!(store.snapshot().await.get("finish").is_some());
    }

    #[tokio::test]
    async fn duplicate_type_ids_conflict() {
        let store = AssetStore::default();
        store.create(new_asset("AVN-1")).await.unwrap();
        assert_matches!(
            store.create(new_asset("AVN-1")).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn failed_update_keeps_record() {
        let store = AssetStore::default();
        let created = store.create(new_asset("AVN-1")).await.unwrap();
        let result = store
            .update_with(created.id, |_| Err(CoreError::Validation("nope".into())))
            .await;
        assert!(result.is_err());
        assert_eq!(store.find_by_id(created.id).await.unwrap().model, "M-1");
    }

    #[tokio::test]
    async fn update_missing_asset_is_not_found() {
        let store = AssetStore::default();
        assert_matches!(
            store.update_with(42, |r| Ok(r.clone())).await,
            Err(CoreError::NotFound { id: 42, .. })
        );
    }

    #[tokio::test]
    async fn preferences_default_to_storage_units() {
        let store = PreferenceStore::default();
        assert_eq!(store.get("anyone").await, UserUnitPreference::default());
        store
            .update_with("revit", |current| Ok(current.with(Unit::Foot)))
            .await
            .unwrap();
        assert_eq!(store.get("revit").await.get(UnitCategory::Length), Unit::Foot);
    }

    #[tokio::test]
    async fn concurrent_preference_updates_are_not_lost() {
        let store = Arc::new(PreferenceStore::default());
        let updates = [
            UnitPreferenceUpdate {
                length: Some("ft".into()),
                ..Default::default()
            },
            UnitPreferenceUpdate {
                mass: Some("lb".into()),
                ..Default::default()
            },
            UnitPreferenceUpdate {
                area: Some("sq_ft".into()),
                ..Default::default()
            },
        ];

        let handles: Vec<_> = updates
            .into_iter()
            .map(|update| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .update_with("revit", |current| current.apply(&update))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get("revit").await;
        assert_eq!(stored.get(UnitCategory::Length), Unit::Foot);
        assert_eq!(stored.get(UnitCategory::Mass), Unit::Pound);
        assert_eq!(stored.get(UnitCategory::Area), Unit::SquareFoot);
    }

    #[tokio::test]
    async fn failed_preference_update_stores_nothing() {
        let store = PreferenceStore::default();
        store
            .update_with("revit", |current| Ok(current.with(Unit::Foot)))
            .await
            .unwrap();
        let result = store
            .update_with("revit", |_| Err(CoreError::Validation("bad unit".into())))
            .await;
        assert!(result.is_err());
        assert_eq!(store.get("revit").await.get(UnitCategory::Length), Unit::Foot);
    }
}
