use std::sync::Arc;

use ephany_core::attributes::AttributeSchema;

use crate::config::ServerConfig;
use crate::store::{AssetStore, PreferenceStore, SchemaStore};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by the API key middleware).
    pub config: Arc<ServerConfig>,
    /// Attribute schema snapshots.
    pub schema: Arc<SchemaStore>,
    /// Asset records in storage units.
    pub assets: Arc<AssetStore>,
    /// Per-client display unit preferences.
    pub preferences: Arc<PreferenceStore>,
}

impl AppState {
    pub fn new(config: ServerConfig, schema: AttributeSchema) -> Self {
        Self {
            config: Arc::new(config),
            schema: Arc::new(SchemaStore::new(schema)),
            assets: Arc::new(AssetStore::default()),
            preferences: Arc::new(PreferenceStore::default()),
        }
    }
}
