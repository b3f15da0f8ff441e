pub mod assets;
pub mod attributes;
pub mod health;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /attributes                 list, define custom attributes
///
/// /assets                     create
/// /assets/{id}                get, partial update
///
/// /settings/units             get, update display units for the caller
/// ```
///
/// Every route here sits under the default `/api/` protected prefix, so the
/// API key middleware applies when enabled.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/attributes", attributes::router())
        .nest("/assets", assets::router())
        .nest("/settings", settings::router())
}
