//! Route definitions for asset types.
//!
//! All routes are mounted under `/assets`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// ```text
/// POST   /      -> create_asset
/// GET    /{id}  -> get_asset
/// PATCH  /{id}  -> update_asset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(assets::create_asset))
        .route("/{id}", get(assets::get_asset).patch(assets::update_asset))
}
