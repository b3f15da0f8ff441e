use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Settings routes mounted at `/settings`.
///
/// ```text
/// GET    /units  -> get_unit_settings
/// PUT    /units  -> put_unit_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/units",
        get(settings::get_unit_settings).put(settings::put_unit_settings),
    )
}
