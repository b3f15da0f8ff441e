//! Route definitions for custom attribute definitions.

use axum::routing::get;
use axum::Router;

use crate::handlers::attributes;
use crate::state::AppState;

/// Attribute routes mounted at `/attributes`.
///
/// ```text
/// GET    /  -> list_attributes
/// POST   /  -> create_attribute
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(attributes::list_attributes).post(attributes::create_attribute),
    )
}
