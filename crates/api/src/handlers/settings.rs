//! Handlers for per-client display unit settings.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use ephany_core::units::{UnitCategory, UnitPreferenceUpdate};

use crate::error::AppResult;
use crate::middleware::api_key::ApiClient;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings/units
pub async fn get_unit_settings(
    client: ApiClient,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let preference = state.preferences.get(&client.name).await;
    Ok(Json(DataResponse { data: preference }))
}

/// PUT /api/v1/settings/units
///
/// Omitted categories keep their current unit.
pub async fn put_unit_settings(
    client: ApiClient,
    State(state): State<AppState>,
    Json(input): Json<UnitPreferenceUpdate>,
) -> AppResult<impl IntoResponse> {
    let preference = state
        .preferences
        .update_with(&client.name, |current| current.apply(&input))
        .await?;

    tracing::info!(
        client = %client.name,
        length = preference.get(UnitCategory::Length).symbol(),
        area = preference.get(UnitCategory::Area).symbol(),
        volume = preference.get(UnitCategory::Volume).symbol(),
        mass = preference.get(UnitCategory::Mass).symbol(),
        "Unit settings updated",
    );

    Ok(Json(DataResponse { data: preference }))
}
