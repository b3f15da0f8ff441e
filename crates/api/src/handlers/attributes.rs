//! Handlers for custom attribute definitions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ephany_core::attributes::{AttributeDefinition, MeasureKind};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::api_key::ApiClient;
use crate::models::CreateAttribute;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/attributes
pub async fn list_attributes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let schema = state.schema.snapshot().await;
    let definitions: Vec<AttributeDefinition> = schema.definitions().cloned().collect();
    Ok(Json(DataResponse { data: definitions }))
}

/// POST /api/v1/attributes
///
/// Publishes a new schema snapshot. Requests already in flight keep the
/// snapshot they started with.
pub async fn create_attribute(
    client: ApiClient,
    State(state): State<AppState>,
    Json(input): Json<CreateAttribute>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let unit_category = input
        .unit_category
        .as_deref()
        .map(str::parse::<MeasureKind>)
        .transpose()?;

    let definition =
        AttributeDefinition::new(&input.name, input.data_type, unit_category)?.with_scope(input.scope);
    let schema = state.schema.add(definition.clone()).await?;

    tracing::info!(
        attribute = %definition.name,
        data_type = definition.data_type.as_str(),
        client = %client.name,
        schema_size = schema.len(),
        "Attribute defined",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: definition })))
}
