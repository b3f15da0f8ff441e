//! Handlers for asset types.
//!
//! Writes convert caller units into storage units before anything is stored;
//! reads convert back into the calling client's preferred units and echo them
//! as `_display_units`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ephany_core::attributes::{AttributeSchema, AttributeScope, CustomFieldBag, RawFieldBag};
use ephany_core::dimensions::{prepare_for_display, prepare_for_storage, prepare_update, StoredFields};
use ephany_core::error::CoreError;
use ephany_core::types::DbId;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::api_key::ApiClient;
use crate::models::{AssetRecord, AssetResponse, CreateAsset, UpdateAsset};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::NewAsset;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Schema snapshot used for asset type records.
async fn asset_schema(state: &AppState) -> AttributeSchema {
    state.schema.snapshot().await.scoped(AttributeScope::Type)
}

/// Read raw request custom fields against the schema snapshot.
fn parse_custom_fields(
    schema: &AttributeSchema,
    raw: Option<&RawFieldBag>,
) -> AppResult<Option<CustomFieldBag>> {
    let parsed = raw
        .map(|raw| schema.parse_custom_fields(raw))
        .transpose()
        .map_err(CoreError::from)?;
    Ok(parsed)
}

/// Convert a stored record into the client's display units.
async fn render(
    state: &AppState,
    schema: &AttributeSchema,
    client: &ApiClient,
    record: &AssetRecord,
) -> AppResult<AssetResponse> {
    let preference = state.preferences.get(&client.name).await;
    let values = prepare_for_display(
        schema,
        &record.fields.dimensions,
        &record.fields.custom_fields,
        &preference,
    )?;
    Ok(AssetResponse::new(record, values))
}

// ---------------------------------------------------------------------------
// Asset CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/assets
///
/// Create an asset. `input_units` is required for every unit category the
/// payload touches.
pub async fn create_asset(
    client: ApiClient,
    State(state): State<AppState>,
    Json(input): Json<CreateAsset>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let schema = asset_schema(&state).await;
    let custom_fields = parse_custom_fields(&schema, input.custom_fields.as_ref())?;
    let converted = prepare_for_storage(
        &schema,
        &input.dimensions,
        custom_fields.as_ref(),
        input.input_units.as_ref(),
    )?;

    let record = state
        .assets
        .create(NewAsset {
            type_id: input.type_id,
            model: input.model,
            name: input.name,
            description: input.description,
            fields: StoredFields::default().apply(converted),
        })
        .await?;

    tracing::info!(
        asset_id = record.id,
        type_id = %record.type_id,
        client = %client.name,
        "Asset created",
    );

    let body = render(&state, &schema, &client, &record).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: body })))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    client: ApiClient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .assets
        .find_by_id(id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Asset",
            id,
        }))?;

    let schema = asset_schema(&state).await;
    let body = render(&state, &schema, &client, &record).await?;
    Ok(Json(DataResponse { data: body }))
}

/// PATCH /api/v1/assets/{id}
///
/// Partial update. Supplied custom fields are validated and converted on
/// their own, then merged into the stored bag. Dimensions sent as `null` are
/// cleared.
pub async fn update_asset(
    client: ApiClient,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let schema = asset_schema(&state).await;
    let custom_fields = parse_custom_fields(&schema, input.custom_fields.as_ref())?;
    let record = state
        .assets
        .update_with(id, |current| {
            let fields = prepare_update(
                &schema,
                &current.fields,
                &input.dimensions,
                custom_fields.as_ref(),
                input.input_units.as_ref(),
            )?;
            Ok(AssetRecord {
                type_id: input.type_id.clone().unwrap_or_else(|| current.type_id.clone()),
                model: input.model.clone().unwrap_or_else(|| current.model.clone()),
                name: input.name.clone().or_else(|| current.name.clone()),
                description: input
                    .description
                    .clone()
                    .or_else(|| current.description.clone()),
                fields,
                ..current.clone()
            })
        })
        .await?;

    tracing::info!(
        asset_id = record.id,
        client = %client.name,
        "Asset updated",
    );

    let body = render(&state, &schema, &client, &record).await?;
    Ok(Json(DataResponse { data: body }))
}
