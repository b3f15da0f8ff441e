//! API key check for protected path prefixes.

use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use ephany_core::error::CoreError;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client name used when the check is disabled or the path is unprotected.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// The caller resolved by [`require_api_key`].
///
/// Use this as an extractor parameter in any handler mounted behind the
/// middleware:
///
/// ```ignore
/// async fn my_handler(client: ApiClient) -> AppResult<Json<()>> {
///     tracing::info!(client = %client.name, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    pub name: String,
}

impl ApiClient {
    pub fn anonymous() -> Self {
        Self {
            name: ANONYMOUS_CLIENT.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Resolve the caller and attach it to the request as an [`ApiClient`].
///
/// - Check disabled, or path outside the protected prefixes: anonymous.
/// - No key in the `X-API-Key` header or `api_key` query parameter: 401.
/// - Key not registered: 403.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = &state.config.api_keys;

    let client = if !settings.enabled || !settings.is_protected(request.uri().path()) {
        ApiClient::anonymous()
    } else {
        let key = extract_key(&request).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("API key required.".into()))
        })?;
        let registered = settings.find_client(&key).ok_or_else(|| {
            tracing::warn!(path = %request.uri().path(), "Rejected unknown API key");
            AppError::Core(CoreError::Forbidden("Invalid or inactive API key.".into()))
        })?;
        ApiClient {
            name: registered.name.clone(),
        }
    };

    request.extensions_mut().insert(client);
    Ok(next.run(request).await)
}

/// Header first, then the `api_key` query parameter. Empty values count as
/// missing at either place.
fn extract_key(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<ApiKeyQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(q)| q.api_key)
            .filter(|key| !key.is_empty())
    })
}

impl<S: Send + Sync> FromRequestParts<S> for ApiClient {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ApiClient>().cloned().ok_or_else(|| {
            AppError::InternalError("API key middleware is not installed".into())
        })
    }
}
