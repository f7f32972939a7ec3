//! Handlers for Management API credential self-service.
//!
//! Any valid, non-revoked key for a workspace may issue, list, and revoke
//! keys in that same workspace — key management isn't gated by a scope of
//! its own, since a key capable of calling the Management API at all is
//! already as privileged as whoever provisioned it.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::api_keys::{ApiKeyCreatedResponse, ApiKeyListResponse, ApiKeyResponse, CreateApiKeyRequest};
use crate::domain::entities::ApiKey;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/v1/api-keys`
pub async fn create_api_key_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(payload): Json<CreateApiKeyRequest>,
) -> Result<Json<ApiKeyCreatedResponse>, AppError> {
    let scopes = payload.parse_scopes()?;

    let (issued, raw_key) = state
        .api_key_service
        .issue(key.workspace_id, payload.name, scopes, payload.expires_at, payload.rate_limit_override)
        .await?;

    Ok(Json(ApiKeyCreatedResponse {
        api_key: ApiKeyResponse::from(issued),
        key: raw_key,
    }))
}

/// `GET /api/v1/api-keys`
pub async fn list_api_keys_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
) -> Result<Json<ApiKeyListResponse>, AppError> {
    let keys = state.api_key_service.list(key.workspace_id).await?;

    Ok(Json(ApiKeyListResponse {
        items: keys.into_iter().map(ApiKeyResponse::from).collect(),
    }))
}

/// `DELETE /api/v1/api-keys/{id}`
pub async fn revoke_api_key_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<uuid::Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.api_key_service.revoke(id, key.workspace_id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
