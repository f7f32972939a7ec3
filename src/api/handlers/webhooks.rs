//! Handlers for webhook subscriber management and delivery history.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::pagination::PaginationMeta;
use crate::api::dto::webhooks::{
    CreateWebhookRequest, WebhookCreatedResponse, WebhookDeliveryListResponse, WebhookDeliveryQueryParams,
    WebhookDeliveryResponse, WebhookListResponse, WebhookResponse,
};
use crate::domain::entities::{ApiKey, ApiKeyScope};
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/v1/webhooks`
pub async fn create_webhook_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(payload): Json<CreateWebhookRequest>,
) -> Result<Json<WebhookCreatedResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::WebhooksWrite)?;

    let events = payload.parse_events()?;
    let (webhook, secret) = state.webhook_service.create(key.workspace_id, payload.url, events).await?;

    Ok(Json(WebhookCreatedResponse {
        webhook: WebhookResponse::from(webhook),
        secret,
    }))
}

/// `GET /api/v1/webhooks`
pub async fn list_webhooks_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
) -> Result<Json<WebhookListResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::WebhooksRead)?;

    let webhooks = state.webhook_service.list(key.workspace_id).await?;

    Ok(Json(WebhookListResponse {
        items: webhooks.into_iter().map(WebhookResponse::from).collect(),
    }))
}

/// `DELETE /api/v1/webhooks/{id}`
pub async fn delete_webhook_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<uuid::Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::WebhooksWrite)?;

    state.webhook_service.delete(id, key.workspace_id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// `GET /api/v1/webhooks/{id}/deliveries`
pub async fn list_webhook_deliveries_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<WebhookDeliveryQueryParams>,
) -> Result<Json<WebhookDeliveryListResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::WebhooksRead)?;

    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, serde_json::json!({})))?;

    let (deliveries, total) = state.webhook_service.list_deliveries(id, key.workspace_id, offset, limit).await?;

    Ok(Json(WebhookDeliveryListResponse {
        pagination: PaginationMeta::new(params.pagination.page(), params.pagination.page_size(), total),
        items: deliveries.into_iter().map(WebhookDeliveryResponse::from).collect(),
    }))
}
