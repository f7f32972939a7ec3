//! Handlers for per-link click analytics.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::clicks::{ClickCountResponse, ClickListResponse, ClickQueryParams, ClickResponse};
use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::ApiKeyScope;
use crate::domain::entities::ApiKey;
use crate::domain::repositories::ClickFilter;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/v1/links/{id}/clicks`
pub async fn list_link_clicks_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(link_id): Path<i64>,
    Query(params): Query<ClickQueryParams>,
) -> Result<Json<ClickListResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::AnalyticsRead)?;

    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, serde_json::json!({})))?;

    let filter = ClickFilter {
        from: params.date_filter.from,
        to: params.date_filter.to,
    };

    let (clicks, total) = state
        .analytics_service
        .link_clicks(link_id, key.workspace_id, filter, offset, limit)
        .await?;

    Ok(Json(ClickListResponse {
        pagination: PaginationMeta::new(params.pagination.page(), params.pagination.page_size(), total),
        items: clicks.into_iter().map(ClickResponse::from).collect(),
    }))
}

/// `GET /api/v1/links/{id}/clicks/count`
pub async fn count_link_clicks_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(link_id): Path<i64>,
    Query(params): Query<ClickQueryParams>,
) -> Result<Json<ClickCountResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::AnalyticsRead)?;

    let filter = ClickFilter {
        from: params.date_filter.from,
        to: params.date_filter.to,
    };

    let count = state.analytics_service.click_count(link_id, key.workspace_id, filter).await?;

    Ok(Json(ClickCountResponse { count }))
}
