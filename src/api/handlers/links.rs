//! Handlers for link creation, update, deletion and listing.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::links::{
    BulkCreateLinkRequest, BulkCreateLinkResponse, CreateLinkRequest, LinkListResponse, LinkQueryParams, LinkResponse,
    UpdateLinkRequest,
};
use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::NewLinkRequest;
use crate::domain::entities::{ApiKey, ApiKeyScope, LinkPatch};
use crate::domain::repositories::LinkFilter;
use crate::error::AppError;
use crate::state::AppState;

fn into_new_link_request(req: CreateLinkRequest, key: &ApiKey) -> NewLinkRequest {
    NewLinkRequest {
        short_code: req.short_code,
        destination_url: req.destination_url,
        title: req.title,
        description: req.description,
        favicon_url: req.favicon_url,
        og_image_url: req.og_image_url,
        is_active: req.is_active.unwrap_or(true),
        password: req.password,
        expires_at: req.expires_at,
        max_clicks: req.max_clicks,
        utm_source: req.utm_source,
        utm_medium: req.utm_medium,
        utm_campaign: req.utm_campaign,
        utm_term: req.utm_term,
        utm_content: req.utm_content,
        workspace_id: key.workspace_id,
        // API keys are workspace-scoped, not user-scoped — there is no
        // individual caller identity to attribute link creation to.
        user_id: None,
    }
}

/// `POST /api/v1/links`
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksWrite)?;
    payload.validate()?;

    let link = state.link_service.create(into_new_link_request(payload, &key)).await?;

    Ok(Json(LinkResponse::from_link(link, &state.config.redirect_base_url)))
}

/// `POST /api/v1/links/bulk`
pub async fn bulk_create_link_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(payload): Json<BulkCreateLinkRequest>,
) -> Result<Json<BulkCreateLinkResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksWrite)?;
    payload.validate()?;

    let requests = payload
        .links
        .into_iter()
        .map(|req| into_new_link_request(req, &key))
        .collect();

    let links = state.link_service.bulk_create(requests).await?;

    Ok(Json(BulkCreateLinkResponse {
        items: links
            .into_iter()
            .map(|l| LinkResponse::from_link(l, &state.config.redirect_base_url))
            .collect(),
    }))
}

/// `GET /api/v1/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Query(params): Query<LinkQueryParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksRead)?;

    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, serde_json::json!({})))?;

    let filter = LinkFilter {
        search: params.search,
        is_active: params.is_active,
    };

    let (links, total) = state.link_service.list(key.workspace_id, filter, offset, limit).await?;

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(params.pagination.page(), params.pagination.page_size(), total),
        items: links
            .into_iter()
            .map(|l| LinkResponse::from_link(l, &state.config.redirect_base_url))
            .collect(),
    }))
}

/// `GET /api/v1/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksRead)?;

    let link = state.link_service.get_by_id(id, key.workspace_id).await?;

    Ok(Json(LinkResponse::from_link(link, &state.config.redirect_base_url)))
}

/// `PATCH /api/v1/links/{id}`
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksWrite)?;
    payload.validate()?;

    let password_hash = match payload.password {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(hash_password_for_update(&raw)?)),
    };

    let patch = LinkPatch {
        destination_url: payload.destination_url,
        title: payload.title,
        description: payload.description,
        favicon_url: payload.favicon_url,
        og_image_url: payload.og_image_url,
        is_active: payload.is_active,
        password_hash: password_hash.unwrap_or(None).map(Some).or(None),
        expires_at: payload.expires_at,
        max_clicks: payload.max_clicks,
        utm_source: payload.utm_source,
        utm_medium: payload.utm_medium,
        utm_campaign: payload.utm_campaign,
        utm_term: payload.utm_term,
        utm_content: payload.utm_content,
        restore: payload.restore,
    };

    let link = state.link_service.update(id, key.workspace_id, patch).await?;

    Ok(Json(LinkResponse::from_link(link, &state.config.redirect_base_url)))
}

/// `DELETE /api/v1/links/{id}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::LinksWrite)?;

    state.link_service.soft_delete(id, key.workspace_id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn hash_password_for_update(raw: &str) -> Result<String, AppError> {
    use argon2::password_hash::{SaltString, rand_core::OsRng};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::fatal("failed to hash link password", serde_json::json!({ "error": e.to_string() })))
}
