//! Handlers for custom-domain claiming and verification.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use validator::Validate;

use crate::api::dto::domains::{CreateDomainRequest, DomainCreatedResponse, DomainListResponse, DomainResponse};
use crate::domain::entities::{ApiKey, ApiKeyScope};
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/v1/domains`
pub async fn create_domain_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Json(payload): Json<CreateDomainRequest>,
) -> Result<Json<DomainCreatedResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::DomainsWrite)?;
    payload.validate()?;

    let domain = state.domain_service.add_domain(key.workspace_id, &payload.domain).await?;
    let instructions = state.domain_service.get_instructions(&domain);

    Ok(Json(DomainCreatedResponse {
        domain: DomainResponse::from(domain),
        instructions,
    }))
}

/// `GET /api/v1/domains`
pub async fn list_domains_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
) -> Result<Json<DomainListResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::DomainsRead)?;

    let domains = state.domain_service.list(key.workspace_id).await?;

    Ok(Json(DomainListResponse {
        items: domains.into_iter().map(DomainResponse::from).collect(),
    }))
}

/// `GET /api/v1/domains/{id}`
pub async fn get_domain_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
) -> Result<Json<DomainResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::DomainsRead)?;

    let domain = state.domain_service.get(id, key.workspace_id).await?;

    Ok(Json(DomainResponse::from(domain)))
}

/// `POST /api/v1/domains/{id}/verify`
pub async fn verify_domain_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
) -> Result<Json<DomainResponse>, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::DomainsWrite)?;

    let domain = state.domain_service.verify(id, key.workspace_id, Utc::now()).await?;

    Ok(Json(DomainResponse::from(domain)))
}

/// `DELETE /api/v1/domains/{id}`
pub async fn delete_domain_handler(
    State(state): State<AppState>,
    Extension(key): Extension<ApiKey>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    state.api_key_service.authorize(&key, ApiKeyScope::DomainsWrite)?;

    state.domain_service.remove(id, key.workspace_id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
