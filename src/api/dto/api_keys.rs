//! DTOs for Management API credential issuance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{ApiKey, ApiKeyScope};
use crate::error::AppError;

/// Request body for `POST /api/v1/api-keys`.
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit_override: Option<i32>,
}

impl CreateApiKeyRequest {
    pub fn parse_scopes(&self) -> Result<Vec<ApiKeyScope>, AppError> {
        self.scopes
            .iter()
            .map(|raw| {
                ApiKeyScope::from_str(raw)
                    .ok_or_else(|| AppError::bad_request("Unknown API key scope", serde_json::json!({ "scope": raw })))
            })
            .collect()
    }
}

/// JSON representation of an API key. The raw key is never included after
/// the issuing response — only `key_prefix` is shown afterward.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit_override: Option<i32>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            scopes: key.scopes.iter().map(|s| s.as_str().to_string()).collect(),
            expires_at: key.expires_at,
            rate_limit_override: key.rate_limit_override,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
            revoked_at: key.revoked_at,
        }
    }
}

/// Response for `POST /api/v1/api-keys`: the key record plus the raw key,
/// shown exactly once.
#[derive(Debug, Serialize)]
pub struct ApiKeyCreatedResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    pub key: String,
}

/// List of a workspace's API keys.
#[derive(Debug, Serialize)]
pub struct ApiKeyListResponse {
    pub items: Vec<ApiKeyResponse>,
}
