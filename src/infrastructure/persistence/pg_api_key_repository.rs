//! PostgreSQL implementation of API key repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ApiKey, ApiKeyScope, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

/// PostgreSQL repository for Management API credentials.
///
/// Stores only `key_hash` (HMAC-SHA256 of the raw key) and `key_prefix`
/// (clear-text, for lookup); the raw key is never persisted.
pub struct PgApiKeyRepository {
    pool: Arc<PgPool>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

struct ApiKeyRow {
    id: Uuid,
    workspace_id: Uuid,
    name: String,
    key_prefix: String,
    key_hash: String,
    scopes: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
    rate_limit_override: Option<i32>,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(r: ApiKeyRow) -> Self {
        ApiKey {
            id: r.id,
            workspace_id: r.workspace_id,
            name: r.name,
            key_prefix: r.key_prefix,
            key_hash: r.key_hash,
            scopes: r.scopes.iter().filter_map(|s| ApiKeyScope::from_str(s)).collect(),
            expires_at: r.expires_at,
            rate_limit_override: r.rate_limit_override,
            last_used_at: r.last_used_at,
            created_at: r.created_at,
            revoked_at: r.revoked_at,
        }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let scopes: Vec<String> = new_key.scopes.iter().map(|s| s.as_str().to_string()).collect();

        let row = sqlx::query_as!(
            ApiKeyRow,
            r#"
            INSERT INTO api_keys (
                workspace_id, name, key_prefix, key_hash, scopes, expires_at, rate_limit_override
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, workspace_id, name, key_prefix, key_hash, scopes,
                expires_at, rate_limit_override, last_used_at, created_at, revoked_at
            "#,
            new_key.workspace_id,
            new_key.name,
            new_key.key_prefix,
            new_key.key_hash,
            &scopes,
            new_key.expires_at,
            new_key.rate_limit_override,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_prefix(&self, key_prefix: &str) -> Result<Option<ApiKey>, AppError> {
        let row = sqlx::query_as!(
            ApiKeyRow,
            r#"
            SELECT
                id, workspace_id, name, key_prefix, key_hash, scopes,
                expires_at, rate_limit_override, last_used_at, created_at, revoked_at
            FROM api_keys
            WHERE key_prefix = $1
            "#,
            key_prefix
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, workspace_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
        let rows = sqlx::query_as!(
            ApiKeyRow,
            r#"
            SELECT
                id, workspace_id, name, key_prefix, key_hash, scopes,
                expires_at, rate_limit_override, last_used_at, created_at, revoked_at
            FROM api_keys
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            "#,
            workspace_id
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query!("UPDATE api_keys SET last_used_at = $2 WHERE id = $1", id, at)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn revoke(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query!(
            r#"
            UPDATE api_keys
            SET revoked_at = now()
            WHERE id = $1 AND workspace_id = $2 AND revoked_at IS NULL
            "#,
            id,
            workspace_id
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
