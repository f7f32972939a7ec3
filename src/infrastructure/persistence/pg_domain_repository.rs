//! PostgreSQL implementation of domain repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Domain, NewDomain, SslStatus, UpdateDomain};
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;
use serde_json::json;

pub struct PgDomainRepository {
    pool: Arc<PgPool>,
}

impl PgDomainRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn parse_ssl_status(s: &str) -> SslStatus {
    match s {
        "active" => SslStatus::Active,
        "failed" => SslStatus::Failed,
        _ => SslStatus::Pending,
    }
}

struct DomainRow {
    id: i64,
    workspace_id: Uuid,
    domain: String,
    is_verified: bool,
    verified_at: Option<chrono::DateTime<chrono::Utc>>,
    ssl_status: String,
    ssl_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    last_dns_check_at: Option<chrono::DateTime<chrono::Utc>>,
    dns_records: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DomainRow> for Domain {
    fn from(r: DomainRow) -> Self {
        Domain {
            id: r.id,
            workspace_id: r.workspace_id,
            domain: r.domain,
            is_verified: r.is_verified,
            verified_at: r.verified_at,
            ssl_status: parse_ssl_status(&r.ssl_status),
            ssl_expires_at: r.ssl_expires_at,
            last_dns_check_at: r.last_dns_check_at,
            dns_records: r.dns_records,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

#[async_trait]
impl DomainRepository for PgDomainRepository {
    async fn create(&self, new_domain: NewDomain) -> Result<Domain, AppError> {
        let row = sqlx::query_as!(
            DomainRow,
            r#"
            INSERT INTO domains (workspace_id, domain, dns_records)
            VALUES ($1, $2, $3)
            RETURNING
                id, workspace_id, domain, is_verified, verified_at, ssl_status,
                ssl_expires_at, last_dns_check_at, dns_records, created_at,
                updated_at, deleted_at
            "#,
            new_domain.workspace_id,
            new_domain.domain,
            json!({ "verification_token": new_domain.verification_token }),
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as!(
            DomainRow,
            r#"
            SELECT
                id, workspace_id, domain, is_verified, verified_at, ssl_status,
                ssl_expires_at, last_dns_check_at, dns_records, created_at,
                updated_at, deleted_at
            FROM domains
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as!(
            DomainRow,
            r#"
            SELECT
                id, workspace_id, domain, is_verified, verified_at, ssl_status,
                ssl_expires_at, last_dns_check_at, dns_records, created_at,
                updated_at, deleted_at
            FROM domains
            WHERE domain = $1 AND deleted_at IS NULL
            "#,
            hostname
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, workspace_id: Uuid) -> Result<Vec<Domain>, AppError> {
        let rows = sqlx::query_as!(
            DomainRow,
            r#"
            SELECT
                id, workspace_id, domain, is_verified, verified_at, ssl_status,
                ssl_expires_at, last_dns_check_at, dns_records, created_at,
                updated_at, deleted_at
            FROM domains
            WHERE workspace_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
            workspace_id
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, workspace_id: Uuid, patch: UpdateDomain) -> Result<Domain, AppError> {
        let ssl_status = patch.ssl_status.map(|s| s.as_str().to_string());

        let row = sqlx::query_as!(
            DomainRow,
            r#"
            UPDATE domains SET
                is_verified = COALESCE($3, is_verified),
                verified_at = CASE WHEN $4 THEN $5 ELSE verified_at END,
                ssl_status = COALESCE($6, ssl_status),
                ssl_expires_at = CASE WHEN $7 THEN $8 ELSE ssl_expires_at END,
                last_dns_check_at = CASE WHEN $9 THEN $10 ELSE last_dns_check_at END,
                updated_at = now()
            WHERE id = $1 AND workspace_id = $2
            RETURNING
                id, workspace_id, domain, is_verified, verified_at, ssl_status,
                ssl_expires_at, last_dns_check_at, dns_records, created_at,
                updated_at, deleted_at
            "#,
            id,
            workspace_id,
            patch.is_verified,
            patch.verified_at.is_some(),
            patch.verified_at.flatten(),
            ssl_status,
            patch.ssl_expires_at.is_some(),
            patch.ssl_expires_at.flatten(),
            patch.last_dns_check_at.is_some(),
            patch.last_dns_check_at.flatten(),
        )
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found("domain not found", json!({ "id": id })))?;

        Ok(row.into())
    }

    async fn soft_delete(&self, id: i64, workspace_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query!(
            r#"
            UPDATE domains
            SET deleted_at = now()
            WHERE id = $1 AND workspace_id = $2 AND deleted_at IS NULL
            "#,
            id,
            workspace_id
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            "SELECT COUNT(*) FROM domains WHERE workspace_id = $1 AND deleted_at IS NULL",
            workspace_id
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok(count)
    }
}
