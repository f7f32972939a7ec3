//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;
use serde_json::json;

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection and type safety.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as!(
            Link,
            r#"
            INSERT INTO links (
                short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                workspace_id, user_id
            )
            VALUES (
                COALESCE($1, encode(gen_random_bytes(6), 'base64')), $2, $3, $4, $5,
                $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15,
                $16, $17
            )
            RETURNING
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            "#,
            new_link.short_code,
            new_link.destination_url,
            new_link.title,
            new_link.description,
            new_link.favicon_url,
            new_link.og_image_url,
            new_link.is_active,
            new_link.password_hash,
            new_link.expires_at,
            new_link.max_clicks,
            new_link.utm_source,
            new_link.utm_medium,
            new_link.utm_campaign,
            new_link.utm_term,
            new_link.utm_content,
            new_link.workspace_id,
            new_link.user_id,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn bulk_create(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(new_links.len());

        for new_link in new_links {
            let row = sqlx::query_as!(
                Link,
                r#"
                INSERT INTO links (
                    short_code, destination_url, title, description, favicon_url,
                    og_image_url, is_active, password_hash, expires_at, max_clicks,
                    utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                    workspace_id, user_id
                )
                VALUES (
                    COALESCE($1, encode(gen_random_bytes(6), 'base64')), $2, $3, $4, $5,
                    $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15,
                    $16, $17
                )
                RETURNING
                    id, short_code, destination_url, title, description, favicon_url,
                    og_image_url, is_active, password_hash, expires_at, max_clicks,
                    utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                    total_clicks, unique_clicks, workspace_id, user_id,
                    created_at, updated_at, deleted_at
                "#,
                new_link.short_code,
                new_link.destination_url,
                new_link.title,
                new_link.description,
                new_link.favicon_url,
                new_link.og_image_url,
                new_link.is_active,
                new_link.password_hash,
                new_link.expires_at,
                new_link.max_clicks,
                new_link.utm_source,
                new_link.utm_medium,
                new_link.utm_campaign,
                new_link.utm_term,
                new_link.utm_content,
                new_link.workspace_id,
                new_link.user_id,
            )
            .fetch_one(&mut *tx)
            .await?;

            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            Link,
            r#"
            SELECT
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            FROM links
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
            code
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            Link,
            r#"
            SELECT
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            FROM links
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_by_destination_url(
        &self,
        workspace_id: Uuid,
        destination_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as!(
            Link,
            r#"
            SELECT
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            FROM links
            WHERE workspace_id = $1 AND destination_url = $2 AND deleted_at IS NULL
            "#,
            workspace_id,
            destination_url
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn list(
        &self,
        workspace_id: Uuid,
        filter: LinkFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let search = filter.search.map(|s| format!("%{s}%"));

        let rows = sqlx::query_as!(
            Link,
            r#"
            SELECT
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            FROM links
            WHERE workspace_id = $1
              AND deleted_at IS NULL
              AND ($2::text IS NULL OR destination_url ILIKE $2 OR short_code ILIKE $2)
              AND ($3::boolean IS NULL OR is_active = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
            workspace_id,
            search,
            filter.is_active,
            limit,
            offset,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let total = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) FROM links
            WHERE workspace_id = $1
              AND deleted_at IS NULL
              AND ($2::text IS NULL OR destination_url ILIKE $2 OR short_code ILIKE $2)
              AND ($3::boolean IS NULL OR is_active = $3)
            "#,
            workspace_id,
            search,
            filter.is_active,
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok((rows, total))
    }

    async fn update(&self, id: i64, workspace_id: Uuid, patch: LinkPatch) -> Result<Link, AppError> {
        let row = sqlx::query_as!(
            Link,
            r#"
            UPDATE links SET
                destination_url = COALESCE($3, destination_url),
                title = CASE WHEN $4 THEN $5 ELSE title END,
                description = CASE WHEN $6 THEN $7 ELSE description END,
                favicon_url = CASE WHEN $8 THEN $9 ELSE favicon_url END,
                og_image_url = CASE WHEN $10 THEN $11 ELSE og_image_url END,
                is_active = COALESCE($12, is_active),
                password_hash = CASE WHEN $13 THEN $14 ELSE password_hash END,
                expires_at = CASE WHEN $15 THEN $16 ELSE expires_at END,
                max_clicks = CASE WHEN $17 THEN $18 ELSE max_clicks END,
                utm_source = CASE WHEN $19 THEN $20 ELSE utm_source END,
                utm_medium = CASE WHEN $21 THEN $22 ELSE utm_medium END,
                utm_campaign = CASE WHEN $23 THEN $24 ELSE utm_campaign END,
                utm_term = CASE WHEN $25 THEN $26 ELSE utm_term END,
                utm_content = CASE WHEN $27 THEN $28 ELSE utm_content END,
                updated_at = now()
            WHERE id = $1 AND workspace_id = $2
            RETURNING
                id, short_code, destination_url, title, description, favicon_url,
                og_image_url, is_active, password_hash, expires_at, max_clicks,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                total_clicks, unique_clicks, workspace_id, user_id,
                created_at, updated_at, deleted_at
            "#,
            id,
            workspace_id,
            patch.destination_url,
            patch.title.is_some(),
            patch.title.flatten(),
            patch.description.is_some(),
            patch.description.flatten(),
            patch.favicon_url.is_some(),
            patch.favicon_url.flatten(),
            patch.og_image_url.is_some(),
            patch.og_image_url.flatten(),
            patch.is_active,
            patch.password_hash.is_some(),
            patch.password_hash.flatten(),
            patch.expires_at.is_some(),
            patch.expires_at.flatten(),
            patch.max_clicks.is_some(),
            patch.max_clicks.flatten(),
            patch.utm_source.is_some(),
            patch.utm_source.flatten(),
            patch.utm_medium.is_some(),
            patch.utm_medium.flatten(),
            patch.utm_campaign.is_some(),
            patch.utm_campaign.flatten(),
            patch.utm_term.is_some(),
            patch.utm_term.flatten(),
            patch.utm_content.is_some(),
            patch.utm_content.flatten(),
        )
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found("link not found", json!({ "id": id })))?;

        Ok(row)
    }

    async fn soft_delete(&self, id: i64, workspace_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query!(
            r#"
            UPDATE links
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

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        sqlx::query!("UPDATE links SET total_clicks = total_clicks + 1 WHERE id = $1", id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn increment_unique_clicks(&self, id: i64) -> Result<(), AppError> {
        sqlx::query!("UPDATE links SET unique_clicks = unique_clicks + 1 WHERE id = $1", id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn count_active(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            "SELECT COUNT(*) FROM links WHERE workspace_id = $1 AND deleted_at IS NULL",
            workspace_id
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok(count)
    }
}
