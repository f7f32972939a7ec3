//! PostgreSQL implementation of webhook subscriber repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewWebhook, Webhook, WebhookEvent};
use crate::domain::repositories::WebhookRepository;
use crate::error::AppError;

pub struct PgWebhookRepository {
    pool: Arc<PgPool>,
}

impl PgWebhookRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

struct WebhookRow {
    id: Uuid,
    workspace_id: Uuid,
    url: String,
    secret: String,
    events: Vec<String>,
    is_active: bool,
    failure_count: i32,
    last_triggered_at: Option<DateTime<Utc>>,
    last_success_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WebhookRow> for Webhook {
    fn from(r: WebhookRow) -> Self {
        Webhook {
            id: r.id,
            workspace_id: r.workspace_id,
            url: r.url,
            secret: r.secret,
            events: r.events.iter().filter_map(|s| WebhookEvent::from_str(s)).collect(),
            is_active: r.is_active,
            failure_count: r.failure_count,
            last_triggered_at: r.last_triggered_at,
            last_success_at: r.last_success_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl WebhookRepository for PgWebhookRepository {
    async fn create(&self, new_webhook: NewWebhook) -> Result<Webhook, AppError> {
        let events: Vec<String> = new_webhook.events.iter().map(|e| e.as_str().to_string()).collect();

        let row = sqlx::query_as!(
            WebhookRow,
            r#"
            INSERT INTO webhooks (workspace_id, url, secret, events)
            VALUES ($1, $2, $3, $4)
            RETURNING
                id, workspace_id, url, secret, events, is_active, failure_count,
                last_triggered_at, last_success_at, created_at, updated_at
            "#,
            new_webhook.workspace_id,
            new_webhook.url,
            new_webhook.secret,
            &events,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Webhook>, AppError> {
        let row = sqlx::query_as!(
            WebhookRow,
            r#"
            SELECT
                id, workspace_id, url, secret, events, is_active, failure_count,
                last_triggered_at, last_success_at, created_at, updated_at
            FROM webhooks
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, workspace_id: Uuid) -> Result<Vec<Webhook>, AppError> {
        let rows = sqlx::query_as!(
            WebhookRow,
            r#"
            SELECT
                id, workspace_id, url, secret, events, is_active, failure_count,
                last_triggered_at, last_success_at, created_at, updated_at
            FROM webhooks
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            "#,
            workspace_id
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_subscribers(&self, workspace_id: Uuid, event: WebhookEvent) -> Result<Vec<Webhook>, AppError> {
        let event_str = event.as_str();

        let rows = sqlx::query_as!(
            WebhookRow,
            r#"
            SELECT
                id, workspace_id, url, secret, events, is_active, failure_count,
                last_triggered_at, last_success_at, created_at, updated_at
            FROM webhooks
            WHERE workspace_id = $1 AND is_active = true AND $2 = ANY(events)
            "#,
            workspace_id,
            event_str,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query!(
            "DELETE FROM webhooks WHERE id = $1 AND workspace_id = $2",
            id,
            workspace_id
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_success(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query!(
            r#"
            UPDATE webhooks
            SET failure_count = 0, last_triggered_at = now(), last_success_at = now(), updated_at = now()
            WHERE id = $1
            "#,
            id
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn record_failure(&self, id: Uuid) -> Result<Webhook, AppError> {
        let row = sqlx::query_as!(
            WebhookRow,
            r#"
            UPDATE webhooks SET
                failure_count = failure_count + 1,
                last_triggered_at = now(),
                is_active = CASE WHEN failure_count + 1 >= $2 THEN false ELSE is_active END,
                updated_at = now()
            WHERE id = $1
            RETURNING
                id, workspace_id, url, secret, events, is_active, failure_count,
                last_triggered_at, last_success_at, created_at, updated_at
            "#,
            id,
            crate::domain::entities::Webhook::DISABLE_AFTER_FAILURES,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
