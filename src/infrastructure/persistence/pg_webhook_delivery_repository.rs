//! PostgreSQL implementation of webhook delivery attempt records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewWebhookDelivery, WebhookDelivery, WebhookEvent};
use crate::domain::repositories::WebhookDeliveryRepository;
use crate::error::AppError;

pub struct PgWebhookDeliveryRepository {
    pool: Arc<PgPool>,
}

impl PgWebhookDeliveryRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

struct WebhookDeliveryRow {
    id: Uuid,
    webhook_id: Uuid,
    workspace_id: Uuid,
    event: String,
    payload: Vec<u8>,
    attempts: i32,
    max_attempts: i32,
    response_status: Option<i32>,
    response_body: Option<String>,
    last_attempt_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<WebhookDeliveryRow> for WebhookDelivery {
    fn from(r: WebhookDeliveryRow) -> Self {
        WebhookDelivery {
            id: r.id,
            webhook_id: r.webhook_id,
            workspace_id: r.workspace_id,
            event: WebhookEvent::from_str(&r.event).unwrap_or(WebhookEvent::LinkClicked),
            payload: r.payload,
            attempts: r.attempts,
            max_attempts: r.max_attempts,
            response_status: r.response_status,
            response_body: r.response_body,
            last_attempt_at: r.last_attempt_at,
            completed_at: r.completed_at,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl WebhookDeliveryRepository for PgWebhookDeliveryRepository {
    async fn create(&self, new_delivery: NewWebhookDelivery) -> Result<WebhookDelivery, AppError> {
        let event = new_delivery.event.as_str();

        let row = sqlx::query_as!(
            WebhookDeliveryRow,
            r#"
            INSERT INTO webhook_deliveries (webhook_id, workspace_id, event, payload, attempts, max_attempts)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING
                id, webhook_id, workspace_id, event, payload, attempts, max_attempts,
                response_status, response_body, last_attempt_at, completed_at, created_at
            "#,
            new_delivery.webhook_id,
            new_delivery.workspace_id,
            event,
            new_delivery.payload,
            new_delivery.max_attempts,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookDelivery>, AppError> {
        let row = sqlx::query_as!(
            WebhookDeliveryRow,
            r#"
            SELECT
                id, webhook_id, workspace_id, event, payload, attempts, max_attempts,
                response_status, response_body, last_attempt_at, completed_at, created_at
            FROM webhook_deliveries
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_webhook(
        &self,
        webhook_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<WebhookDelivery>, i64), AppError> {
        let rows = sqlx::query_as!(
            WebhookDeliveryRow,
            r#"
            SELECT
                id, webhook_id, workspace_id, event, payload, attempts, max_attempts,
                response_status, response_body, last_attempt_at, completed_at, created_at
            FROM webhook_deliveries
            WHERE webhook_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            webhook_id,
            limit,
            offset,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let total = sqlx::query_scalar!(
            "SELECT COUNT(*) FROM webhook_deliveries WHERE webhook_id = $1",
            webhook_id
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn record_attempt(
        &self,
        id: Uuid,
        attempts: i32,
        response_status: Option<i32>,
        response_body: Option<String>,
        last_attempt_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<WebhookDelivery, AppError> {
        let row = sqlx::query_as!(
            WebhookDeliveryRow,
            r#"
            UPDATE webhook_deliveries SET
                attempts = $2,
                response_status = $3,
                response_body = $4,
                last_attempt_at = $5,
                completed_at = COALESCE($6, completed_at)
            WHERE id = $1
            RETURNING
                id, webhook_id, workspace_id, event, payload, attempts, max_attempts,
                response_status, response_body, last_attempt_at, completed_at, created_at
            "#,
            id,
            attempts,
            response_status,
            response_body,
            last_attempt_at,
            completed_at,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
