//! Repository trait for per-attempt webhook delivery records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{NewWebhookDelivery, WebhookDelivery};
use crate::error::AppError;

/// Repository interface for webhook delivery attempt records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgWebhookDeliveryRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookDeliveryRepository: Send + Sync {
    async fn create(&self, new_delivery: NewWebhookDelivery) -> Result<WebhookDelivery, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookDelivery>, AppError>;

    /// Paginated deliveries for a webhook, most recent first.
    async fn list_by_webhook(
        &self,
        webhook_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<WebhookDelivery>, i64), AppError>;

    /// Records the outcome of one delivery attempt.
    #[allow(clippy::too_many_arguments)]
    async fn record_attempt(
        &self,
        id: Uuid,
        attempts: i32,
        response_status: Option<i32>,
        response_body: Option<String>,
        last_attempt_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<WebhookDelivery, AppError>;
}
