//! DTOs for webhook subscriber management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pagination::{PaginationMeta, PaginationParams};
use crate::domain::entities::{Webhook, WebhookDelivery, WebhookEvent};
use crate::error::AppError;

/// Request body for `POST /api/v1/webhooks`.
///
/// `events` are wire names like `"link.created"` or `"link.clicked"`; see
/// [`WebhookEvent::from_str`] for the full set.
#[derive(Debug, Deserialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
}

impl CreateWebhookRequest {
    pub fn parse_events(&self) -> Result<Vec<WebhookEvent>, AppError> {
        self.events
            .iter()
            .map(|raw| {
                WebhookEvent::from_str(raw).ok_or_else(|| {
                    AppError::bad_request("Unknown webhook event", serde_json::json!({ "event": raw }))
                })
            })
            .collect()
    }
}

/// JSON representation of a webhook subscriber. The signing secret is never
/// included after creation.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub id: Uuid,
    pub url: String,
    pub events: Vec<String>,
    pub is_active: bool,
    pub failure_count: i32,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Webhook> for WebhookResponse {
    fn from(webhook: Webhook) -> Self {
        Self {
            id: webhook.id,
            url: webhook.url,
            events: webhook.events.iter().map(|e| e.as_str().to_string()).collect(),
            is_active: webhook.is_active,
            failure_count: webhook.failure_count,
            last_triggered_at: webhook.last_triggered_at,
            last_success_at: webhook.last_success_at,
            created_at: webhook.created_at,
            updated_at: webhook.updated_at,
        }
    }
}

/// Response for `POST /api/v1/webhooks`: the webhook plus its signing secret,
/// shown exactly once.
#[derive(Debug, Serialize)]
pub struct WebhookCreatedResponse {
    #[serde(flatten)]
    pub webhook: WebhookResponse,
    pub secret: String,
}

/// List of a workspace's webhooks.
#[derive(Debug, Serialize)]
pub struct WebhookListResponse {
    pub items: Vec<WebhookResponse>,
}

/// Query parameters for `GET /api/v1/webhooks/{id}/deliveries`.
#[derive(Debug, Deserialize)]
pub struct WebhookDeliveryQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// One delivery attempt record for a webhook.
#[derive(Debug, Serialize)]
pub struct WebhookDeliveryResponse {
    pub id: Uuid,
    pub event: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub response_status: Option<i32>,
    pub response_body: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<WebhookDelivery> for WebhookDeliveryResponse {
    fn from(delivery: WebhookDelivery) -> Self {
        Self {
            id: delivery.id,
            event: delivery.event.as_str().to_string(),
            attempts: delivery.attempts,
            max_attempts: delivery.max_attempts,
            response_status: delivery.response_status,
            response_body: delivery.response_body,
            last_attempt_at: delivery.last_attempt_at,
            completed_at: delivery.completed_at,
            created_at: delivery.created_at,
        }
    }
}

/// Paginated list of delivery attempts for a webhook.
#[derive(Debug, Serialize)]
pub struct WebhookDeliveryListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<WebhookDeliveryResponse>,
}
