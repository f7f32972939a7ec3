//! EventBus (E): publishes domain events to the WebhookDispatcher (durable)
//! and to the ClickProcessor's real-time broadcast channel (best-effort).

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::WebhookEvent;

/// A published domain event, queued for webhook delivery.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub event: WebhookEvent,
    pub workspace_id: Uuid,
    pub payload: Value,
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: WebhookEvent, workspace_id: Uuid, payload: Value);
}

/// Emits nothing. Used when webhook delivery is disabled for a deployment.
pub struct NullEventBus;

#[async_trait]
impl EventBus for NullEventBus {
    async fn publish(&self, _event: WebhookEvent, _workspace_id: Uuid, _payload: Value) {}
}

/// Forwards every published event onto an unbounded channel consumed by the
/// WebhookDispatcher's dispatch loop. Unbounded because publish happens on
/// request-serving paths (link/domain mutations) and must never block them;
/// the dispatcher itself is the backpressure point via its bounded worker
/// pool.
pub struct ChannelEventBus {
    sender: tokio::sync::mpsc::UnboundedSender<DomainEvent>,
}

impl ChannelEventBus {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<DomainEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventBus for ChannelEventBus {
    async fn publish(&self, event: WebhookEvent, workspace_id: Uuid, payload: Value) {
        let domain_event = DomainEvent {
            event,
            workspace_id,
            payload,
        };
        if self.sender.send(domain_event).is_err() {
            tracing::warn!(event = %event, "event bus receiver dropped, event lost");
        }
    }
}
