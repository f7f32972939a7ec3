//! WebhookDispatcher (W): consumes the domain event stream, signs, and
//! delivers to subscribers with bounded retries and exponential backoff,
//! per §4.7.

use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::json;
use sha2::Sha256;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::domain::entities::{
    NewWebhookDelivery, WebhookDelivery, truncate_response_body,
};
use crate::domain::event_bus::DomainEvent;
use crate::domain::repositories::{WebhookDeliveryRepository, WebhookRepository};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

type HmacSha256 = Hmac<Sha256>;

/// Computes `hex(HMAC-SHA256(payload, secret))`.
fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Applies ±20% jitter to a base delay.
fn jittered(base: Duration) -> Duration {
    let factor = rand::rng().random_range(0.8..=1.2);
    Duration::from_secs_f64(base.as_secs_f64() * factor)
}

/// Builds the wire-exact envelope body for one delivery.
fn build_envelope(event: &DomainEvent) -> Vec<u8> {
    let envelope = json!({
        "event": event.event.as_str(),
        "workspace_id": event.workspace_id,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "data": event.payload,
    });
    serde_json::to_vec(&envelope).unwrap_or_default()
}

/// Delivers one attempt of one webhook delivery, recording the outcome.
/// Retries internally until exhaustion or terminal success.
async fn dispatch_to_webhook<WR, WD>(
    client: reqwest::Client,
    webhook_repo: Arc<WR>,
    delivery_repo: Arc<WD>,
    webhook_id: Uuid,
    webhook_url: String,
    webhook_secret: String,
    max_attempts: i32,
    delivery: WebhookDelivery,
) where
    WR: WebhookRepository,
    WD: WebhookDeliveryRepository,
{
    let mut delivery = delivery;
    let signature = sign_payload(&delivery.payload, &webhook_secret);

    loop {
        delivery.attempts += 1;
        let attempt = delivery.attempts;

        let response = client
            .post(&webhook_url)
            .header("Content-Type", "application/json")
            .header("X-Linkrift-Event", delivery.event.as_str())
            .header("X-Linkrift-Delivery", delivery.id.to_string())
            .header("X-Linkrift-Signature", format!("sha256={}", signature))
            .timeout(DELIVERY_TIMEOUT)
            .body(delivery.payload.clone())
            .send()
            .await;

        let now = chrono::Utc::now();
        let (status, body, success) = match response {
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                let ok = resp.status().is_success();
                let body = resp.text().await.unwrap_or_default();
                (Some(status), Some(truncate_response_body(&body)), ok)
            }
            Err(e) => {
                tracing::warn!(webhook_id = %webhook_id, attempt, error = %e, "webhook delivery attempt failed");
                (None, None, false)
            }
        };

        let completed_at = if success { Some(now) } else { None };

        match delivery_repo
            .record_attempt(delivery.id, attempt, status, body, now, completed_at)
            .await
        {
            Ok(updated) => delivery = updated,
            Err(e) => {
                tracing::error!(webhook_id = %webhook_id, delivery_id = %delivery.id, error = ?e, "failed to record delivery attempt");
            }
        }

        if success {
            metrics::counter!("webhook_delivery_succeeded_total").increment(1);
            if let Err(e) = webhook_repo.record_success(webhook_id).await {
                tracing::error!(webhook_id = %webhook_id, error = ?e, "failed to record webhook success");
            }
            return;
        }

        if attempt >= max_attempts {
            metrics::counter!("webhook_delivery_exhausted_total").increment(1);
            match webhook_repo.record_failure(webhook_id).await {
                Ok(webhook) if !webhook.is_active => {
                    tracing::warn!(webhook_id = %webhook_id, "webhook disabled after reaching failure threshold");
                }
                Err(e) => tracing::error!(webhook_id = %webhook_id, error = ?e, "failed to record webhook failure"),
                _ => {}
            }
            return;
        }

        let Some(delay) = delivery.next_retry_delay() else {
            return;
        };
        tokio::time::sleep(jittered(delay)).await;
    }
}

/// Fans a published [`DomainEvent`] out to every active subscriber in its
/// workspace, queuing one [`WebhookDelivery`] per subscriber.
async fn dispatch_event<WR, WD>(
    client: reqwest::Client,
    webhook_repo: Arc<WR>,
    delivery_repo: Arc<WD>,
    event: DomainEvent,
    max_attempts: i32,
    join_set: &mut JoinSet<()>,
    concurrency: usize,
) where
    WR: WebhookRepository + 'static,
    WD: WebhookDeliveryRepository + 'static,
{
    let subscribers = match webhook_repo.find_subscribers(event.workspace_id, event.event).await {
        Ok(subs) => subs,
        Err(e) => {
            tracing::error!(workspace_id = %event.workspace_id, error = ?e, "failed to look up webhook subscribers");
            return;
        }
    };

    let payload = build_envelope(&event);

    for webhook in subscribers {
        let new_delivery = NewWebhookDelivery {
            webhook_id: webhook.id,
            workspace_id: event.workspace_id,
            event: event.event,
            payload: payload.clone(),
            max_attempts,
        };

        let delivery = match delivery_repo.create(new_delivery).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(webhook_id = %webhook.id, error = ?e, "failed to create delivery record");
                continue;
            }
        };

        while join_set.try_join_next().is_some() {}
        if join_set.len() >= concurrency {
            join_set.join_next().await;
        }

        let client = client.clone();
        let webhook_repo = webhook_repo.clone();
        let delivery_repo = delivery_repo.clone();
        let webhook_id = webhook.id;
        let webhook_url = webhook.url.clone();
        let webhook_secret = webhook.secret.clone();

        join_set.spawn(async move {
            dispatch_to_webhook(
                client,
                webhook_repo,
                delivery_repo,
                webhook_id,
                webhook_url,
                webhook_secret,
                max_attempts,
                delivery,
            )
            .await;
        });
    }
}

/// Runs the WebhookDispatcher, draining published domain events and
/// delivering them with bounded worker concurrency.
///
/// Exits when the sending side of `rx` is dropped; in-flight deliveries are
/// drained before returning.
pub async fn run_webhook_dispatcher<WR, WD>(
    mut rx: mpsc::UnboundedReceiver<DomainEvent>,
    webhook_repo: Arc<WR>,
    delivery_repo: Arc<WD>,
    max_attempts: i32,
    concurrency: usize,
) where
    WR: WebhookRepository + 'static,
    WD: WebhookDeliveryRepository + 'static,
{
    tracing::info!(concurrency, "webhook dispatcher started");

    let client = reqwest::Client::builder()
        .timeout(DELIVERY_TIMEOUT)
        .build()
        .expect("reqwest client builds with default TLS config");

    let mut join_set: JoinSet<()> = JoinSet::new();

    while let Some(event) = rx.recv().await {
        dispatch_event(
            client.clone(),
            webhook_repo.clone(),
            delivery_repo.clone(),
            event,
            max_attempts,
            &mut join_set,
            concurrency,
        )
        .await;
    }

    while join_set.join_next().await.is_some() {}

    tracing::info!("webhook dispatcher stopped");
}
