//! WebhookDelivery entity: the per-attempt record for one queued delivery.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::webhook::WebhookEvent;

/// The backoff schedule for attempts 2-5 (attempt 1 is immediate).
pub const RETRY_DELAYS: [std::time::Duration; 4] = [
    std::time::Duration::from_secs(30),
    std::time::Duration::from_secs(2 * 60),
    std::time::Duration::from_secs(10 * 60),
    std::time::Duration::from_secs(60 * 60),
];

/// Truncation limit applied to `response_body` before it is persisted.
pub const RESPONSE_BODY_TRUNCATE_BYTES: usize = 2 * 1024;

/// One webhook's delivery of one event, tracked across retries.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub workspace_id: Uuid,
    pub event: WebhookEvent,
    pub payload: Vec<u8>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub response_status: Option<i32>,
    pub response_body: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl WebhookDelivery {
    pub fn is_terminal_success(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.completed_at.is_none() && self.attempts >= self.max_attempts
    }

    /// Delay before the next attempt, or `None` if no more retries remain.
    pub fn next_retry_delay(&self) -> Option<std::time::Duration> {
        if self.is_terminal_success() || self.is_exhausted() {
            return None;
        }
        let index = (self.attempts - 1).max(0) as usize;
        RETRY_DELAYS.get(index).copied()
    }
}

#[derive(Debug, Clone)]
pub struct NewWebhookDelivery {
    pub webhook_id: Uuid,
    pub workspace_id: Uuid,
    pub event: WebhookEvent,
    pub payload: Vec<u8>,
    pub max_attempts: i32,
}

pub fn truncate_response_body(body: &str) -> String {
    if body.len() <= RESPONSE_BODY_TRUNCATE_BYTES {
        return body.to_string();
    }
    let mut end = RESPONSE_BODY_TRUNCATE_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WebhookDelivery {
        WebhookDelivery {
            id: Uuid::new_v4(),
            webhook_id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            event: WebhookEvent::LinkCreated,
            payload: b"{}".to_vec(),
            attempts: 0,
            max_attempts: 5,
            response_status: None,
            response_body: None,
            last_attempt_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn retry_schedule_matches_spec() {
        let mut delivery = sample();
        delivery.attempts = 1;
        assert_eq!(delivery.next_retry_delay(), Some(RETRY_DELAYS[0]));
        delivery.attempts = 4;
        assert_eq!(delivery.next_retry_delay(), Some(RETRY_DELAYS[3]));
        delivery.attempts = 5;
        assert_eq!(delivery.next_retry_delay(), None);
        assert!(delivery.is_exhausted());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "x".repeat(RESPONSE_BODY_TRUNCATE_BYTES + 10);
        let truncated = truncate_response_body(&body);
        assert_eq!(truncated.len(), RESPONSE_BODY_TRUNCATE_BYTES);
    }

    #[test]
    fn short_body_is_untouched() {
        assert_eq!(truncate_response_body("hi"), "hi");
    }
}
