//! Webhook entity: a workspace's subscription to domain events.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The closed set of events the core ever publishes to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookEvent {
    LinkCreated,
    LinkUpdated,
    LinkDeleted,
    LinkClicked,
    LinkExpired,
    QrCreated,
    QrScanned,
    BiopageCreated,
    BiopageUpdated,
    DomainAdded,
    DomainVerified,
    DomainRemoved,
    TeamMemberInvited,
    TeamMemberJoined,
    TeamMemberRemoved,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::LinkCreated => "link.created",
            WebhookEvent::LinkUpdated => "link.updated",
            WebhookEvent::LinkDeleted => "link.deleted",
            WebhookEvent::LinkClicked => "link.clicked",
            WebhookEvent::LinkExpired => "link.expired",
            WebhookEvent::QrCreated => "qr.created",
            WebhookEvent::QrScanned => "qr.scanned",
            WebhookEvent::BiopageCreated => "biopage.created",
            WebhookEvent::BiopageUpdated => "biopage.updated",
            WebhookEvent::DomainAdded => "domain.added",
            WebhookEvent::DomainVerified => "domain.verified",
            WebhookEvent::DomainRemoved => "domain.removed",
            WebhookEvent::TeamMemberInvited => "team.member_invited",
            WebhookEvent::TeamMemberJoined => "team.member_joined",
            WebhookEvent::TeamMemberRemoved => "team.member_removed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "link.created" => WebhookEvent::LinkCreated,
            "link.updated" => WebhookEvent::LinkUpdated,
            "link.deleted" => WebhookEvent::LinkDeleted,
            "link.clicked" => WebhookEvent::LinkClicked,
            "link.expired" => WebhookEvent::LinkExpired,
            "qr.created" => WebhookEvent::QrCreated,
            "qr.scanned" => WebhookEvent::QrScanned,
            "biopage.created" => WebhookEvent::BiopageCreated,
            "biopage.updated" => WebhookEvent::BiopageUpdated,
            "domain.added" => WebhookEvent::DomainAdded,
            "domain.verified" => WebhookEvent::DomainVerified,
            "domain.removed" => WebhookEvent::DomainRemoved,
            "team.member_invited" => WebhookEvent::TeamMemberInvited,
            "team.member_joined" => WebhookEvent::TeamMemberJoined,
            "team.member_removed" => WebhookEvent::TeamMemberRemoved,
            _ => return None,
        })
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscriber endpoint for domain events.
///
/// `secret` is shown to the caller once at creation time and stored
/// thereafter only for signing outgoing deliveries; it is never returned by
/// a read endpoint. `failure_count` accumulates across terminally-failed
/// deliveries and disables the webhook (`is_active = false`) at 20.
#[derive(Debug, Clone)]
pub struct Webhook {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub url: String,
    pub secret: String,
    pub events: Vec<WebhookEvent>,
    pub is_active: bool,
    pub failure_count: i32,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Webhook {
    pub const DISABLE_AFTER_FAILURES: i32 = 20;

    pub fn subscribes_to(&self, event: WebhookEvent) -> bool {
        self.is_active && self.events.contains(&event)
    }
}

#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub workspace_id: Uuid,
    pub url: String,
    pub secret: String,
    pub events: Vec<WebhookEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_roundtrip() {
        let all = [
            WebhookEvent::LinkCreated,
            WebhookEvent::LinkUpdated,
            WebhookEvent::LinkDeleted,
            WebhookEvent::LinkClicked,
            WebhookEvent::LinkExpired,
            WebhookEvent::QrCreated,
            WebhookEvent::QrScanned,
            WebhookEvent::BiopageCreated,
            WebhookEvent::BiopageUpdated,
            WebhookEvent::DomainAdded,
            WebhookEvent::DomainVerified,
            WebhookEvent::DomainRemoved,
            WebhookEvent::TeamMemberInvited,
            WebhookEvent::TeamMemberJoined,
            WebhookEvent::TeamMemberRemoved,
        ];
        for event in all {
            assert_eq!(WebhookEvent::from_str(event.as_str()), Some(event));
        }
        assert_eq!(WebhookEvent::from_str("not.an.event"), None);
    }

    #[test]
    fn inactive_webhook_does_not_subscribe() {
        let webhook = Webhook {
            id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            url: "https://example.com/hook".to_string(),
            secret: "whsec_x".to_string(),
            events: vec![WebhookEvent::LinkClicked],
            is_active: false,
            failure_count: 0,
            last_triggered_at: None,
            last_success_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!webhook.subscribes_to(WebhookEvent::LinkClicked));
    }
}
