//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shortened URL link with metadata, policy, and denormalized analytics counters.
///
/// `short_code` is unique among all links where `deleted_at IS NULL`. Policy
/// fields (`is_active`, `expires_at`, `max_clicks`, `password_hash`) are
/// evaluated by the Resolver in a fixed order.
///
/// Serializable: Cache stores this struct as JSON under `link:{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,

    pub is_active: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i32>,

    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,

    pub total_clicks: i64,
    pub unique_clicks: i64,

    pub workspace_id: Uuid,
    pub user_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true once `expires_at` has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true once `total_clicks` has reached `max_clicks`.
    pub fn is_click_limited(&self) -> bool {
        self.max_clicks.is_some_and(|m| self.total_clicks >= i64::from(m))
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input data for creating a new link. `short_code` is `None` when the
/// caller wants one generated (see `utils::code_generator`).
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: Option<String>,
    pub destination_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
    pub is_active: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i32>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub workspace_id: Uuid,
    pub user_id: Option<Uuid>,
}

/// Partial update for an existing link. `None` fields are left unchanged.
/// `Some(None)` on an `Option<Option<T>>` field clears it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub destination_url: Option<String>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub favicon_url: Option<Option<String>>,
    pub og_image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    /// `Some(Some(hash))` sets a new password; `Some(None)` clears it.
    pub password_hash: Option<Option<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_clicks: Option<Option<i32>>,
    pub utm_source: Option<Option<String>>,
    pub utm_medium: Option<Option<String>>,
    pub utm_campaign: Option<Option<String>>,
    pub utm_term: Option<Option<String>>,
    pub utm_content: Option<Option<String>>,
    pub restore: bool,
}

impl LinkPatch {
    /// True when the patch carries no changes at all (round-trip law:
    /// `Update(id, {}) ≡ Get(id)`).
    pub fn is_noop(&self) -> bool {
        self.destination_url.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.favicon_url.is_none()
            && self.og_image_url.is_none()
            && self.is_active.is_none()
            && self.password_hash.is_none()
            && self.expires_at.is_none()
            && self.max_clicks.is_none()
            && self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_term.is_none()
            && self.utm_content.is_none()
            && !self.restore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link() -> Link {
        let now = Utc::now();
        Link {
            id: 1,
            short_code: "abc1234".to_string(),
            destination_url: "https://example.com".to_string(),
            title: None,
            description: None,
            favicon_url: None,
            og_image_url: None,
            is_active: true,
            password_hash: None,
            expires_at: None,
            max_clicks: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
            total_clicks: 0,
            unique_clicks: 0,
            workspace_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn not_deleted_not_expired_by_default() {
        let link = sample_link();
        assert!(!link.is_deleted());
        assert!(!link.is_expired(Utc::now()));
        assert!(!link.is_click_limited());
        assert!(!link.is_password_protected());
    }

    #[test]
    fn expiry_boundary() {
        let mut link = sample_link();
        let now = Utc::now();
        link.expires_at = Some(now + Duration::seconds(1));
        assert!(!link.is_expired(now));
        assert!(link.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn click_limit_boundary() {
        let mut link = sample_link();
        link.max_clicks = Some(2);
        link.total_clicks = 1;
        assert!(!link.is_click_limited());
        link.total_clicks = 2;
        assert!(link.is_click_limited());
    }

    #[test]
    fn empty_patch_is_noop() {
        assert!(LinkPatch::default().is_noop());
        let mut patch = LinkPatch::default();
        patch.title = Some(Some("x".to_string()));
        assert!(!patch.is_noop());
    }
}
