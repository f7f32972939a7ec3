//! APIKey entity: a machine credential for the Management API.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Closed set of scopes an API key may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyScope {
    LinksRead,
    LinksWrite,
    DomainsRead,
    DomainsWrite,
    WebhooksRead,
    WebhooksWrite,
    AnalyticsRead,
}

impl ApiKeyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyScope::LinksRead => "links:read",
            ApiKeyScope::LinksWrite => "links:write",
            ApiKeyScope::DomainsRead => "domains:read",
            ApiKeyScope::DomainsWrite => "domains:write",
            ApiKeyScope::WebhooksRead => "webhooks:read",
            ApiKeyScope::WebhooksWrite => "webhooks:write",
            ApiKeyScope::AnalyticsRead => "analytics:read",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "links:read" => ApiKeyScope::LinksRead,
            "links:write" => ApiKeyScope::LinksWrite,
            "domains:read" => ApiKeyScope::DomainsRead,
            "domains:write" => ApiKeyScope::DomainsWrite,
            "webhooks:read" => ApiKeyScope::WebhooksRead,
            "webhooks:write" => ApiKeyScope::WebhooksWrite,
            "analytics:read" => ApiKeyScope::AnalyticsRead,
            _ => return None,
        })
    }
}

/// A hashed Management-API credential. The raw key is only ever visible to
/// the caller at creation time; `key_hash` is an HMAC-SHA256 of the raw key
/// keyed by the deployment's signing secret (see `AuthService`), and
/// `key_prefix` (the first 12 chars of the raw key) is stored in the clear
/// to allow lookup without a full table scan.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub scopes: Vec<ApiKeyScope>,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit_override: Option<i32>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }

    pub fn has_scope(&self, scope: ApiKeyScope) -> bool {
        self.scopes.contains(&scope)
    }
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub workspace_id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub scopes: Vec<ApiKeyScope>,
    pub expires_at: Option<DateTime<Utc>>,
    pub rate_limit_override: Option<i32>,
}
