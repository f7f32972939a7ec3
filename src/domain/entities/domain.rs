//! Domain entity: a tenant-claimed hostname progressing through a verify/SSL lifecycle.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// SSL provisioning state for a verified domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslStatus {
    Pending,
    Active,
    Failed,
}

impl SslStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslStatus::Pending => "pending",
            SslStatus::Active => "active",
            SslStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SslStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custom hostname claimed by a workspace.
///
/// Lifecycle: `unverified -> (DNS probe passes) -> verified -> (SSL
/// provisioning) -> active`; any state may transition to `removed` (soft
/// delete). `dns_records` is opaque JSON holding the current
/// `verification_token` and the instructions handed to the tenant.
#[derive(Debug, Clone)]
pub struct Domain {
    pub id: i64,
    pub workspace_id: Uuid,
    pub domain: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_status: SslStatus,
    pub ssl_expires_at: Option<DateTime<Utc>>,
    pub last_dns_check_at: Option<DateTime<Utc>>,
    pub dns_records: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Domain {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.is_verified && self.ssl_status == SslStatus::Active && !self.is_deleted()
    }

    pub fn verification_token(&self) -> Option<&str> {
        self.dns_records.get("verification_token")?.as_str()
    }
}

/// Input to claim a new domain. `verification_token` is generated by the
/// DomainController before the repository call.
#[derive(Debug, Clone)]
pub struct NewDomain {
    pub workspace_id: Uuid,
    pub domain: String,
    pub verification_token: String,
}

/// Partial update, applied by the DomainController as verification/SSL
/// progresses.
#[derive(Debug, Clone, Default)]
pub struct UpdateDomain {
    pub is_verified: Option<bool>,
    pub verified_at: Option<Option<DateTime<Utc>>>,
    pub ssl_status: Option<SslStatus>,
    pub ssl_expires_at: Option<Option<DateTime<Utc>>>,
    pub last_dns_check_at: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_domain() -> Domain {
        let now = Utc::now();
        Domain {
            id: 1,
            workspace_id: Uuid::new_v4(),
            domain: "links.acme.test".to_string(),
            is_verified: false,
            verified_at: None,
            ssl_status: SslStatus::Pending,
            ssl_expires_at: None,
            last_dns_check_at: None,
            dns_records: serde_json::json!({"verification_token": "tok_abc"}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn unverified_domain_is_not_active() {
        let domain = sample_domain();
        assert!(!domain.is_active());
        assert_eq!(domain.verification_token(), Some("tok_abc"));
    }

    #[test]
    fn active_requires_verified_and_ssl_active() {
        let mut domain = sample_domain();
        domain.is_verified = true;
        domain.ssl_status = SslStatus::Pending;
        assert!(!domain.is_active());
        domain.ssl_status = SslStatus::Active;
        assert!(domain.is_active());
    }

    #[test]
    fn soft_deleted_is_never_active() {
        let mut domain = sample_domain();
        domain.is_verified = true;
        domain.ssl_status = SslStatus::Active;
        domain.deleted_at = Some(Utc::now());
        assert!(!domain.is_active());
        assert!(domain.is_deleted());
    }
}
