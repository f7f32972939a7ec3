//! DTOs for custom-domain management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Domain;

/// Request body for `POST /api/v1/domains`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDomainRequest {
    #[validate(length(min = 1, max = 253))]
    pub domain: String,
}

/// JSON representation of a custom domain.
#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub id: i64,
    pub domain: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_status: String,
    pub ssl_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Domain> for DomainResponse {
    fn from(domain: Domain) -> Self {
        Self {
            id: domain.id,
            domain: domain.domain.clone(),
            is_verified: domain.is_verified,
            is_active: domain.is_active(),
            verified_at: domain.verified_at,
            ssl_status: domain.ssl_status.as_str().to_string(),
            ssl_expires_at: domain.ssl_expires_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Response for `POST /api/v1/domains`: the claimed domain plus the DNS
/// records the tenant must create to prove ownership and point traffic at
/// the redirect host.
#[derive(Debug, Serialize)]
pub struct DomainCreatedResponse {
    #[serde(flatten)]
    pub domain: DomainResponse,
    pub instructions: crate::application::services::DomainInstructions,
}

/// List of a workspace's domains.
#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub items: Vec<DomainResponse>,
}
