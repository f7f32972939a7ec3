//! DTOs for link creation, update, and listing endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::Validate;

use super::pagination::PaginationParams;
use crate::domain::entities::Link;

static CUSTOM_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Request body for `POST /api/v1/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub destination_url: String,

    #[validate(length(min = 3, max = 50))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub short_code: Option<String>,

    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,

    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i32>,

    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

/// Request body for `POST /api/v1/links/bulk`. Capped at 100 entries by the service.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateLinkRequest {
    #[validate(nested)]
    pub links: Vec<CreateLinkRequest>,
}

/// Request body for `PATCH /api/v1/links/{id}`.
///
/// All fields are optional — only provided fields are changed. Nullable
/// fields (`title`, `expires_at`, `password`, ...) use the standard
/// absent/null/value three-state convention: absent leaves the field
/// unchanged, `null` clears it, a value sets it.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub destination_url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub favicon_url: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub og_image_url: Option<Option<String>>,

    pub is_active: Option<bool>,

    /// `null` clears the password (link becomes unprotected).
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub password: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub max_clicks: Option<Option<i32>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm_source: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm_medium: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm_campaign: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm_term: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm_content: Option<Option<String>>,

    /// When true, clears `deleted_at` to restore a soft-deleted link.
    #[serde(default)]
    pub restore: bool,
}

/// Query parameters for `GET /api/v1/links`.
#[derive(Debug, Deserialize)]
pub struct LinkQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
    pub is_active: bool,
    pub is_password_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i32>,
    pub total_clicks: i64,
    pub unique_clicks: i64,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    pub fn from_link(link: Link, redirect_base_url: &str) -> Self {
        Self {
            id: link.id,
            short_url: format!("{}/{}", redirect_base_url.trim_end_matches('/'), link.short_code),
            short_code: link.short_code,
            destination_url: link.destination_url,
            title: link.title,
            description: link.description,
            favicon_url: link.favicon_url,
            og_image_url: link.og_image_url,
            is_active: link.is_active,
            is_password_protected: link.is_password_protected(),
            expires_at: link.expires_at,
            max_clicks: link.max_clicks,
            total_clicks: link.total_clicks,
            unique_clicks: link.unique_clicks,
            utm_source: link.utm_source,
            utm_medium: link.utm_medium,
            utm_campaign: link.utm_campaign,
            utm_term: link.utm_term,
            utm_content: link.utm_content,
            created_at: link.created_at,
            updated_at: link.updated_at,
            deleted_at: link.deleted_at,
        }
    }
}

/// Paginated list of links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: super::pagination::PaginationMeta,
    pub items: Vec<LinkResponse>,
}

/// Response for `POST /api/v1/links/bulk`.
#[derive(Debug, Serialize)]
pub struct BulkCreateLinkResponse {
    pub items: Vec<LinkResponse>,
}
