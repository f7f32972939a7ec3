//! DTOs for click analytics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::{DateFilterParams, PaginationMeta, PaginationParams};
use crate::domain::entities::Click;

/// Query parameters for `GET /api/v1/links/{id}/clicks` and the count variant.
#[derive(Debug, Deserialize)]
pub struct ClickQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,
}

/// One recorded click, after bot filtering and enrichment.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub clicked_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
}

impl From<Click> for ClickResponse {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            referer: click.referer,
            country: click.country,
            region: click.region,
            city: click.city,
            device_type: click.device_type.map(|d| d.as_str().to_string()),
            browser: click.browser,
            os: click.os,
            utm_source: click.utm_source,
            utm_medium: click.utm_medium,
            utm_campaign: click.utm_campaign,
        }
    }
}

/// Paginated list of clicks for a link.
#[derive(Debug, Serialize)]
pub struct ClickListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<ClickResponse>,
}

/// Response for the click-count endpoint.
#[derive(Debug, Serialize)]
pub struct ClickCountResponse {
    pub count: i64,
}
