//! PostgreSQL implementation of the click analytics store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, DeviceType, NewClick};
use crate::domain::repositories::{ClickFilter, ClickRepository};
use crate::error::AppError;

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn device_type_str(d: DeviceType) -> &'static str {
    d.as_str()
}

fn parse_device_type(s: &str) -> Option<DeviceType> {
    match s {
        "desktop" => Some(DeviceType::Desktop),
        "mobile" => Some(DeviceType::Mobile),
        "tablet" => Some(DeviceType::Tablet),
        "other" => Some(DeviceType::Other),
        _ => None,
    }
}

struct ClickRow {
    id: i64,
    link_id: i64,
    visitor_id: String,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    referer: Option<String>,
    ip: Option<String>,
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
    device_type: Option<String>,
    browser: Option<String>,
    browser_version: Option<String>,
    os: Option<String>,
    os_version: Option<String>,
    is_bot: bool,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    utm_term: Option<String>,
    utm_content: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            visitor_id: r.visitor_id,
            clicked_at: r.clicked_at,
            user_agent: r.user_agent,
            referer: r.referer,
            ip: r.ip,
            country: r.country,
            region: r.region,
            city: r.city,
            device_type: r.device_type.as_deref().and_then(parse_device_type),
            browser: r.browser,
            browser_version: r.browser_version,
            os: r.os,
            os_version: r.os_version,
            is_bot: r.is_bot,
            utm_source: r.utm_source,
            utm_medium: r.utm_medium,
            utm_campaign: r.utm_campaign,
            utm_term: r.utm_term,
            utm_content: r.utm_content,
        }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let device_type = new_click.device_type.map(device_type_str);

        let row = sqlx::query_as!(
            ClickRow,
            r#"
            INSERT INTO clicks (
                link_id, visitor_id, clicked_at, user_agent, referer, ip,
                country, region, city, device_type, browser, browser_version,
                os, os_version, is_bot, utm_source, utm_medium, utm_campaign,
                utm_term, utm_content
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING
                id, link_id, visitor_id, clicked_at, user_agent, referer, ip,
                country, region, city, device_type, browser, browser_version,
                os, os_version, is_bot, utm_source, utm_medium, utm_campaign,
                utm_term, utm_content
            "#,
            new_click.link_id,
            new_click.visitor_id,
            new_click.clicked_at,
            new_click.user_agent,
            new_click.referer,
            new_click.ip,
            new_click.country,
            new_click.region,
            new_click.city,
            device_type,
            new_click.browser,
            new_click.browser_version,
            new_click.os,
            new_click.os_version,
            new_click.is_bot,
            new_click.utm_source,
            new_click.utm_medium,
            new_click.utm_campaign,
            new_click.utm_term,
            new_click.utm_content,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn has_visited_today(
        &self,
        link_id: i64,
        visitor_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let day = at.date_naive();

        let exists = sqlx::query_scalar!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clicks
                WHERE link_id = $1 AND visitor_id = $2 AND clicked_at::date = $3
            ) as "exists!"
            "#,
            link_id,
            visitor_id,
            day,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn list_by_link(
        &self,
        link_id: i64,
        filter: ClickFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Click>, i64), AppError> {
        let rows = sqlx::query_as!(
            ClickRow,
            r#"
            SELECT
                id, link_id, visitor_id, clicked_at, user_agent, referer, ip,
                country, region, city, device_type, browser, browser_version,
                os, os_version, is_bot, utm_source, utm_medium, utm_campaign,
                utm_term, utm_content
            FROM clicks
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
              AND ($3::timestamptz IS NULL OR clicked_at <= $3)
            ORDER BY clicked_at DESC
            LIMIT $4 OFFSET $5
            "#,
            link_id,
            filter.from,
            filter.to,
            limit,
            offset,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let total = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) FROM clicks
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
              AND ($3::timestamptz IS NULL OR clicked_at <= $3)
            "#,
            link_id,
            filter.from,
            filter.to,
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn count_by_link(&self, link_id: i64, filter: ClickFilter) -> Result<i64, AppError> {
        let count = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) FROM clicks
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
              AND ($3::timestamptz IS NULL OR clicked_at <= $3)
            "#,
            link_id,
            filter.from,
            filter.to,
        )
        .fetch_one(self.pool.as_ref())
        .await?
        .unwrap_or(0);

        Ok(count)
    }
}
