//! Repository trait for the AnalyticsStore: click persistence and queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;

/// Filter criteria for click queries.
#[derive(Debug, Clone, Default)]
pub struct ClickFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Repository interface for the click analytics store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts a single enriched click row. Called from the ClickProcessor
    /// after bot detection, fingerprinting and geo/UA enrichment.
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Returns `true` if a click from `visitor_id` already exists for `link_id`
    /// on the UTC calendar day of `at`. Backs the unique-click dedup check.
    async fn has_visited_today(
        &self,
        link_id: i64,
        visitor_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Paginated click rows for a link, most recent first.
    async fn list_by_link(
        &self,
        link_id: i64,
        filter: ClickFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Click>, i64), AppError>;

    /// Counts clicks for a link within an optional date range.
    async fn count_by_link(&self, link_id: i64, filter: ClickFilter) -> Result<i64, AppError>;
}
