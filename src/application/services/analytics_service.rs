//! Analytics read path for the Management API: click history and counts for
//! a workspace's links. Write path (click ingestion) lives in the
//! ClickProcessor pipeline, not here.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::Click;
use crate::domain::repositories::{ClickFilter, ClickRepository, LinkRepository};
use crate::error::AppError;

const MAX_LIST_LIMIT: i64 = 100;

pub struct AnalyticsService<L: LinkRepository, C: ClickRepository> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
}

impl<L: LinkRepository, C: ClickRepository> AnalyticsService<L, C> {
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            click_repository,
        }
    }

    async fn assert_owned(&self, link_id: i64, workspace_id: Uuid) -> Result<(), AppError> {
        self.link_repository
            .find_by_id(link_id)
            .await?
            .filter(|l| l.workspace_id == workspace_id && !l.is_deleted())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))?;
        Ok(())
    }

    /// Paginated click history for a link, scoped to the requesting workspace.
    pub async fn link_clicks(
        &self,
        link_id: i64,
        workspace_id: Uuid,
        filter: ClickFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Click>, i64), AppError> {
        self.assert_owned(link_id, workspace_id).await?;
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        self.click_repository.list_by_link(link_id, filter, offset, limit).await
    }

    /// Click count for a link within an optional date range, scoped to the
    /// requesting workspace.
    pub async fn click_count(&self, link_id: i64, workspace_id: Uuid, filter: ClickFilter) -> Result<i64, AppError> {
        self.assert_owned(link_id, workspace_id).await?;
        self.click_repository.count_by_link(link_id, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};

    fn sample_link(workspace_id: Uuid) -> Link {
        let now = chrono::Utc::now();
        Link {
            id: 1,
            short_code: "abc12345".to_string(),
            destination_url: "https://example.com/".to_string(),
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
            total_clicks: 10,
            unique_clicks: 8,
            workspace_id,
            user_id: Some(Uuid::new_v4()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn link_clicks_rejects_cross_workspace_access() {
        let owner_workspace = Uuid::new_v4();
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(sample_link(owner_workspace))));
        let click_repo = MockClickRepository::new();

        let service = AnalyticsService::new(Arc::new(link_repo), Arc::new(click_repo));
        let result = service
            .link_clicks(1, Uuid::new_v4(), ClickFilter::default(), 0, 20)
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn click_count_clamps_limit_and_delegates() {
        let workspace_id = Uuid::new_v4();
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(sample_link(workspace_id))));
        let mut click_repo = MockClickRepository::new();
        click_repo.expect_count_by_link().returning(|_, _| Ok(10));

        let service = AnalyticsService::new(Arc::new(link_repo), Arc::new(click_repo));
        let count = service.click_count(1, workspace_id, ClickFilter::default()).await.unwrap();
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn link_clicks_clamps_limit_above_max() {
        let workspace_id = Uuid::new_v4();
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(sample_link(workspace_id))));
        let mut click_repo = MockClickRepository::new();
        click_repo
            .expect_list_by_link()
            .withf(|_, _, _, limit| *limit == MAX_LIST_LIMIT)
            .returning(|_, _, _, _| Ok((vec![], 0)));

        let service = AnalyticsService::new(Arc::new(link_repo), Arc::new(click_repo));
        let (clicks, total) = service
            .link_clicks(1, workspace_id, ClickFilter::default(), 0, 500)
            .await
            .unwrap();
        assert!(clicks.is_empty());
        assert_eq!(total, 0);
    }
}
