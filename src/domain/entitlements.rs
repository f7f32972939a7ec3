//! Entitlements: the tenant capability oracle consumed (not owned) by
//! LinkStore/DomainController/WebhookDispatcher call sites that gate
//! features behind a plan tier.

use async_trait::async_trait;
use uuid::Uuid;

/// Closed set of features referenced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CustomDomains,
    ApiAccess,
    Webhooks,
    AdvancedAnalytics,
    ExportData,
    QrCustomization,
    BioPages,
    CustomCss,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::CustomDomains => "custom_domains",
            Feature::ApiAccess => "api_access",
            Feature::Webhooks => "webhooks",
            Feature::AdvancedAnalytics => "advanced_analytics",
            Feature::ExportData => "export_data",
            Feature::QrCustomization => "qr_customization",
            Feature::BioPages => "bio_pages",
            Feature::CustomCss => "custom_css",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub analytics_retention_days: u32,
    pub max_api_requests_per_min: u32,
    pub max_custom_domains: u32,
}

/// Capability oracle, per workspace. Implementations must never block the
/// caller on a remote billing system for longer than a bounded timeout;
/// the core treats an oracle failure as `Transient`.
#[async_trait]
pub trait Entitlements: Send + Sync {
    async fn has(&self, workspace_id: Uuid, feature: Feature) -> bool;
    async fn check_limit(&self, workspace_id: Uuid, name: &str, current: u32) -> bool;
    async fn limits(&self, workspace_id: Uuid) -> Limits;
    /// Minimum plan tier name granting `feature`, surfaced in
    /// `PAYMENT_REQUIRED` responses.
    async fn minimum_tier_for(&self, feature: Feature) -> String;
}

/// Static, in-memory plan table. The "pro" tier unlocks every feature and
/// generous limits; all other tiers get the free-tier defaults. A real
/// deployment would back this with a billing-service client; this
/// implementation is the one the core ships with.
pub struct StaticPlanEntitlements {
    pub pro_workspaces: std::collections::HashSet<Uuid>,
}

impl StaticPlanEntitlements {
    pub fn new(pro_workspaces: std::collections::HashSet<Uuid>) -> Self {
        Self { pro_workspaces }
    }

    fn is_pro(&self, workspace_id: Uuid) -> bool {
        self.pro_workspaces.contains(&workspace_id)
    }
}

#[async_trait]
impl Entitlements for StaticPlanEntitlements {
    async fn has(&self, workspace_id: Uuid, feature: Feature) -> bool {
        match feature {
            Feature::ApiAccess => true,
            _ => self.is_pro(workspace_id),
        }
    }

    async fn check_limit(&self, workspace_id: Uuid, name: &str, current: u32) -> bool {
        let limits = self.limits(workspace_id).await;
        match name {
            "custom_domains" => current < limits.max_custom_domains,
            _ => true,
        }
    }

    async fn limits(&self, workspace_id: Uuid) -> Limits {
        if self.is_pro(workspace_id) {
            Limits {
                analytics_retention_days: 365,
                max_api_requests_per_min: 600,
                max_custom_domains: 20,
            }
        } else {
            Limits {
                analytics_retention_days: 30,
                max_api_requests_per_min: 60,
                max_custom_domains: 0,
            }
        }
    }

    async fn minimum_tier_for(&self, feature: Feature) -> String {
        match feature {
            Feature::ApiAccess => "free".to_string(),
            _ => "pro".to_string(),
        }
    }
}

/// Test double that grants every feature unconditionally.
pub struct AllowAllEntitlements;

#[async_trait]
impl Entitlements for AllowAllEntitlements {
    async fn has(&self, _workspace_id: Uuid, _feature: Feature) -> bool {
        true
    }

    async fn check_limit(&self, _workspace_id: Uuid, _name: &str, _current: u32) -> bool {
        true
    }

    async fn limits(&self, _workspace_id: Uuid) -> Limits {
        Limits {
            analytics_retention_days: 3650,
            max_api_requests_per_min: u32::MAX,
            max_custom_domains: u32::MAX,
        }
    }

    async fn minimum_tier_for(&self, _feature: Feature) -> String {
        "free".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn free_tier_lacks_custom_domains() {
        let oracle = StaticPlanEntitlements::new(Default::default());
        let workspace_id = Uuid::new_v4();
        assert!(!oracle.has(workspace_id, Feature::CustomDomains).await);
        assert!(oracle.has(workspace_id, Feature::ApiAccess).await);
        assert_eq!(
            oracle.minimum_tier_for(Feature::CustomDomains).await,
            "pro"
        );
    }

    #[tokio::test]
    async fn pro_tier_unlocks_custom_domains_and_raises_limits() {
        let workspace_id = Uuid::new_v4();
        let mut pro = std::collections::HashSet::new();
        pro.insert(workspace_id);
        let oracle = StaticPlanEntitlements::new(pro);
        assert!(oracle.has(workspace_id, Feature::CustomDomains).await);
        assert!(oracle.check_limit(workspace_id, "custom_domains", 5).await);
    }

    #[tokio::test]
    async fn allow_all_grants_everything() {
        let oracle = AllowAllEntitlements;
        assert!(oracle.has(Uuid::new_v4(), Feature::Webhooks).await);
    }
}
