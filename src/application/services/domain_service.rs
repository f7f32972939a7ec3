//! DomainController: the custom-domain verify/SSL state machine.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;
use uuid::Uuid;

use crate::domain::dns_resolver::DNSResolver;
use crate::domain::entities::{Domain, NewDomain, UpdateDomain, WebhookEvent};
use crate::domain::entitlements::{Entitlements, Feature};
use crate::domain::event_bus::EventBus;
use crate::domain::repositories::DomainRepository;
use crate::domain::ssl_provider::SSLProvider;
use crate::error::AppError;

static HOSTNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$").expect("hostname pattern is valid")
});

fn validate_hostname(hostname: &str) -> Result<(), AppError> {
    if hostname.len() > 253 || !HOSTNAME_PATTERN.is_match(hostname) {
        return Err(AppError::bad_request(
            "Invalid domain hostname",
            json!({ "domain": hostname }),
        ));
    }
    Ok(())
}

fn generate_verification_token() -> String {
    let mut buffer = [0u8; 16];
    getrandom::fill(&mut buffer).expect("failed to generate verification token");
    hex::encode(buffer)
}

/// DNS/CNAME instructions handed back to the tenant after `add_domain`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DomainInstructions {
    pub txt_record_name: String,
    pub txt_record_value: String,
    pub cname_record_name: String,
    pub cname_record_value: String,
}

/// DomainController: owns the `unverified -> verified -> active` lifecycle
/// for tenant-claimed hostnames, collaborating with DNSResolver and
/// SSLProvider (both out-of-core-scope external collaborators per the
/// domain model) and gating on Entitlements.
pub struct DomainService<D: DomainRepository, R: DNSResolver, S: SSLProvider, EB: EventBus, E: Entitlements> {
    domain_repository: Arc<D>,
    dns_resolver: Arc<R>,
    ssl_provider: Arc<S>,
    event_bus: Arc<EB>,
    entitlements: Arc<E>,
    redirect_host: String,
}

impl<D: DomainRepository, R: DNSResolver, S: SSLProvider, EB: EventBus, E: Entitlements> DomainService<D, R, S, EB, E> {
    pub fn new(
        domain_repository: Arc<D>,
        dns_resolver: Arc<R>,
        ssl_provider: Arc<S>,
        event_bus: Arc<EB>,
        entitlements: Arc<E>,
        redirect_host: String,
    ) -> Self {
        Self {
            domain_repository,
            dns_resolver,
            ssl_provider,
            event_bus,
            entitlements,
            redirect_host,
        }
    }

    /// Claims a new hostname for a workspace, gated on the `custom_domains`
    /// feature and the tenant's domain-count limit.
    pub async fn add_domain(&self, workspace_id: Uuid, hostname: &str) -> Result<Domain, AppError> {
        let hostname = hostname.trim().to_ascii_lowercase();
        validate_hostname(&hostname)?;

        if !self.entitlements.has(workspace_id, Feature::CustomDomains).await {
            let tier = self.entitlements.minimum_tier_for(Feature::CustomDomains).await;
            return Err(AppError::payment_required("custom_domains", &tier));
        }

        let current = self.domain_repository.count_active(workspace_id).await?;
        if !self
            .entitlements
            .check_limit(workspace_id, "custom_domains", current as u32)
            .await
        {
            let tier = self.entitlements.minimum_tier_for(Feature::CustomDomains).await;
            return Err(AppError::payment_required("custom_domains", &tier));
        }

        let verification_token = generate_verification_token();
        let domain = self
            .domain_repository
            .create(NewDomain {
                workspace_id,
                domain: hostname,
                verification_token,
            })
            .await?;

        self.event_bus
            .publish(
                WebhookEvent::DomainAdded,
                workspace_id,
                json!({ "domain_id": domain.id, "domain": domain.domain }),
            )
            .await;

        Ok(domain)
    }

    /// Builds the DNS records the tenant must create to prove ownership and
    /// point traffic at the redirect host. Pure; no repository access.
    pub fn get_instructions(&self, domain: &Domain) -> DomainInstructions {
        let token = domain.verification_token().unwrap_or_default();
        DomainInstructions {
            txt_record_name: format!("_linkrift.{}", domain.domain),
            txt_record_value: format!("linkrift-verification={token}"),
            cname_record_name: domain.domain.clone(),
            cname_record_value: self.redirect_host.clone(),
        }
    }

    pub async fn get(&self, id: i64, workspace_id: Uuid) -> Result<Domain, AppError> {
        self.domain_repository
            .find_by_id(id)
            .await?
            .filter(|d| d.workspace_id == workspace_id && !d.is_deleted())
            .ok_or_else(|| AppError::not_found("Domain not found", json!({ "domain_id": id })))
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Domain>, AppError> {
        self.domain_repository.list(workspace_id).await
    }

    /// Verifies DNS ownership and provisions SSL. Idempotent: re-verifying
    /// an already-active domain just re-confirms without re-provisioning.
    pub async fn verify(&self, id: i64, workspace_id: Uuid, now: chrono::DateTime<chrono::Utc>) -> Result<Domain, AppError> {
        let domain = self.get(id, workspace_id).await?;

        if domain.is_active() {
            return Ok(domain);
        }

        let token = domain
            .verification_token()
            .ok_or_else(|| AppError::fatal("domain has no verification token", json!({ "domain_id": id })))?;
        let expected = format!("linkrift-verification={token}");
        let txt_name = format!("_linkrift.{}", domain.domain);

        let records = self.dns_resolver.lookup_txt(&txt_name).await?;
        if !records.iter().any(|r| r == &expected) {
            return Err(AppError::bad_request(
                "DNS verification record not found",
                json!({ "domain": domain.domain, "expected_record": txt_name, "expected_value": expected }),
            ));
        }

        let ssl = self.ssl_provider.provision(&domain.domain).await?;

        let updated = self
            .domain_repository
            .update(
                id,
                workspace_id,
                UpdateDomain {
                    is_verified: Some(true),
                    verified_at: Some(Some(now)),
                    ssl_status: Some(ssl.status),
                    ssl_expires_at: Some(ssl.expires_at),
                    last_dns_check_at: Some(Some(now)),
                },
            )
            .await?;

        self.event_bus
            .publish(
                WebhookEvent::DomainVerified,
                workspace_id,
                json!({ "domain_id": updated.id, "domain": updated.domain }),
            )
            .await;

        Ok(updated)
    }

    /// Removes a domain claim. SSL teardown is best-effort; a failure there
    /// never blocks the tenant from giving up the hostname.
    pub async fn remove(&self, id: i64, workspace_id: Uuid) -> Result<(), AppError> {
        let domain = self.get(id, workspace_id).await?;

        if let Err(e) = self.ssl_provider.remove(&domain.domain).await {
            tracing::warn!(domain = %domain.domain, error = %e, "SSL teardown failed during domain removal");
        }

        let removed = self.domain_repository.soft_delete(id, workspace_id).await?;
        if !removed {
            return Err(AppError::not_found("Domain not found", json!({ "domain_id": id })));
        }

        self.event_bus
            .publish(
                WebhookEvent::DomainRemoved,
                workspace_id,
                json!({ "domain_id": id, "domain": domain.domain }),
            )
            .await;

        Ok(())
    }
}
