//! SSLProvider: pluggable TLS provisioning for verified custom domains.
//!
//! SSL issuance mechanics are explicitly out of scope (§1 Non-goals); the
//! core only needs the abstract provider interface and a background
//! reconciler contract (§4.8's "out of core scope but required as an
//! external collaborator"). Concrete ACME integration is left to that
//! external reconciler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::SslStatus;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SslProvisionResult {
    pub status: SslStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SSLProvider: Send + Sync {
    async fn provision(&self, domain: &str) -> Result<SslProvisionResult, AppError>;
    async fn check_status(&self, domain: &str) -> Result<SslProvisionResult, AppError>;
    async fn remove(&self, domain: &str) -> Result<(), AppError>;
}

/// Lets `Arc<dyn SSLProvider>` satisfy `SSLProvider` itself, so
/// `DomainService` can be monomorphized once over the trait object and swap
/// providers at startup.
#[async_trait]
impl SSLProvider for Arc<dyn SSLProvider> {
    async fn provision(&self, domain: &str) -> Result<SslProvisionResult, AppError> {
        (**self).provision(domain).await
    }

    async fn check_status(&self, domain: &str) -> Result<SslProvisionResult, AppError> {
        (**self).check_status(domain).await
    }

    async fn remove(&self, domain: &str) -> Result<(), AppError> {
        (**self).remove(domain).await
    }
}

/// Never provisions anything; every domain stays `ssl_status = pending`
/// forever. Used when a deployment delegates SSL entirely to an external
/// reconciler/load balancer and the core should not attempt provisioning.
pub struct NullSslProvider;

#[async_trait]
impl SSLProvider for NullSslProvider {
    async fn provision(&self, _domain: &str) -> Result<SslProvisionResult, AppError> {
        Ok(SslProvisionResult {
            status: SslStatus::Pending,
            expires_at: None,
        })
    }

    async fn check_status(&self, _domain: &str) -> Result<SslProvisionResult, AppError> {
        Ok(SslProvisionResult {
            status: SslStatus::Pending,
            expires_at: None,
        })
    }

    async fn remove(&self, _domain: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Test/demo double that provisions instantly and successfully, with a
/// 90-day expiry, mimicking a fast ACME issuance for integration tests.
pub struct InstantSslProvider;

#[async_trait]
impl SSLProvider for InstantSslProvider {
    async fn provision(&self, _domain: &str) -> Result<SslProvisionResult, AppError> {
        Ok(SslProvisionResult {
            status: SslStatus::Active,
            expires_at: Some(Utc::now() + chrono::Duration::days(90)),
        })
    }

    async fn check_status(&self, _domain: &str) -> Result<SslProvisionResult, AppError> {
        Ok(SslProvisionResult {
            status: SslStatus::Active,
            expires_at: Some(Utc::now() + chrono::Duration::days(90)),
        })
    }

    async fn remove(&self, _domain: &str) -> Result<(), AppError> {
        Ok(())
    }
}
