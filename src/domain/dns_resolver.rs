//! DNSResolver: pluggable DNS TXT lookup used by the DomainController to
//! verify ownership of a claimed hostname.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AppError;

#[async_trait]
pub trait DNSResolver: Send + Sync {
    /// Looks up TXT records for `name`. Returns an empty vec on NXDOMAIN /
    /// no-records (not an error); returns `Err` only on a genuine resolver
    /// failure (timeout, server failure), which the caller treats as
    /// `Transient`.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, AppError>;
}

/// Lets `Arc<dyn DNSResolver>` satisfy `DNSResolver` itself, so
/// `DomainService` can be monomorphized once over the trait object and swap
/// resolver backends at startup.
#[async_trait]
impl DNSResolver for Arc<dyn DNSResolver> {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, AppError> {
        (**self).lookup_txt(name).await
    }
}

/// Real resolver backed by `hickory-resolver`, using the system
/// configuration (`/etc/resolv.conf` on Unix).
pub struct HickoryDnsResolver {
    resolver: hickory_resolver::TokioAsyncResolver,
}

impl HickoryDnsResolver {
    pub fn from_system_conf() -> Result<Self, AppError> {
        let resolver = hickory_resolver::TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
            AppError::fatal("failed to initialize DNS resolver", serde_json::json!({"error": e.to_string()}))
        })?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl DNSResolver for HickoryDnsResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, AppError> {
        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(|txt| txt.to_string()).collect()),
            Err(err) => {
                use hickory_resolver::error::ResolveErrorKind;
                match err.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                    _ => Err(AppError::transient(
                        "DNS lookup failed",
                        serde_json::json!({"name": name, "error": err.to_string()}),
                    )),
                }
            }
        }
    }
}

/// Test double: returns a fixed set of TXT records regardless of name,
/// useful for exercising the verification flow without a real DNS round-trip.
pub struct StaticDnsResolver {
    pub records: Vec<String>,
}

impl StaticDnsResolver {
    pub fn with_records(records: Vec<String>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self { records: Vec::new() }
    }
}

#[async_trait]
impl DNSResolver for StaticDnsResolver {
    async fn lookup_txt(&self, _name: &str) -> Result<Vec<String>, AppError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_resolver_returns_configured_records() {
        let resolver = StaticDnsResolver::with_records(vec!["linkrift-verification=tok".to_string()]);
        let records = resolver.lookup_txt("_linkrift.example.com").await.unwrap();
        assert_eq!(records, vec!["linkrift-verification=tok".to_string()]);
    }

    #[tokio::test]
    async fn empty_resolver_returns_no_records() {
        let resolver = StaticDnsResolver::empty();
        assert!(resolver.lookup_txt("_linkrift.example.com").await.unwrap().is_empty());
    }
}
