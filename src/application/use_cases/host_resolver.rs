use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::AppResult;
use crate::domain::entities::tenant::Tenant;

/// Narrow lookup interface over the tenant directory. Implementations must
/// only match `get_by_custom_domain` against bindings that are `active`.
#[async_trait]
pub trait TenantRepo: Send + Sync {
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>>;
    async fn get_by_custom_domain(&self, domain: &str) -> AppResult<Option<Tenant>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClass {
    /// The platform apex itself (marketing surface, no tenant).
    PlatformApex,
    /// The operator-facing hostname (admin UI / API, no tenant).
    PlatformAppAlias,
    /// `www.<apex>` — callers answer with a permanent redirect to the apex.
    ApexWwwRedirect,
    /// `<slug>.<base-domain>` with exactly one label before the base.
    TenantSubdomain,
    /// A hostname matched through the custom-domain index.
    TenantCustomDomain,
    Unknown,
}

/// Per-request resolution result. Never persisted; threaded explicitly
/// through the request instead of re-derived downstream.
#[derive(Debug, Clone)]
pub struct ResolvedHost {
    pub class: HostClass,
    pub tenant: Option<Tenant>,
    pub raw_host: String,
    /// Host with any `:port` suffix removed, lowercased.
    pub host: String,
}

pub struct HostResolver {
    repo: Arc<dyn TenantRepo>,
    base_domain: String,
    app_alias: String,
}

impl HostResolver {
    pub fn new(repo: Arc<dyn TenantRepo>, base_domain: &str, app_alias: &str) -> Self {
        Self {
            repo,
            base_domain: base_domain.to_ascii_lowercase(),
            app_alias: app_alias.to_ascii_lowercase(),
        }
    }

    /// Classify a request's Host header and resolve the owning tenant.
    ///
    /// The platform-alias cases are decided purely by structural matching so
    /// operator and marketing traffic never waits on the tenant directory.
    #[instrument(skip(self))]
    pub async fn resolve(&self, host_header: &str) -> AppResult<ResolvedHost> {
        let host = strip_port(host_header.trim()).to_ascii_lowercase();

        if host == self.app_alias {
            return Ok(self.resolved(HostClass::PlatformAppAlias, None, host_header, host));
        }
        if host == self.base_domain {
            return Ok(self.resolved(HostClass::PlatformApex, None, host_header, host));
        }
        if host == format!("www.{}", self.base_domain) {
            return Ok(self.resolved(HostClass::ApexWwwRedirect, None, host_header, host));
        }

        if let Some(label) = host.strip_suffix(&format!(".{}", self.base_domain)) {
            // Exactly one label resolves as a slug; anything deeper is not a
            // tenant subdomain and must not fall through to the custom-domain
            // index either.
            if label.is_empty() || label.contains('.') {
                return Ok(self.resolved(HostClass::Unknown, None, host_header, host));
            }
            let tenant = self.repo.get_by_slug(label).await?;
            return Ok(self.resolved(HostClass::TenantSubdomain, tenant, host_header, host));
        }

        match self.repo.get_by_custom_domain(&host).await? {
            Some(tenant) => {
                Ok(self.resolved(HostClass::TenantCustomDomain, Some(tenant), host_header, host))
            }
            None => Ok(self.resolved(HostClass::Unknown, None, host_header, host)),
        }
    }

    fn resolved(
        &self,
        class: HostClass,
        tenant: Option<Tenant>,
        raw_host: &str,
        host: String,
    ) -> ResolvedHost {
        ResolvedHost {
            class,
            tenant,
            raw_host: raw_host.to_string(),
            host,
        }
    }
}

/// Remove an optional `:port` suffix, leaving bracketed IPv6 literals intact.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        if let Some(end) = host.find(']') {
            return &host[..=end];
        }
        return host;
    }
    match host.split_once(':') {
        Some((h, _)) => h,
        None => host,
    }
}
