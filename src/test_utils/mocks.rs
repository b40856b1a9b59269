use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        custom_domain::{CustomDomainBinding, CustomDomainStatus},
        tenant::Tenant,
    },
    use_cases::{
        custom_domain::{CustomDomainRepo, DnsVerifier},
        host_resolver::TenantRepo,
    },
};

/// In-memory tenant directory. Counts lookups so tests can assert the
/// structural host-matching paths never consult the directory.
#[derive(Default)]
pub struct InMemoryTenantRepo {
    tenants: Mutex<Vec<Tenant>>,
    lookups: AtomicUsize,
    error: Mutex<Option<String>>,
}

impl InMemoryTenantRepo {
    pub fn insert(&self, tenant: Tenant) {
        self.tenants.lock().unwrap().push(tenant);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every directory lookup error out, as an exhausted pool would.
    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    fn check_failure(&self) -> AppResult<()> {
        match self.error.lock().unwrap().clone() {
            Some(message) => Err(AppError::Database(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TenantRepo for InMemoryTenantRepo {
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .tenants
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.slug.eq_ignore_ascii_case(slug))
            .cloned())
    }

    async fn get_by_custom_domain(&self, domain: &str) -> AppResult<Option<Tenant>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .tenants
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.custom_domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .tenants
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }
}

/// In-memory custom-domain store enforcing the same conditional transitions
/// and uniqueness rules as the Postgres implementation.
#[derive(Default)]
pub struct InMemoryCustomDomainRepo {
    bindings: Mutex<HashMap<Uuid, CustomDomainBinding>>,
}

impl InMemoryCustomDomainRepo {
    pub fn insert(&self, binding: CustomDomainBinding) {
        self.bindings.lock().unwrap().insert(binding.id, binding);
    }

    /// Test-only escape hatch for constructing mid-lifecycle states.
    pub fn force_status(&self, id: Uuid, status: CustomDomainStatus) {
        if let Some(binding) = self.bindings.lock().unwrap().get_mut(&id) {
            binding.status = status;
        }
    }

    fn transition<F>(
        &self,
        id: Uuid,
        allowed_from: &[CustomDomainStatus],
        apply: F,
    ) -> Option<CustomDomainBinding>
    where
        F: FnOnce(&mut CustomDomainBinding),
    {
        let mut bindings = self.bindings.lock().unwrap();
        let binding = bindings.get_mut(&id)?;
        if !allowed_from.contains(&binding.status) {
            return None;
        }
        apply(binding);
        binding.updated_at = Some(Utc::now().naive_utc());
        Some(binding.clone())
    }
}

#[async_trait]
impl CustomDomainRepo for InMemoryCustomDomainRepo {
    async fn create(
        &self,
        tenant_id: Uuid,
        domain: &str,
        token: &str,
    ) -> AppResult<CustomDomainBinding> {
        let mut bindings = self.bindings.lock().unwrap();
        if bindings
            .values()
            .any(|b| b.domain == domain || b.tenant_id == tenant_id)
        {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }
        let now = Utc::now().naive_utc();
        let binding = CustomDomainBinding {
            id: Uuid::new_v4(),
            tenant_id,
            domain: domain.to_string(),
            status: CustomDomainStatus::Pending,
            verification_token: token.to_string(),
            verified_at: None,
            activated_at: None,
            last_checked_at: None,
            last_error: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        bindings.insert(binding.id, binding.clone());
        Ok(binding)
    }

    async fn get_by_tenant(&self, tenant_id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.tenant_id == tenant_id)
            .cloned())
    }

    async fn get_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.domain == domain)
            .cloned())
    }

    async fn get_active_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.domain == domain && b.status == CustomDomainStatus::Active)
            .cloned())
    }

    async fn set_verifying(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self.transition(
            id,
            &[
                CustomDomainStatus::Pending,
                CustomDomainStatus::Failed,
                CustomDomainStatus::Verified,
            ],
            |b| {
                b.status = CustomDomainStatus::Verifying;
                b.last_checked_at = Some(Utc::now().naive_utc());
            },
        ))
    }

    async fn set_verified(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self.transition(id, &[CustomDomainStatus::Verifying], |b| {
            let now = Utc::now().naive_utc();
            b.status = CustomDomainStatus::Verified;
            b.verified_at = Some(now);
            b.last_checked_at = Some(now);
            b.last_error = None;
        }))
    }

    async fn set_active(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self.transition(id, &[CustomDomainStatus::Verified], |b| {
            b.status = CustomDomainStatus::Active;
            b.activated_at = Some(Utc::now().naive_utc());
        }))
    }

    async fn set_failed(&self, id: Uuid, error: &str) -> AppResult<Option<CustomDomainBinding>> {
        Ok(self.transition(
            id,
            &[CustomDomainStatus::Verifying, CustomDomainStatus::Active],
            |b| {
                let now = Utc::now().naive_utc();
                b.status = CustomDomainStatus::Failed;
                b.last_error = Some(error.to_string());
                b.last_checked_at = Some(now);
            },
        ))
    }

    async fn touch_checked(&self, id: Uuid) -> AppResult<()> {
        if let Some(binding) = self.bindings.lock().unwrap().get_mut(&id) {
            binding.last_checked_at = Some(Utc::now().naive_utc());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.bindings.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn list_verifying(&self) -> AppResult<Vec<CustomDomainBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.status == CustomDomainStatus::Verifying)
            .cloned()
            .collect())
    }

    async fn list_active_checked_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> AppResult<Vec<CustomDomainBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .filter(|b| {
                b.status == CustomDomainStatus::Active
                    && b.last_checked_at.is_none_or(|at| at < cutoff)
            })
            .cloned()
            .collect())
    }
}

/// DNS verifier returning preconfigured answers; flips let tests simulate
/// propagation, drift and resolver outages.
pub struct StaticDnsVerifier {
    cname_ok: AtomicBool,
    txt_ok: AtomicBool,
    error: Mutex<Option<String>>,
    lookups: AtomicUsize,
}

impl Default for StaticDnsVerifier {
    fn default() -> Self {
        Self {
            cname_ok: AtomicBool::new(true),
            txt_ok: AtomicBool::new(true),
            error: Mutex::new(None),
            lookups: AtomicUsize::new(0),
        }
    }
}

impl StaticDnsVerifier {
    pub fn set_cname_ok(&self, ok: bool) {
        self.cname_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_txt_ok(&self, ok: bool) {
        self.txt_ok.store(ok, Ordering::SeqCst);
    }

    /// Make every lookup error out, as a timed-out resolver would.
    pub fn fail_with(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check(&self, ok: &AtomicBool) -> AppResult<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(AppError::Internal(message));
        }
        Ok(ok.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl DnsVerifier for StaticDnsVerifier {
    async fn check_cname(&self, _domain: &str, _expected_target: &str) -> AppResult<bool> {
        self.check(&self.cname_ok)
    }

    async fn check_txt(&self, _domain: &str, _expected_value: &str) -> AppResult<bool> {
        self.check(&self.txt_ok)
    }
}
