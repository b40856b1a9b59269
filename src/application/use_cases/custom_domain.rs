use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rand::RngCore;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::custom_domain::{CustomDomainBinding, CustomDomainStatus};

/// Label under which the ownership TXT record must be published.
pub const VERIFY_LABEL: &str = "_platform-verify";
/// Fixed prefix of the TXT record value, followed by the binding's token.
pub const TXT_PREFIX: &str = "platform-verify=";

#[async_trait]
pub trait CustomDomainRepo: Send + Sync {
    /// Must fail with `Conflict` when the domain is already bound, in any
    /// status, to any tenant (enforced by a unique index, not a pre-read).
    async fn create(
        &self,
        tenant_id: Uuid,
        domain: &str,
        token: &str,
    ) -> AppResult<CustomDomainBinding>;
    async fn get_by_tenant(&self, tenant_id: Uuid) -> AppResult<Option<CustomDomainBinding>>;
    async fn get_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>>;
    /// Index-backed point read used by the certificate-authorization gate;
    /// matches only `active` bindings.
    async fn get_active_by_domain(&self, domain: &str) -> AppResult<Option<CustomDomainBinding>>;
    /// Conditional transition into `verifying` from `pending`, `failed` or
    /// `verified`. Returns `None` when the binding is already `verifying`
    /// (another writer holds the lease) or no longer exists.
    async fn set_verifying(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>>;
    /// Conditional `verifying → verified`; clears the last error.
    async fn set_verified(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>>;
    /// Conditional `verified → active`.
    async fn set_active(&self, id: Uuid) -> AppResult<Option<CustomDomainBinding>>;
    /// Conditional transition to `failed` from `verifying` or `active`.
    async fn set_failed(&self, id: Uuid, error: &str) -> AppResult<Option<CustomDomainBinding>>;
    async fn touch_checked(&self, id: Uuid) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    async fn list_verifying(&self) -> AppResult<Vec<CustomDomainBinding>>;
    async fn list_active_checked_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> AppResult<Vec<CustomDomainBinding>>;
}

#[async_trait]
pub trait DnsVerifier: Send + Sync {
    async fn check_cname(&self, domain: &str, expected_target: &str) -> AppResult<bool>;
    async fn check_txt(&self, domain: &str, expected_value: &str) -> AppResult<bool>;
}

/// DNS records a tenant must create, rendered verbatim by the admin UI.
#[derive(Debug, Clone)]
pub struct DnsRecords {
    pub cname_name: String,
    pub cname_value: String,
    pub txt_name: String,
    pub txt_value: String,
}

/// Outcome of one verification run. Both checks are reported independently
/// so the tenant can see exactly which record is still wrong.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub binding: CustomDomainBinding,
    pub cname_ok: bool,
    pub txt_ok: bool,
    pub verified: bool,
    /// Set when a concurrent check already holds the lease; no DNS lookup was
    /// performed by this call.
    pub in_progress: bool,
    pub error: Option<String>,
}

pub struct CustomDomainUseCases {
    repo: Arc<dyn CustomDomainRepo>,
    dns_verifier: Arc<dyn DnsVerifier>,
    /// Fixed routing target tenants must CNAME their domain to.
    cname_target: String,
    /// Platform base domain; hostnames under it can never be custom domains.
    base_domain: String,
}

impl CustomDomainUseCases {
    pub fn new(
        repo: Arc<dyn CustomDomainRepo>,
        dns_verifier: Arc<dyn DnsVerifier>,
        cname_target: &str,
        base_domain: &str,
    ) -> Self {
        Self {
            repo,
            dns_verifier,
            cname_target: cname_target.to_ascii_lowercase(),
            base_domain: base_domain.to_ascii_lowercase(),
        }
    }

    /// Record a domain for a tenant and issue its verification token.
    ///
    /// Re-submitting the same domain for the same tenant is idempotent and
    /// returns the existing binding with its original token.
    #[instrument(skip(self))]
    pub async fn submit_domain(
        &self,
        tenant_id: Uuid,
        domain: &str,
    ) -> AppResult<CustomDomainBinding> {
        let normalized = normalize_domain(domain)?;
        if normalized == self.base_domain
            || normalized.ends_with(&format!(".{}", self.base_domain))
        {
            return Err(AppError::InvalidInput(
                "This hostname is already routed by the platform".into(),
            ));
        }

        if let Some(existing) = self.repo.get_by_tenant(tenant_id).await? {
            if existing.domain == normalized {
                return Ok(existing);
            }
            return Err(AppError::Conflict(
                "Remove the currently attached domain before adding a new one".into(),
            ));
        }
        if let Some(other) = self.repo.get_by_domain(&normalized).await? {
            if other.tenant_id == tenant_id {
                return Ok(other);
            }
            return Err(AppError::Conflict(
                "This domain is already attached to another store".into(),
            ));
        }

        let token = new_verification_token();
        // The unique index still backstops the read-then-create race.
        self.repo.create(tenant_id, &normalized, &token).await
    }

    pub fn dns_records(&self, binding: &CustomDomainBinding) -> DnsRecords {
        DnsRecords {
            cname_name: binding.domain.clone(),
            cname_value: self.cname_target.clone(),
            txt_name: format!("{VERIFY_LABEL}.{}", binding.domain),
            txt_value: format!("{TXT_PREFIX}{}", binding.verification_token),
        }
    }

    pub async fn get_binding(&self, tenant_id: Uuid) -> AppResult<CustomDomainBinding> {
        self.repo
            .get_by_tenant(tenant_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Take the verification lease and run both DNS checks.
    ///
    /// A binding already `verifying` is not re-entered: the call is a no-op
    /// reporting the in-flight state rather than a duplicate DNS check.
    #[instrument(skip(self))]
    pub async fn request_verification(&self, tenant_id: Uuid) -> AppResult<VerificationReport> {
        let binding = self.get_binding(tenant_id).await?;
        match binding.status {
            CustomDomainStatus::Active => Err(AppError::InvalidInput(
                "This domain is already live".into(),
            )),
            CustomDomainStatus::Verifying => Ok(in_flight_report(binding)),
            CustomDomainStatus::Pending
            | CustomDomainStatus::Failed
            | CustomDomainStatus::Verified => {
                let Some(binding) = self.repo.set_verifying(binding.id).await? else {
                    // Lost the race to a concurrent trigger.
                    return Ok(in_flight_report(self.get_binding(tenant_id).await?));
                };
                self.complete_verification(binding).await
            }
        }
    }

    /// Run both DNS checks for a binding holding the `verifying` lease and
    /// commit the resulting transition.
    pub async fn complete_verification(
        &self,
        binding: CustomDomainBinding,
    ) -> AppResult<VerificationReport> {
        let (cname_ok, txt_ok, error) = self.run_checks(&binding).await;

        let committed = if cname_ok && txt_ok {
            self.repo.set_verified(binding.id).await?
        } else {
            let message = error
                .clone()
                .unwrap_or_else(|| check_failure_message(&binding, cname_ok, txt_ok));
            self.repo.set_failed(binding.id, &message).await?
        };
        // The lease was lost while the checks ran (binding removed or moved
        // on by another actor); do not report the pre-transition state.
        let binding = committed.ok_or(AppError::NotFound)?;

        Ok(VerificationReport {
            verified: cname_ok && txt_ok,
            in_progress: false,
            error: binding.last_error.clone(),
            binding,
            cname_ok,
            txt_ok,
        })
    }

    /// Promote a verified binding to `active`, making the domain resolvable
    /// and certificate issuance authorized.
    #[instrument(skip(self))]
    pub async fn activate(&self, tenant_id: Uuid) -> AppResult<CustomDomainBinding> {
        let binding = self.get_binding(tenant_id).await?;
        match binding.status {
            CustomDomainStatus::Active => Ok(binding),
            CustomDomainStatus::Verified => {
                // Uniqueness is re-checked at activation, not just at
                // creation: a concurrent claimant must surface as a conflict.
                if let Some(other) = self.repo.get_active_by_domain(&binding.domain).await?
                    && other.tenant_id != tenant_id
                {
                    return Err(AppError::Conflict(
                        "This domain is already live on another store".into(),
                    ));
                }
                self.repo.set_active(binding.id).await?.ok_or_else(|| {
                    AppError::Conflict("Domain state changed during activation".into())
                })
            }
            _ => Err(AppError::InvalidInput(
                "Domain must pass verification before it can be activated".into(),
            )),
        }
    }

    /// Detach the tenant's domain entirely (back to the implicit `none`).
    #[instrument(skip(self))]
    pub async fn remove_domain(&self, tenant_id: Uuid) -> AppResult<()> {
        let binding = self.get_binding(tenant_id).await?;
        self.repo.delete(binding.id).await
    }

    /// The single query the edge TLS terminator asks before requesting a
    /// certificate for an unrecognized hostname. True iff a binding exists
    /// for exactly this domain with status `active` — any other status would
    /// let an unproven claimant obtain a certificate.
    ///
    /// Reads the same store the state machine writes; no caching layer may
    /// sit in front of this answer.
    pub async fn is_authorized_for_certificate(&self, hostname: &str) -> AppResult<bool> {
        let Ok(normalized) = normalize_domain(hostname) else {
            return Ok(false);
        };
        Ok(self.repo.get_active_by_domain(&normalized).await?.is_some())
    }

    /// Re-check an `active` binding against DNS drift. A failed check demotes
    /// the binding to `failed`, which immediately revokes certificate
    /// authorization.
    #[instrument(skip(self))]
    pub async fn health_check(&self, binding: &CustomDomainBinding) -> AppResult<()> {
        let (cname_ok, txt_ok, error) = self.run_checks(binding).await;
        if cname_ok && txt_ok {
            self.repo.touch_checked(binding.id).await
        } else {
            let message =
                error.unwrap_or_else(|| check_failure_message(binding, cname_ok, txt_ok));
            warn!(domain = %binding.domain, error = %message, "Active domain failed health check");
            self.repo.set_failed(binding.id, &message).await.map(|_| ())
        }
    }

    pub async fn list_verifying(&self) -> AppResult<Vec<CustomDomainBinding>> {
        self.repo.list_verifying().await
    }

    pub async fn list_active_checked_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> AppResult<Vec<CustomDomainBinding>> {
        self.repo.list_active_checked_before(cutoff).await
    }

    /// A binding stuck in `verifying` past the deadline (crashed worker)
    /// records a failure instead of holding the lease forever.
    pub async fn fail_timed_out(&self, binding: &CustomDomainBinding) -> AppResult<()> {
        self.repo
            .set_failed(binding.id, "Verification timed out; please retry")
            .await
            .map(|_| ())
    }

    /// Both checks run independently; a resolver error on one is reported as
    /// that check failing with a message, never as an aborted request.
    async fn run_checks(&self, binding: &CustomDomainBinding) -> (bool, bool, Option<String>) {
        let mut error: Option<String> = None;

        let cname_ok = match self
            .dns_verifier
            .check_cname(&binding.domain, &self.cname_target)
            .await
        {
            Ok(ok) => ok,
            Err(e) => {
                warn!(domain = %binding.domain, error = ?e, "CNAME check errored");
                error = Some(format!("CNAME lookup for {} failed: {e}", binding.domain));
                false
            }
        };

        let txt_name = format!("{VERIFY_LABEL}.{}", binding.domain);
        let expected = format!("{TXT_PREFIX}{}", binding.verification_token);
        let txt_ok = match self.dns_verifier.check_txt(&txt_name, &expected).await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(domain = %binding.domain, error = ?e, "TXT check errored");
                error.get_or_insert(format!("TXT lookup for {txt_name} failed: {e}"));
                false
            }
        };

        (cname_ok, txt_ok, error)
    }
}

fn in_flight_report(binding: CustomDomainBinding) -> VerificationReport {
    VerificationReport {
        cname_ok: false,
        txt_ok: false,
        verified: false,
        in_progress: true,
        error: binding.last_error.clone(),
        binding,
    }
}

fn check_failure_message(binding: &CustomDomainBinding, cname_ok: bool, txt_ok: bool) -> String {
    let mut parts = Vec::new();
    if !cname_ok {
        parts.push(format!(
            "CNAME record for {} is missing or does not point at the platform",
            binding.domain
        ));
    }
    if !txt_ok {
        parts.push(format!(
            "TXT record at {VERIFY_LABEL}.{} is missing or does not match the verification token",
            binding.domain
        ));
    }
    parts.join("; ")
}

fn new_verification_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Lowercase, trim, strip a trailing dot, and validate hostname syntax.
pub fn normalize_domain(domain: &str) -> AppResult<String> {
    let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if normalized.len() < 3 || normalized.len() > 253 || !normalized.contains('.') {
        return Err(AppError::InvalidInput(
            "Enter a fully-qualified domain name, e.g. shop.example.com".into(),
        ));
    }
    for label in normalized.split('.') {
        let valid = !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(AppError::InvalidInput(format!(
                "'{domain}' is not a valid domain name"
            )));
        }
    }
    Ok(normalized)
}
