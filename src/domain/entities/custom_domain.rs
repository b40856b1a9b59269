use chrono::NaiveDateTime;
use uuid::Uuid;

/// Lifecycle of a custom-domain binding. The absence of a binding row is the
/// implicit `none` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomDomainStatus {
    /// Domain recorded and token issued, DNS not yet checked.
    Pending,
    /// A DNS check holds the single-writer lease on this binding.
    Verifying,
    /// DNS correct, not yet serving traffic.
    Verified,
    /// Domain live, certificate issuance authorized.
    Active,
    /// Last verification or health check failed; re-verification allowed.
    Failed,
}

impl CustomDomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomDomainStatus::Pending => "pending",
            CustomDomainStatus::Verifying => "verifying",
            CustomDomainStatus::Verified => "verified",
            CustomDomainStatus::Active => "active",
            CustomDomainStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => CustomDomainStatus::Pending,
            "verifying" => CustomDomainStatus::Verifying,
            "verified" => CustomDomainStatus::Verified,
            "active" => CustomDomainStatus::Active,
            "failed" => CustomDomainStatus::Failed,
            _ => CustomDomainStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomDomainBinding {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Fully-qualified hostname, lowercase, unique across all tenants.
    pub domain: String,
    pub status: CustomDomainStatus,
    /// Random token issued once per binding attempt, proven via TXT record.
    pub verification_token: String,
    pub verified_at: Option<NaiveDateTime>,
    pub activated_at: Option<NaiveDateTime>,
    pub last_checked_at: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
