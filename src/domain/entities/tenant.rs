use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantStatus {
    Pending,
    Active,
    PastDue,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Pending => "pending",
            TenantStatus::Active => "active",
            TenantStatus::PastDue => "past_due",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => TenantStatus::Pending,
            "active" => TenantStatus::Active,
            "past_due" => TenantStatus::PastDue,
            "suspended" => TenantStatus::Suspended,
            "cancelled" => TenantStatus::Cancelled,
            _ => TenantStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: Uuid,
    /// Unique, lowercase, immutable after creation. Never reused, even after
    /// cancellation.
    pub slug: String,
    pub status: TenantStatus,
    /// The tenant's custom domain, present only while its binding is `active`.
    pub custom_domain: Option<String>,
}
