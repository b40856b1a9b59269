use crate::domain::entities::tenant::{Tenant, TenantStatus};

/// Outcome of the per-request status gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Unknown, pending and cancelled tenants are deliberately
    /// indistinguishable from the outside.
    NotFound,
    /// Suspended tenant; carries a Retry-After hint so monitoring can tell
    /// "temporarily down" from "gone".
    ServiceUnavailable { retry_after_secs: u64 },
}

pub struct AccessGate {
    suspended_retry_after_secs: u64,
    past_due_serves_traffic: bool,
}

impl AccessGate {
    pub fn new(suspended_retry_after_secs: u64, past_due_serves_traffic: bool) -> Self {
        Self {
            suspended_retry_after_secs,
            past_due_serves_traffic,
        }
    }

    /// Pure status → decision mapping; the path does not influence the
    /// outcome, only canonicalization (which is handled separately).
    pub fn authorize(&self, tenant: Option<&Tenant>) -> Decision {
        let Some(tenant) = tenant else {
            return Decision::NotFound;
        };
        match tenant.status {
            TenantStatus::Active => Decision::Allow,
            TenantStatus::PastDue if self.past_due_serves_traffic => Decision::Allow,
            TenantStatus::PastDue | TenantStatus::Suspended => Decision::ServiceUnavailable {
                retry_after_secs: self.suspended_retry_after_secs,
            },
            TenantStatus::Pending | TenantStatus::Cancelled => Decision::NotFound,
        }
    }
}
