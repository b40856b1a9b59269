use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{
    custom_domain::{CustomDomainBinding, CustomDomainStatus},
    tenant::{Tenant, TenantStatus},
};

pub fn test_tenant(slug: &str, status: TenantStatus) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        status,
        custom_domain: None,
    }
}

pub fn test_binding(
    tenant_id: Uuid,
    domain: &str,
    status: CustomDomainStatus,
) -> CustomDomainBinding {
    let now = Utc::now().naive_utc();
    let past_verified = matches!(
        status,
        CustomDomainStatus::Verified | CustomDomainStatus::Active
    );
    CustomDomainBinding {
        id: Uuid::new_v4(),
        tenant_id,
        domain: domain.to_string(),
        status,
        verification_token: "0123456789abcdef0123456789abcdef".to_string(),
        verified_at: past_verified.then_some(now),
        activated_at: (status == CustomDomainStatus::Active).then_some(now),
        last_checked_at: Some(now),
        last_error: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}
