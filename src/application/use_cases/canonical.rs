use crate::use_cases::host_resolver::{HostClass, ResolvedHost};

/// Paths that stay reachable on the platform subdomain even after a custom
/// domain goes live, so operators keep a working route to tenant
/// administration if the tenant's external DNS breaks.
pub const CANONICAL_EXEMPT_PREFIXES: &[&str] =
    &["/admin", "/api", "/auth", "/webhooks", "/internal"];

/// Decide whether a storefront request on the platform subdomain should be
/// permanently steered to the tenant's custom domain. Returns the absolute
/// redirect target; custom domains are certificate-backed once active, so the
/// scheme is always HTTPS.
pub fn canonical_redirect(
    resolved: &ResolvedHost,
    path: &str,
    query: Option<&str>,
) -> Option<String> {
    if resolved.class != HostClass::TenantSubdomain {
        return None;
    }
    let tenant = resolved.tenant.as_ref()?;
    let domain = tenant.custom_domain.as_deref()?;
    if is_exempt(path) {
        return None;
    }

    let mut target = format!("https://{domain}{path}");
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

fn is_exempt(path: &str) -> bool {
    CANONICAL_EXEMPT_PREFIXES.iter().any(|prefix| {
        path == *prefix || (path.starts_with(prefix) && path.as_bytes()[prefix.len()] == b'/')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::tenant::TenantStatus;
    use crate::test_utils::test_tenant;
    use crate::use_cases::host_resolver::{HostClass, ResolvedHost};

    fn resolved(class: HostClass, custom_domain: Option<&str>) -> ResolvedHost {
        let mut tenant = test_tenant("acme", TenantStatus::Active);
        tenant.custom_domain = custom_domain.map(str::to_string);
        ResolvedHost {
            class,
            tenant: Some(tenant),
            raw_host: "acme.platform.test".to_string(),
            host: "acme.platform.test".to_string(),
        }
    }

    #[test]
    fn redirects_storefront_paths_with_query() {
        let resolved = resolved(HostClass::TenantSubdomain, Some("shop.acme.com"));
        assert_eq!(
            canonical_redirect(&resolved, "/products/x", Some("ref=nav")),
            Some("https://shop.acme.com/products/x?ref=nav".to_string())
        );
        assert_eq!(
            canonical_redirect(&resolved, "/", None),
            Some("https://shop.acme.com/".to_string())
        );
    }

    #[test]
    fn exempt_paths_stay_on_the_platform_subdomain() {
        let resolved = resolved(HostClass::TenantSubdomain, Some("shop.acme.com"));
        for path in [
            "/admin",
            "/admin/orders",
            "/api/anything",
            "/auth/login",
            "/webhooks/payment",
            "/internal/validate-domain",
        ] {
            assert_eq!(canonical_redirect(&resolved, path, None), None, "{path}");
        }
    }

    #[test]
    fn exemption_matches_whole_segments_only() {
        let resolved = resolved(HostClass::TenantSubdomain, Some("shop.acme.com"));
        assert!(canonical_redirect(&resolved, "/apis", None).is_some());
        assert!(canonical_redirect(&resolved, "/administrator", None).is_some());
    }

    #[test]
    fn no_redirect_without_active_binding() {
        let resolved = resolved(HostClass::TenantSubdomain, None);
        assert_eq!(canonical_redirect(&resolved, "/products/x", None), None);
    }

    #[test]
    fn no_redirect_when_already_on_the_custom_domain() {
        let resolved = resolved(HostClass::TenantCustomDomain, Some("shop.acme.com"));
        assert_eq!(canonical_redirect(&resolved, "/products/x", None), None);
    }
}
