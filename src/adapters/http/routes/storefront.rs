use axum::{Extension, Json};

use crate::use_cases::host_resolver::ResolvedHost;

/// Placeholder storefront handler. The real rendering stack hangs off the
/// same extension; what matters here is that the resolved tenant arrives as
/// an explicit request-scoped value, not an ambient lookup.
pub async fn serve(
    resolved: Option<Extension<ResolvedHost>>,
) -> Json<serde_json::Value> {
    let resolved = resolved.map(|Extension(r)| r);
    Json(serde_json::json!({
        "tenant": resolved
            .as_ref()
            .and_then(|r| r.tenant.as_ref())
            .map(|t| t.slug.clone()),
        "host": resolved.as_ref().map(|r| r.host.clone()),
    }))
}
