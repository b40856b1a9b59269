use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    use_cases::{access_gate::Decision, canonical::canonical_redirect, host_resolver::HostClass},
};

/// Per-request pipeline: Host Resolver → Access Gate → Canonicalization
/// Redirector. Allowed requests carry the resolution result as a request
/// extension so downstream handlers never re-derive the tenant.
pub async fn tenant_resolution_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // The TLS terminator's authorization query must never wait on tenant
    // resolution of its own Host header.
    if request.uri().path().starts_with("/internal/") {
        return Ok(next.run(request).await);
    }

    let host_header = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let resolved = app_state.host_resolver.resolve(&host_header).await?;

    match resolved.class {
        HostClass::ApexWwwRedirect => {
            let path_and_query = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            let target = format!("https://{}{}", app_state.config.base_domain, path_and_query);
            return Ok(permanent_redirect(&target));
        }
        HostClass::PlatformApex | HostClass::PlatformAppAlias => {
            request.extensions_mut().insert(resolved);
            return Ok(next.run(request).await);
        }
        _ => {}
    }

    match app_state.access_gate.authorize(resolved.tenant.as_ref()) {
        Decision::NotFound => Err(AppError::NotFound),
        Decision::ServiceUnavailable { retry_after_secs } => {
            Err(AppError::ServiceUnavailable { retry_after_secs })
        }
        Decision::Allow => {
            let path = request.uri().path();
            let query = request.uri().query();
            if let Some(target) = canonical_redirect(&resolved, path, query) {
                return Ok(permanent_redirect(&target));
            }
            request.extensions_mut().insert(resolved);
            Ok(next.run(request).await)
        }
    }
}

// 301 rather than 308: browsers and crawlers should adopt the target as
// canonical, and the storefront surface is GET-only.
fn permanent_redirect(target: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, target.to_string())],
    )
        .into_response()
}
