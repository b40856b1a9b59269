use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate-domain", get(validate_domain))
}

#[derive(Debug, Deserialize)]
struct ValidateDomainQuery {
    domain: Option<String>,
}

/// Consulted by the edge TLS terminator before it requests a certificate for
/// a hostname it has never seen. 200 authorizes issuance, 404 denies it; the
/// terminator retries on 500 but must treat 404 as final.
///
/// Unauthenticated: the caller is a trusted internal component and the
/// answer must come back in low single-digit milliseconds.
async fn validate_domain(
    State(app_state): State<AppState>,
    Query(query): Query<ValidateDomainQuery>,
) -> AppResult<StatusCode> {
    let domain = query
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::InvalidInput("domain query parameter is required".into()))?;

    if app_state
        .custom_domain_use_cases
        .is_authorized_for_certificate(domain)
        .await?
    {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::NotFound)
    }
}
