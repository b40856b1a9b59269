use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::custom_domain::CustomDomainBinding,
    use_cases::custom_domain::{DnsRecords, VerificationReport},
};

// Tenant self-service surface for the domain lifecycle. Operator
// authentication lives in front of this router and is out of scope here.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{tenant_id}/domain", post(submit_domain))
        .route("/{tenant_id}/domain", get(get_domain))
        .route("/{tenant_id}/domain", delete(remove_domain))
        .route("/{tenant_id}/domain/verify", post(request_verification))
        .route("/{tenant_id}/domain/activate", post(activate_domain))
}

#[derive(Debug, Deserialize)]
struct SubmitDomainRequest {
    domain: String,
}

#[derive(Debug, Serialize)]
struct DnsRecordsResponse {
    cname_name: String,
    cname_value: String,
    txt_name: String,
    txt_value: String,
}

impl From<DnsRecords> for DnsRecordsResponse {
    fn from(records: DnsRecords) -> Self {
        DnsRecordsResponse {
            cname_name: records.cname_name,
            cname_value: records.cname_value,
            txt_name: records.txt_name,
            txt_value: records.txt_value,
        }
    }
}

#[derive(Debug, Serialize)]
struct DomainResponse {
    domain: String,
    status: String,
    verified_at: Option<NaiveDateTime>,
    activated_at: Option<NaiveDateTime>,
    last_checked_at: Option<NaiveDateTime>,
    last_error: Option<String>,
    dns_records: DnsRecordsResponse,
}

impl DomainResponse {
    fn new(binding: CustomDomainBinding, records: DnsRecords) -> Self {
        DomainResponse {
            domain: binding.domain,
            status: binding.status.as_str().to_string(),
            verified_at: binding.verified_at,
            activated_at: binding.activated_at,
            last_checked_at: binding.last_checked_at,
            last_error: binding.last_error,
            dns_records: records.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct VerificationResponse {
    status: String,
    cname_ok: bool,
    txt_ok: bool,
    verified: bool,
    in_progress: bool,
    error: Option<String>,
}

impl From<VerificationReport> for VerificationResponse {
    fn from(report: VerificationReport) -> Self {
        VerificationResponse {
            status: report.binding.status.as_str().to_string(),
            cname_ok: report.cname_ok,
            txt_ok: report.txt_ok,
            verified: report.verified,
            in_progress: report.in_progress,
            error: report.error,
        }
    }
}

async fn submit_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<SubmitDomainRequest>,
) -> AppResult<(StatusCode, Json<DomainResponse>)> {
    let use_cases = &app_state.custom_domain_use_cases;
    let binding = use_cases.submit_domain(tenant_id, &payload.domain).await?;
    let records = use_cases.dns_records(&binding);
    Ok((
        StatusCode::CREATED,
        Json(DomainResponse::new(binding, records)),
    ))
}

/// Current binding plus the DNS records to create, for the admin UI's
/// copy-paste instructions.
async fn get_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<Json<DomainResponse>> {
    let use_cases = &app_state.custom_domain_use_cases;
    let binding = use_cases.get_binding(tenant_id).await?;
    let records = use_cases.dns_records(&binding);
    Ok(Json(DomainResponse::new(binding, records)))
}

async fn request_verification(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<Json<VerificationResponse>> {
    let report = app_state
        .custom_domain_use_cases
        .request_verification(tenant_id)
        .await?;
    Ok(Json(report.into()))
}

async fn activate_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<Json<DomainResponse>> {
    let use_cases = &app_state.custom_domain_use_cases;
    let binding = use_cases.activate(tenant_id).await?;
    let records = use_cases.dns_records(&binding);
    Ok(Json(DomainResponse::new(binding, records)))
}

async fn remove_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    app_state
        .custom_domain_use_cases
        .remove_domain(tenant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
