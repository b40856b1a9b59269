pub mod custom_domain;
pub mod internal;
pub mod storefront;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Tenant self-service API, served on the operator-facing alias.
pub fn api_router() -> Router<AppState> {
    Router::new().nest("/tenants", custom_domain::router())
}
