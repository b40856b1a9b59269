use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};

pub struct AppConfig {
    /// Platform base domain; tenant storefronts live at `<slug>.<base>`.
    pub base_domain: String,
    /// Operator-facing, tenant-agnostic hostname (admin UI and API).
    pub app_alias: String,
    /// Fixed routing target custom domains must CNAME to.
    pub cname_target: String,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub cors_origin: HeaderValue,
    /// Optional DNS server address for lookups (local dev with CoreDNS).
    pub dns_server: Option<SocketAddr>,
    /// Upper bound on a single DNS lookup during verification.
    pub dns_timeout_secs: u64,
    /// Background sweep frequency.
    pub verify_poll_secs: u64,
    /// A binding stuck in `verifying` longer than this is failed.
    pub verifying_timeout_mins: i64,
    /// How often `active` bindings are re-checked for DNS drift.
    pub recheck_interval_hours: i64,
    /// Retry-After hint returned for suspended tenants.
    pub suspended_retry_after_secs: u64,
    /// Whether payment-grace tenants keep serving storefront traffic.
    pub past_due_serves_traffic: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let base_domain: String =
            get_env_default("BASE_DOMAIN", "platform.example".to_string()).to_lowercase();
        let app_alias: String =
            get_env_default("APP_ALIAS", format!("app.{base_domain}")).to_lowercase();
        let cname_target: String =
            get_env_default("CNAME_TARGET", format!("ingress.{base_domain}")).to_lowercase();

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let dns_server: Option<SocketAddr> = std::env::var("DNS_SERVER")
            .ok()
            .and_then(|s| s.parse().ok());
        let dns_timeout_secs: u64 = get_env_default("DNS_TIMEOUT_SECS", 5);
        let verify_poll_secs: u64 = get_env_default("VERIFY_POLL_SECS", 10);
        let verifying_timeout_mins: i64 = get_env_default("VERIFYING_TIMEOUT_MINS", 10);
        let recheck_interval_hours: i64 = get_env_default("RECHECK_INTERVAL_HOURS", 24);
        let suspended_retry_after_secs: u64 =
            get_env_default("SUSPENDED_RETRY_AFTER_SECS", 3600);
        let past_due_serves_traffic: bool = get_env_default("PAST_DUE_SERVES_TRAFFIC", true);

        Self {
            base_domain,
            app_alias,
            cname_target,
            bind_addr,
            database_url,
            db_max_connections,
            cors_origin,
            dns_server,
            dns_timeout_secs,
            verify_poll_secs,
            verifying_timeout_mins,
            recheck_interval_hours,
            suspended_retry_after_secs,
            past_due_serves_traffic,
        }
    }
}
