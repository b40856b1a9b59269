use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{dns::HickoryDnsVerifier, http::app_state::AppState},
    infra::{config::AppConfig, postgres_persistence},
    use_cases::{
        access_gate::AccessGate,
        custom_domain::{CustomDomainRepo, CustomDomainUseCases, DnsVerifier},
        host_resolver::{HostResolver, TenantRepo},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(
        postgres_persistence(&config.database_url, config.db_max_connections).await?,
    );
    let tenant_repo = postgres_arc.clone() as Arc<dyn TenantRepo>;
    let domain_repo = postgres_arc.clone() as Arc<dyn CustomDomainRepo>;

    let dns_timeout = Duration::from_secs(config.dns_timeout_secs);
    let dns_verifier: Arc<dyn DnsVerifier> = match config.dns_server {
        Some(addr) => Arc::new(HickoryDnsVerifier::with_nameserver(addr, dns_timeout)),
        None => Arc::new(HickoryDnsVerifier::new(dns_timeout)),
    };

    let host_resolver = HostResolver::new(tenant_repo, &config.base_domain, &config.app_alias);
    let access_gate = AccessGate::new(
        config.suspended_retry_after_secs,
        config.past_due_serves_traffic,
    );
    let custom_domain_use_cases = CustomDomainUseCases::new(
        domain_repo,
        dns_verifier,
        &config.cname_target,
        &config.base_domain,
    );

    Ok(AppState {
        config: Arc::new(config),
        host_resolver: Arc::new(host_resolver),
        access_gate: Arc::new(access_gate),
        custom_domain_use_cases: Arc::new(custom_domain_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
