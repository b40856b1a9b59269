use std::sync::Arc;

use axum::http::HeaderValue;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::{custom_domain::CustomDomainBinding, tenant::Tenant},
    infra::config::AppConfig,
    test_utils::{InMemoryCustomDomainRepo, InMemoryTenantRepo, StaticDnsVerifier},
    use_cases::{
        access_gate::AccessGate, custom_domain::CustomDomainUseCases, host_resolver::HostResolver,
    },
};

pub fn test_config() -> AppConfig {
    AppConfig {
        base_domain: "platform.test".to_string(),
        app_alias: "app.platform.test".to_string(),
        cname_target: "ingress.platform.test".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 5,
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        dns_server: None,
        dns_timeout_secs: 5,
        verify_poll_secs: 10,
        verifying_timeout_mins: 10,
        recheck_interval_hours: 24,
        suspended_retry_after_secs: 3600,
        past_due_serves_traffic: true,
    }
}

/// Builds an `AppState` wired to in-memory repos and a static DNS verifier
/// for HTTP-level tests.
#[derive(Default)]
pub struct TestAppStateBuilder {
    tenants: Vec<Tenant>,
    bindings: Vec<CustomDomainBinding>,
    directory_error: Option<String>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.push(tenant);
        self
    }

    pub fn with_binding(mut self, binding: CustomDomainBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Make every tenant-directory lookup fail, simulating an outage.
    pub fn with_failing_directory(mut self, message: &str) -> Self {
        self.directory_error = Some(message.to_string());
        self
    }

    pub fn build(self) -> AppState {
        let config = test_config();

        let tenant_repo = Arc::new(InMemoryTenantRepo::default());
        for tenant in self.tenants {
            tenant_repo.insert(tenant);
        }
        if let Some(message) = &self.directory_error {
            tenant_repo.fail_with(message);
        }

        let domain_repo = Arc::new(InMemoryCustomDomainRepo::default());
        for binding in self.bindings {
            domain_repo.insert(binding);
        }

        let dns_verifier = Arc::new(StaticDnsVerifier::default());

        let host_resolver =
            HostResolver::new(tenant_repo, &config.base_domain, &config.app_alias);
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

        AppState {
            config: Arc::new(config),
            host_resolver: Arc::new(host_resolver),
            access_gate: Arc::new(access_gate),
            custom_domain_use_cases: Arc::new(custom_domain_use_cases),
        }
    }
}
