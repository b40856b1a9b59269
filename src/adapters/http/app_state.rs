use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        access_gate::AccessGate, custom_domain::CustomDomainUseCases, host_resolver::HostResolver,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub host_resolver: Arc<HostResolver>,
    pub access_gate: Arc<AccessGate>,
    pub custom_domain_use_cases: Arc<CustomDomainUseCases>,
}
