pub mod access_gate;
pub mod canonical;
pub mod custom_domain;
pub mod host_resolver;
