//! In-memory doubles for HTTP- and use-case-level testing.

pub mod app_state_builder;
pub mod factories;
pub mod mocks;

pub use app_state_builder::TestAppStateBuilder;
pub use factories::{test_binding, test_tenant};
pub use mocks::{InMemoryCustomDomainRepo, InMemoryTenantRepo, StaticDnsVerifier};
