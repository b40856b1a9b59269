use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::proto::xfer::Protocol;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::app_error::{AppError, AppResult};
use crate::use_cases::custom_domain::DnsVerifier;

/// DNS verifier backed by hickory. Every lookup runs under a bounded timeout
/// so a slow resolver reports as a failed check instead of hanging the
/// verification flow.
pub struct HickoryDnsVerifier {
    resolver: TokioResolver,
    lookup_timeout: Duration,
}

impl HickoryDnsVerifier {
    /// Create resolver using system DNS configuration.
    pub fn new(lookup_timeout: Duration) -> Self {
        let resolver = TokioResolver::builder_tokio().unwrap().build();
        Self {
            resolver,
            lookup_timeout,
        }
    }

    /// Create resolver pointing at a specific DNS server (local dev).
    pub fn with_nameserver(addr: SocketAddr, lookup_timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default()).build();
        Self {
            resolver,
            lookup_timeout,
        }
    }

    async fn lookup(
        &self,
        fqdn: &str,
        record_type: RecordType,
    ) -> AppResult<Option<hickory_resolver::lookup::Lookup>> {
        match timeout(self.lookup_timeout, self.resolver.lookup(fqdn, record_type)).await {
            Ok(Ok(lookup)) => Ok(Some(lookup)),
            Ok(Err(e)) => {
                // NXDOMAIN and friends mean the record is not there yet.
                warn!(fqdn = %fqdn, record_type = ?record_type, error = %e, "DNS lookup failed");
                Ok(None)
            }
            Err(_) => Err(AppError::Internal(format!(
                "DNS lookup for {fqdn} timed out after {}s",
                self.lookup_timeout.as_secs()
            ))),
        }
    }
}

/// Append a trailing dot to make the name an FQDN and prevent search-domain
/// appending.
fn to_fqdn(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

#[async_trait]
impl DnsVerifier for HickoryDnsVerifier {
    async fn check_cname(&self, domain: &str, expected_target: &str) -> AppResult<bool> {
        debug!(domain = %domain, expected = %expected_target, "Checking CNAME record");

        let Some(lookup) = self.lookup(&to_fqdn(domain), RecordType::CNAME).await? else {
            return Ok(false);
        };
        for record in lookup.records() {
            if let Some(cname) = record.data().as_cname() {
                let target = cname.to_string();
                let target_normalized = target.trim_end_matches('.');
                let expected_normalized = expected_target.trim_end_matches('.');

                debug!(target = %target_normalized, expected = %expected_normalized, "Found CNAME");

                if target_normalized.eq_ignore_ascii_case(expected_normalized) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn check_txt(&self, domain: &str, expected_value: &str) -> AppResult<bool> {
        debug!(domain = %domain, expected = %expected_value, "Checking TXT record");

        let Some(lookup) = self.lookup(&to_fqdn(domain), RecordType::TXT).await? else {
            return Ok(false);
        };
        for record in lookup.records() {
            if let Some(txt) = record.data().as_txt() {
                let txt_data = txt.to_string();
                debug!(found = %txt_data, expected = %expected_value, "Found TXT");

                if txt_data.contains(expected_value) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
