use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::infra::config::AppConfig;
use crate::use_cases::custom_domain::CustomDomainUseCases;

/// Background sweep for the domain lifecycle.
///
/// Two duties, both tolerant of per-binding failures:
/// - fail bindings stuck in `verifying` past the deadline (a crashed worker
///   must not hold the lease forever);
/// - periodically re-check `active` bindings against DNS drift, demoting a
///   drifted binding to `failed` and thereby revoking its certificate
///   authorization.
pub async fn run_domain_recheck_loop(
    use_cases: Arc<CustomDomainUseCases>,
    config: Arc<AppConfig>,
) {
    let mut ticker = interval(Duration::from_secs(config.verify_poll_secs));

    info!(
        "Domain recheck service started (polling every {}s, active recheck every {}h)",
        config.verify_poll_secs, config.recheck_interval_hours
    );

    loop {
        ticker.tick().await;
        sweep_stale_verifying(&use_cases, config.verifying_timeout_mins).await;
        recheck_active(&use_cases, config.recheck_interval_hours).await;
    }
}

async fn sweep_stale_verifying(use_cases: &CustomDomainUseCases, timeout_mins: i64) {
    let bindings = match use_cases.list_verifying().await {
        Ok(bindings) => bindings,
        Err(e) => {
            error!(error = ?e, "Failed to fetch verifying domains");
            return;
        }
    };

    for binding in bindings {
        let Some(started_at) = binding.last_checked_at else {
            continue;
        };
        let elapsed_mins = (Utc::now().naive_utc() - started_at).num_minutes();
        if elapsed_mins <= timeout_mins {
            // A live check still owns the lease.
            continue;
        }
        warn!(
            domain = %binding.domain,
            "Verification stuck for {} mins, marking failed",
            elapsed_mins
        );
        if let Err(e) = use_cases.fail_timed_out(&binding).await {
            error!(domain = %binding.domain, error = ?e, "Failed to mark domain as failed");
        }
    }
}

async fn recheck_active(use_cases: &CustomDomainUseCases, interval_hours: i64) {
    let cutoff = Utc::now().naive_utc() - chrono::Duration::hours(interval_hours);
    let bindings = match use_cases.list_active_checked_before(cutoff).await {
        Ok(bindings) => bindings,
        Err(e) => {
            error!(error = ?e, "Failed to fetch active domains due for recheck");
            return;
        }
    };

    for binding in bindings {
        // One broken binding must not abort the rest of the sweep.
        match use_cases.health_check(&binding).await {
            Ok(()) => {}
            Err(e) => {
                warn!(domain = %binding.domain, error = ?e, "Health check errored");
            }
        }
    }
}
