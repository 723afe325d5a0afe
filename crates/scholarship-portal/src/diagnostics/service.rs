use std::sync::Arc;

use tracing::{debug, warn};

use super::egress::EgressIpResolver;
use super::probe::ConnectionProbe;
use super::report::{ConnectionReport, EgressIpReport};

/// Service composing the database probe and the egress IP resolver.
pub struct DiagnosticsService<P, E> {
    probe: Arc<P>,
    egress: Arc<E>,
}

impl<P, E> DiagnosticsService<P, E>
where
    P: ConnectionProbe + 'static,
    E: EgressIpResolver + 'static,
{
    pub fn new(probe: Arc<P>, egress: Arc<E>) -> Self {
        Self { probe, egress }
    }

    /// Run the test query once and describe the outcome.
    pub async fn check_connection(&self) -> ConnectionReport {
        let target = self.probe.target();

        match self.probe.ping().await {
            Ok(()) => {
                debug!(host = %target.host, database = %target.database, "database connection verified");
                ConnectionReport::connected(target)
            }
            Err(err) => {
                let report = ConnectionReport::disconnected(target, err.to_string());
                warn!(
                    host = %target.host,
                    user = %target.user,
                    kind = report.kind.map(|kind| kind.label()).unwrap_or("unknown"),
                    error = %err,
                    "database connection check failed"
                );
                report
            }
        }
    }

    pub async fn egress_ip(&self) -> EgressIpReport {
        match self.egress.resolve().await {
            Ok(ip) => EgressIpReport {
                ip: Some(ip),
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "egress ip lookup failed");
                EgressIpReport {
                    ip: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
