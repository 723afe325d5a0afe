//! Database connectivity diagnostics: probing, failure classification, egress IP lookup,
//! and the status view rendered from the diagnostic endpoint.

pub mod classifier;
pub mod egress;
pub mod probe;
pub mod report;
pub mod router;
pub mod service;
pub mod status;

pub use classifier::{classify, Diagnosis, FailureKind};
pub use egress::{EgressError, EgressIpResolver, HttpEgressIpResolver};
pub use probe::{ConnectionProbe, ConnectionTarget, MySqlConnectionProbe, ProbeError};
pub use report::{ConnectionReport, DatabaseCheck, DatabaseState, EgressIpReport};
pub use router::diagnostics_router;
pub use service::DiagnosticsService;
pub use status::{check_database_status, DatabaseStatus, DiagnosticsClient, HttpDiagnosticsClient};
