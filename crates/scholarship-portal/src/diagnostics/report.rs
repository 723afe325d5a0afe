use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::classifier::{classify, FailureKind};
use super::probe::ConnectionTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseState {
    Connected,
    Disconnected,
}

/// Per-database section of the connection report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseCheck {
    pub status: DatabaseState,
    pub host: String,
    pub user: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResults {
    pub database: DatabaseCheck,
}

/// Ephemeral result of a connection test; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub results: CheckResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

impl ConnectionReport {
    pub fn connected(target: &ConnectionTarget) -> Self {
        Self {
            success: true,
            results: CheckResults {
                database: Self::check(target, DatabaseState::Connected, None),
            },
            error: None,
            kind: None,
            reason: None,
            action: None,
        }
    }

    pub fn disconnected(target: &ConnectionTarget, error: String) -> Self {
        let diagnosis = classify(&error);
        Self {
            success: false,
            results: CheckResults {
                database: Self::check(target, DatabaseState::Disconnected, Some(error.clone())),
            },
            error: Some(error),
            kind: Some(diagnosis.kind),
            reason: Some(diagnosis.reason),
            action: Some(diagnosis.action),
        }
    }

    fn check(target: &ConnectionTarget, status: DatabaseState, error: Option<String>) -> DatabaseCheck {
        DatabaseCheck {
            status,
            host: target.host.clone(),
            user: target.user.clone(),
            database: target.database.clone(),
            error,
        }
    }
}

/// Response body for the egress IP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EgressIpReport {
    pub ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
