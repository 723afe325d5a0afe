//! One-shot database status check as seen from a consumer of the diagnostic API.
//!
//! Transport failures degrade to [`DatabaseStatus::ApiUnreachable`]; bodies that fail to
//! parse are treated as if the API had sent no data at all.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::api_client::{ApiClient, ApiError};

/// The four states the status display can resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseStatus {
    #[default]
    Checking,
    Connected,
    Disconnected {
        host: Option<String>,
        reason: Option<String>,
        egress_ip: Option<String>,
    },
    ApiUnreachable {
        reason: Option<String>,
    },
}

impl DatabaseStatus {
    /// Fixed user-facing message lines for the state.
    pub fn lines(&self) -> Vec<String> {
        match self {
            DatabaseStatus::Checking => vec!["Checking database connection...".to_string()],
            DatabaseStatus::Connected => vec![
                "Database connected successfully! Authentication is ready.".to_string(),
            ],
            DatabaseStatus::Disconnected {
                host,
                reason,
                egress_ip,
            } => {
                let mut lines = vec!["Live database not connected.".to_string()];
                if let Some(host) = host {
                    lines.push(format!("DB Host: {host}"));
                }
                if let Some(reason) = reason {
                    lines.push(format!("Reason: {reason}"));
                }
                match egress_ip {
                    Some(ip) => lines.push(format!("Current server IP: {ip}")),
                    None => lines.push("Current server IP: unavailable".to_string()),
                }
                lines
            }
            DatabaseStatus::ApiUnreachable { reason } => {
                let mut lines = vec!["API not reachable".to_string()];
                if let Some(reason) = reason {
                    lines.push(format!("Reason: {reason}"));
                }
                lines.push("Please refresh the page or try again shortly.".to_string());
                lines
            }
        }
    }
}

/// Read side of the diagnostic endpoints.
#[async_trait]
pub trait DiagnosticsClient: Send + Sync {
    /// `Err` when the API could not be reached, `Ok(None)` when the body was not JSON.
    async fn fetch_connection(&self) -> Result<Option<Value>, ApiError>;

    async fn fetch_egress_ip(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct HttpDiagnosticsClient {
    api: ApiClient,
}

impl HttpDiagnosticsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DiagnosticsClient for HttpDiagnosticsClient {
    async fn fetch_connection(&self) -> Result<Option<Value>, ApiError> {
        let response = self.api.get("/api/test/connection").send().await?;
        Ok(response.json::<Value>().await.ok())
    }

    async fn fetch_egress_ip(&self) -> Option<String> {
        let response = self.api.get("/api/test/egress-ip").send().await.ok()?;
        let body = response.json::<Value>().await.ok()?;
        body.get("ip").and_then(Value::as_str).map(str::to_string)
    }
}

/// Query the diagnostic endpoint once and resolve the display state.
pub async fn check_database_status<C>(client: &C) -> DatabaseStatus
where
    C: DiagnosticsClient + ?Sized,
{
    let payload = match client.fetch_connection().await {
        Ok(payload) => payload.unwrap_or(Value::Null),
        Err(err) => {
            debug!(error = %err, "diagnostic api unreachable");
            return DatabaseStatus::ApiUnreachable {
                reason: Some(err.to_string()),
            };
        }
    };

    let database = &payload["results"]["database"];
    let connected = database["status"].as_str() == Some("connected")
        || payload["success"].as_bool() == Some(true);
    if connected {
        return DatabaseStatus::Connected;
    }

    let host = non_empty(&database["host"]);
    let reason = non_empty(&payload["error"]).or_else(|| non_empty(&database["error"]));
    let egress_ip = client.fetch_egress_ip().await;

    DatabaseStatus::Disconnected {
        host,
        reason,
        egress_ip,
    }
}

fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
