use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::EgressConfig;

#[derive(Debug, thiserror::Error)]
pub enum EgressError {
    #[error("egress lookup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("egress lookup returned an invalid address '{0}'")]
    InvalidAddress(String),
}

/// Discovers the public address outbound connections originate from.
#[async_trait]
pub trait EgressIpResolver: Send + Sync {
    async fn resolve(&self) -> Result<IpAddr, EgressError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// Resolver that asks a JSON "what is my IP" service answering `{"ip": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpEgressIpResolver {
    client: Client,
    lookup_url: String,
}

impl HttpEgressIpResolver {
    pub fn new(config: &EgressConfig) -> Result<Self, EgressError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            lookup_url: config.lookup_url.clone(),
        })
    }
}

#[async_trait]
impl EgressIpResolver for HttpEgressIpResolver {
    async fn resolve(&self) -> Result<IpAddr, EgressError> {
        let body: LookupResponse = self
            .client
            .get(&self.lookup_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_ip(&body.ip)
    }
}

fn parse_ip(raw: &str) -> Result<IpAddr, EgressError> {
    raw.trim()
        .parse()
        .map_err(|_| EgressError::InvalidAddress(raw.to_string()))
}
