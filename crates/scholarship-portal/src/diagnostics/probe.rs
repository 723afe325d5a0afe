use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use crate::config::DatabaseConfig;

/// Non-secret description of the database a probe connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

impl From<&DatabaseConfig> for ConnectionTarget {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            database: config.name.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Driver(String),
    #[error("connection attempt timed out after {0:?}")]
    TimedOut(Duration),
}

/// Runs a test query against the configured database.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    fn target(&self) -> &ConnectionTarget;

    async fn ping(&self) -> Result<(), ProbeError>;
}

/// Probe backed by a throwaway single-connection `sqlx` MySQL pool.
pub struct MySqlConnectionProbe {
    target: ConnectionTarget,
    options: MySqlConnectOptions,
    timeout: Duration,
}

impl MySqlConnectionProbe {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        Self {
            target: ConnectionTarget::from(config),
            options,
            timeout: config.connect_timeout,
        }
    }

    async fn select_one(&self) -> Result<(), sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.timeout)
            .connect_with(self.options.clone())
            .await?;

        let outcome = sqlx::query("SELECT 1").execute(&pool).await.map(|_| ());
        pool.close().await;
        outcome
    }
}

#[async_trait]
impl ConnectionProbe for MySqlConnectionProbe {
    fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        match tokio::time::timeout(self.timeout, self.select_one()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ProbeError::Driver(err.to_string())),
            Err(_) => Err(ProbeError::TimedOut(self.timeout)),
        }
    }
}
