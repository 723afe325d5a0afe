pub mod api_client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod telemetry;
pub mod workflows;
