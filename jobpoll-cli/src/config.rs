//! Configuration module
//!
//! Handles CLI configuration: the server origin, client options and the
//! HTTP timeout.

use anyhow::{Context, Result};
use jobpoll_client::{ClientConfig, ClientOptions, HttpTransport};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the job server
    pub server: String,
    /// Client options given on the command line or environment
    pub options: ClientOptions,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

impl Config {
    /// Resolves the client options against their defaults
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from_options(self.options.clone())
    }

    /// Builds the HTTP transport for the configured server
    pub fn transport(&self) -> Result<HttpTransport> {
        let mut transport = HttpTransport::with_origin(&self.server)
            .with_context(|| format!("Invalid server URL: {}", self.server))?;

        if let Some(timeout) = self.timeout {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?;
            transport = transport.with_http_client(client);
        }

        Ok(transport)
    }
}
