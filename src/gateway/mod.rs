// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster client gateway.
//!
//! This module obtains an authenticated session against the cluster API and
//! hides which transport carries it. Two strategies implement [`ClusterClient`]:
//!
//! - [`RestClient`] - talks to the API server directly through a `kube` client
//! - [`CliClient`] - shells out to the `oc` binary and parses its JSON output
//!
//! # Transport Selection
//!
//! | Preference | Endpoint | Token | Transport |
//! |------------|----------|-------|-----------|
//! | `rest` | any | any | REST |
//! | `cli` | any | any | CLI |
//! | `auto` | `http(s)://…` | set | REST |
//! | `auto` | empty | any | CLI |
//! | `auto` | any | empty | CLI |
//! | `auto` | other scheme | set | unsupported |
//!
//! A session that cannot be established is logged once and reported as `None`;
//! the gateway never retries.
//!
//! # Example
//!
//! ```rust,no_run
//! use rollout_canceller::gateway::{ClientFactory, TransportFactory, TransportPreference};
//!
//! # async fn example() {
//! let factory = TransportFactory::new(TransportPreference::Auto);
//! if let Some(client) = factory
//!     .create_client("https://api.cluster.example.com:6443", "sha256~token")
//!     .await
//! {
//!     println!("connected via {}", client.transport());
//! }
//! # }
//! ```

pub mod cli;
pub mod rest;

pub use cli::CliClient;
pub use rest::RestClient;

use crate::config::CancellerConfig;
use crate::constants::DEFAULT_CLI_BINARY;
use crate::errors::{ClientError, GatewayError};
use crate::resources::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Transport a [`ClusterClient`] uses to reach the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// Direct HTTPS calls to the API server
    Rest,
    /// Execution of the `oc` command-line tool
    Cli,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => f.write_str("rest"),
            Self::Cli => f.write_str("cli"),
        }
    }
}

/// Configured transport choice.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransportPreference {
    /// Pick a transport from the endpoint and credential shape
    #[default]
    Auto,
    /// Always use the REST transport
    Rest,
    /// Always use the CLI transport
    Cli,
}

impl TransportPreference {
    /// Resolve the transport for an endpoint and token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedTransport`] when `Auto` cannot map the
    /// endpoint to a transport.
    pub fn select(self, api_url: &str, auth_token: &str) -> Result<Transport, GatewayError> {
        match self {
            Self::Rest => Ok(Transport::Rest),
            Self::Cli => Ok(Transport::Cli),
            Self::Auto => {
                let api_url = api_url.trim();
                if api_url.is_empty() || auth_token.trim().is_empty() {
                    return Ok(Transport::Cli);
                }
                match url::Url::parse(api_url) {
                    Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                        Ok(Transport::Rest)
                    }
                    _ => Err(GatewayError::UnsupportedTransport {
                        api_url: api_url.to_string(),
                    }),
                }
            }
        }
    }
}

/// An authenticated session against the cluster API.
///
/// Implementations perform one remote round trip per call and keep no cache.
#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
    /// Transport carrying this session
    fn transport(&self) -> Transport;

    /// Fetch a resource, returning `Ok(None)` if the server reports it absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed or decoded.
    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Resource>, ClientError>;

    /// Replace a resource on the server, returning the server's copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the update or cannot be reached.
    async fn update(&self, resource: &Resource) -> Result<Resource, ClientError>;
}

/// Source of cluster client sessions.
#[async_trait::async_trait]
pub trait ClientFactory: Send + Sync {
    /// Obtain a client for the endpoint and bearer token.
    ///
    /// Returns `None` when the endpoint is unreachable or no transport applies.
    async fn create_client(&self, api_url: &str, auth_token: &str)
        -> Option<Box<dyn ClusterClient>>;
}

/// [`ClientFactory`] that builds REST or CLI sessions.
#[derive(Clone, Debug)]
pub struct TransportFactory {
    preference: TransportPreference,
    cli_binary: String,
    skip_tls_verify: bool,
}

impl TransportFactory {
    /// Create a factory with the default CLI binary and TLS verification enabled.
    #[must_use]
    pub fn new(preference: TransportPreference) -> Self {
        Self {
            preference,
            cli_binary: DEFAULT_CLI_BINARY.to_string(),
            skip_tls_verify: false,
        }
    }

    /// Create a factory from the transport settings of a canceller configuration.
    #[must_use]
    pub fn from_config(config: &CancellerConfig) -> Self {
        Self {
            preference: config.transport,
            cli_binary: config.cli_binary.clone(),
            skip_tls_verify: config.skip_tls_verify,
        }
    }

    /// Use a specific CLI binary for the exec transport
    #[must_use]
    pub fn with_cli_binary(mut self, cli_binary: impl Into<String>) -> Self {
        self.cli_binary = cli_binary.into();
        self
    }

    /// Disable TLS certificate verification
    #[must_use]
    pub fn with_skip_tls_verify(mut self, skip_tls_verify: bool) -> Self {
        self.skip_tls_verify = skip_tls_verify;
        self
    }

    /// Establish a session, keeping the reason when that fails.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] describing why no session could be established.
    pub async fn connect(
        &self,
        api_url: &str,
        auth_token: &str,
    ) -> Result<Box<dyn ClusterClient>, GatewayError> {
        let transport = self.preference.select(api_url, auth_token)?;
        debug!(api_url = %api_url, transport = %transport, "Selected cluster transport");

        match transport {
            Transport::Rest => {
                let client = RestClient::connect(api_url, auth_token, self.skip_tls_verify).await?;
                Ok(Box::new(client))
            }
            Transport::Cli => {
                let client = CliClient::new(&self.cli_binary, api_url, auth_token)
                    .with_skip_tls_verify(self.skip_tls_verify);
                client.probe().await?;
                Ok(Box::new(client))
            }
        }
    }
}

#[async_trait::async_trait]
impl ClientFactory for TransportFactory {
    async fn create_client(
        &self,
        api_url: &str,
        auth_token: &str,
    ) -> Option<Box<dyn ClusterClient>> {
        match self.connect(api_url, auth_token).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(api_url = %api_url, error = %e, "Could not obtain a cluster client");
                None
            }
        }
    }
}
